//! Per-evaluation scratch state
//!
//! Rules write derived values here (matched prefix, command arguments, regex
//! captures) for the handler to read. Cleared before each matcher.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

type Value = Arc<dyn Any + Send + Sync>;

/// String-keyed bag of typed values
#[derive(Clone, Default)]
pub struct State {
    values: HashMap<String, Value>,
}

impl State {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value under the key
    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Arc::new(value));
    }

    /// Typed lookup; `None` when absent or of another type
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// Lookup of a `String` value
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get::<String>(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_get() {
        let mut state = State::new();
        state.insert("args", "hello".to_string());
        state.insert("argv", vec!["a".to_string(), "b".to_string()]);

        assert_eq!(state.get_str("args"), Some("hello"));
        assert_eq!(state.get::<Vec<String>>("argv").map(Vec::len), Some(2));
        assert!(state.get::<u64>("args").is_none());
        assert!(state.get_str("missing").is_none());
    }

    #[test]
    fn test_clear() {
        let mut state = State::new();
        state.insert("k", 1_u32);
        let snapshot = state.clone();
        state.clear();

        assert!(state.is_empty());
        assert_eq!(snapshot.get::<u32>("k"), Some(&1));
    }
}
