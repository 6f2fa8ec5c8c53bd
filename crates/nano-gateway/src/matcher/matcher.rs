//! Matcher: a rule chain, a handler and the flags steering evaluation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use super::{EngineHooks, Handler, MatcherRegistry, Rule};
use crate::events::EventKind;

/// Identifier assigned by the registry on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatcherId(pub(crate) u64);

/// A registered (rules, handler, priority) triple for one event kind
pub struct Matcher {
    pub(crate) id: MatcherId,
    pub(crate) kind: EventKind,
    pub(crate) rules: Vec<Rule>,
    pub(crate) handler: Option<Handler>,
    pub(crate) priority: i32,
    pub(crate) block: bool,
    pub(crate) break_on_fail: bool,
    pub(crate) temporary: bool,
    /// Set once a temporary matcher has been claimed by an evaluation
    pub(crate) fired: AtomicBool,
    pub(crate) hooks: Option<Arc<EngineHooks>>,
    pub(crate) registry: Weak<MatcherRegistry>,
}

impl Matcher {
    pub(crate) fn new(kind: EventKind, rules: Vec<Rule>) -> Self {
        Self {
            id: MatcherId(0),
            kind,
            rules,
            handler: None,
            priority: 0,
            block: false,
            break_on_fail: false,
            temporary: false,
            fired: AtomicBool::new(false),
            hooks: None,
            registry: Weak::new(),
        }
    }

    pub fn id(&self) -> MatcherId {
        self.id
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn is_block(&self) -> bool {
        self.block
    }

    pub fn is_break(&self) -> bool {
        self.break_on_fail
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    /// Pre/mid/post handlers of the owning engine
    pub fn hooks(&self) -> Option<&Arc<EngineHooks>> {
        self.hooks.as_ref()
    }

    /// Claim the single run of a temporary matcher; always true otherwise
    pub(crate) fn claim(&self) -> bool {
        !self.temporary || !self.fired.swap(true, Ordering::AcqRel)
    }

    /// Remove this matcher from its registry
    pub fn delete(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.remove(self.kind, self.id))
    }
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("rules", &self.rules.len())
            .field("priority", &self.priority)
            .field("block", &self.block)
            .field("break", &self.break_on_fail)
            .field("temporary", &self.temporary)
            .finish()
    }
}

/// Handle to a registered matcher, used to remove it later
#[derive(Debug, Clone)]
pub struct MatcherHandle {
    pub(crate) id: MatcherId,
    pub(crate) kind: EventKind,
    pub(crate) registry: Weak<MatcherRegistry>,
}

impl MatcherHandle {
    pub fn id(&self) -> MatcherId {
        self.id
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Remove the matcher; false when it was already gone
    pub fn delete(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.remove(self.kind, self.id))
    }

    /// Whether the matcher is still registered
    pub fn is_registered(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.contains(self.kind, self.id))
    }
}
