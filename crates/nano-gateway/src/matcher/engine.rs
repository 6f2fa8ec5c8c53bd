//! Engine: one plugin's slice of the pipeline
//!
//! An engine owns pre-, mid- and post-handlers that wrap every matcher it
//! registers, plus the handles of those matchers so the whole plugin can be
//! removed at once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::{Mutex, RwLock};

use super::{Handler, Matcher, MatcherHandle, MatcherRegistry, PostHandler, Rule};
use crate::context::Ctx;
use crate::events::{EventKind, EventType};
use crate::rules;

/// Handlers shared by every matcher of an engine
#[derive(Default)]
pub struct EngineHooks {
    pre: RwLock<Vec<Rule>>,
    mid: RwLock<Vec<Rule>>,
    post: RwLock<Vec<PostHandler>>,
}

/// Copy of an engine's handlers taken for one matcher evaluation
#[derive(Clone, Default)]
pub(crate) struct HookSnapshot {
    pub(crate) pre: Vec<Rule>,
    pub(crate) mid: Vec<Rule>,
    pub(crate) post: Vec<PostHandler>,
}

impl EngineHooks {
    pub(crate) fn snapshot(&self) -> HookSnapshot {
        HookSnapshot {
            pre: self.pre.read().clone(),
            mid: self.mid.read().clone(),
            post: self.post.read().clone(),
        }
    }
}

impl std::fmt::Debug for EngineHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHooks")
            .field("pre", &self.pre.read().len())
            .field("mid", &self.mid.read().len())
            .field("post", &self.post.read().len())
            .finish()
    }
}

/// A plugin's pipeline slice
pub struct Engine {
    registry: Arc<MatcherRegistry>,
    hooks: Arc<EngineHooks>,
    priority: i32,
    service: Option<String>,
    data_folder: Option<PathBuf>,
    handles: Mutex<Vec<MatcherHandle>>,
}

impl Engine {
    /// Engine at priority 0 registering into `registry`
    pub fn new(registry: Arc<MatcherRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(EngineHooks::default()),
            priority: 0,
            service: None,
            data_folder: None,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Default priority of the matchers this engine registers
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub(crate) fn with_service(mut self, service: impl Into<String>, data_folder: PathBuf) -> Self {
        self.service = Some(service.into());
        self.data_folder = Some(data_folder);
        self
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Name of the service this engine was registered for
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// Private data namespace of the service
    pub fn data_folder(&self) -> Option<&Path> {
        self.data_folder.as_deref()
    }

    pub fn registry(&self) -> &Arc<MatcherRegistry> {
        &self.registry
    }

    pub fn hooks(&self) -> &Arc<EngineHooks> {
        &self.hooks
    }

    // === Handlers ===

    /// Add a rule run before every matcher's own rules
    pub fn use_pre_handler(&self, rule: Rule) {
        self.hooks.pre.write().push(rule);
    }

    /// Add a rule run after every matcher's own rules
    pub fn use_mid_handler(&self, rule: Rule) {
        self.hooks.mid.write().push(rule);
    }

    /// Add a hook run after every matcher, matched or not
    pub fn use_post_handler<F>(&self, f: F)
    where
        F: Fn(&mut Ctx) + Send + Sync + 'static,
    {
        self.hooks.post.write().push(Arc::new(f));
    }

    // === Matchers ===

    /// Start a matcher for an event kind
    pub fn on(&self, kind: EventKind, rules: impl IntoIterator<Item = Rule>) -> MatcherBuilder<'_> {
        let mut matcher = Matcher::new(kind, rules.into_iter().collect());
        matcher.priority = self.priority;
        MatcherBuilder { engine: self, matcher }
    }

    pub fn on_message(&self, rules: impl IntoIterator<Item = Rule>) -> MatcherBuilder<'_> {
        self.on(EventKind::Message, rules)
    }

    pub fn on_message_delete(&self, rules: impl IntoIterator<Item = Rule>) -> MatcherBuilder<'_> {
        self.on(EventKind::MessageDelete, rules)
    }

    /// Matcher for one of the non-message event types
    pub fn on_event(&self, ty: EventType, rules: impl IntoIterator<Item = Rule>) -> MatcherBuilder<'_> {
        self.on(ty.kind(), rules)
    }

    fn on_message_with(&self, first: Rule, rules: impl IntoIterator<Item = Rule>) -> MatcherBuilder<'_> {
        self.on_message(std::iter::once(first).chain(rules))
    }

    pub fn on_message_prefix(&self, prefix: &str, rules: impl IntoIterator<Item = Rule>) -> MatcherBuilder<'_> {
        self.on_message_with(rules::prefix(prefix), rules)
    }

    pub fn on_message_prefix_group(
        &self,
        prefixes: &[&str],
        rules: impl IntoIterator<Item = Rule>,
    ) -> MatcherBuilder<'_> {
        self.on_message_with(rules::prefix_group(prefixes), rules)
    }

    pub fn on_message_suffix(&self, suffix: &str, rules: impl IntoIterator<Item = Rule>) -> MatcherBuilder<'_> {
        self.on_message_with(rules::suffix(suffix), rules)
    }

    pub fn on_message_suffix_group(
        &self,
        suffixes: &[&str],
        rules: impl IntoIterator<Item = Rule>,
    ) -> MatcherBuilder<'_> {
        self.on_message_with(rules::suffix_group(suffixes), rules)
    }

    pub fn on_message_command(&self, command: &str, rules: impl IntoIterator<Item = Rule>) -> MatcherBuilder<'_> {
        self.on_message_with(rules::command(command), rules)
    }

    pub fn on_message_command_group(
        &self,
        commands: &[&str],
        rules: impl IntoIterator<Item = Rule>,
    ) -> MatcherBuilder<'_> {
        self.on_message_with(rules::command_group(commands), rules)
    }

    pub fn on_message_shell(&self, command: &str, rules: impl IntoIterator<Item = Rule>) -> MatcherBuilder<'_> {
        self.on_message_with(rules::shell(command), rules)
    }

    /// Shell command with arguments parsed into `T` under `State["flag"]`
    pub fn on_message_shell_with<T>(&self, command: &str, rules: impl IntoIterator<Item = Rule>) -> MatcherBuilder<'_>
    where
        T: clap::Parser + Send + Sync + 'static,
    {
        self.on_message_with(rules::shell_with::<T>(command), rules)
    }

    /// # Errors
    /// Returns an error when `pattern` is not a valid regex.
    pub fn on_message_regex(
        &self,
        pattern: &str,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Result<MatcherBuilder<'_>, regex::Error> {
        Ok(self.on_message_with(rules::regex(pattern)?, rules))
    }

    pub fn on_message_keyword(&self, keyword: &str, rules: impl IntoIterator<Item = Rule>) -> MatcherBuilder<'_> {
        self.on_message_with(rules::keyword(keyword), rules)
    }

    pub fn on_message_keyword_group(
        &self,
        keywords: &[&str],
        rules: impl IntoIterator<Item = Rule>,
    ) -> MatcherBuilder<'_> {
        self.on_message_with(rules::keyword_group(keywords), rules)
    }

    pub fn on_message_full_match(&self, text: &str, rules: impl IntoIterator<Item = Rule>) -> MatcherBuilder<'_> {
        self.on_message_with(rules::full_match(text), rules)
    }

    pub fn on_message_full_match_group(
        &self,
        texts: &[&str],
        rules: impl IntoIterator<Item = Rule>,
    ) -> MatcherBuilder<'_> {
        self.on_message_with(rules::full_match_group(texts), rules)
    }

    /// Handles of the matchers registered through this engine
    pub fn matchers(&self) -> Vec<MatcherHandle> {
        self.handles.lock().clone()
    }

    /// Remove every matcher of this engine; returns how many were registered
    pub fn delete(&self) -> usize {
        let handles = std::mem::take(&mut *self.handles.lock());
        handles.iter().filter(|h| h.delete()).count()
    }

    fn store(&self, mut matcher: Matcher) -> MatcherHandle {
        matcher.hooks = Some(Arc::clone(&self.hooks));
        let handle = self.registry.insert(matcher);
        let mut handles = self.handles.lock();
        handles.retain(MatcherHandle::is_registered);
        handles.push(handle.clone());
        handle
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("service", &self.service)
            .field("priority", &self.priority)
            .field("hooks", &self.hooks)
            .field("matchers", &self.handles.lock().len())
            .finish()
    }
}

/// Builder for a matcher; nothing is registered until a `handle` or
/// `register` call
#[must_use = "the matcher is only registered by `handle` or `register`"]
pub struct MatcherBuilder<'e> {
    engine: &'e Engine,
    matcher: Matcher,
}

impl MatcherBuilder<'_> {
    pub fn rule(mut self, rule: Rule) -> Self {
        self.matcher.rules.push(rule);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.matcher.priority = priority;
        self
    }

    /// Stop evaluating lower-priority matchers once this one handled the event
    pub fn set_block(mut self, block: bool) -> Self {
        self.matcher.block = block;
        self
    }

    /// Abort the whole chain when a rule of this matcher fails
    pub fn set_break(mut self, brk: bool) -> Self {
        self.matcher.break_on_fail = brk;
        self
    }

    /// Remove the matcher after its first handled event
    pub fn temporary(mut self) -> Self {
        self.matcher.temporary = true;
        self
    }

    /// Append a rate limiting rule, see [`rules::LimiterManager`]
    pub fn limit(self, limiter: Rule) -> Self {
        self.rule(limiter)
    }

    /// Register with an async handler
    pub fn handle<F>(mut self, f: F) -> MatcherHandle
    where
        F: for<'a> Fn(&'a mut Ctx) -> BoxFuture<'a, ()> + Send + Sync + 'static,
    {
        self.matcher.handler = Some(Handler::new(f));
        self.engine.store(self.matcher)
    }

    /// Register with a synchronous handler
    pub fn handle_fn<F>(mut self, f: F) -> MatcherHandle
    where
        F: Fn(&mut Ctx) + Send + Sync + 'static,
    {
        self.matcher.handler = Some(Handler::from_fn(f));
        self.engine.store(self.matcher)
    }

    /// Register with a handler taking its own copy of the context
    pub fn handle_owned<F, Fut>(mut self, f: F) -> MatcherHandle
    where
        F: Fn(Ctx) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.matcher.handler = Some(Handler::owned(f));
        self.engine.store(self.matcher)
    }

    /// Register without a handler; rules still run
    pub fn register(self) -> MatcherHandle {
        self.engine.store(self.matcher)
    }
}
