//! Waiting for a future event from inside a handler
//!
//! A future event is a matcher whose handler forwards the matching context
//! to a channel instead of acting on it. Dropping the receiver side removes
//! the matcher.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

use super::{Handler, Matcher, MatcherHandle, MatcherRegistry, Rule};
use crate::context::Ctx;
use crate::events::EventKind;

/// A matcher waiting for a follow-up event
pub struct FutureEvent {
    registry: Arc<MatcherRegistry>,
    kind: EventKind,
    rules: Vec<Rule>,
    priority: i32,
    block: bool,
}

impl FutureEvent {
    pub fn new(registry: &Arc<MatcherRegistry>, kind: EventKind, rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            registry: Arc::clone(registry),
            kind,
            rules: rules.into_iter().collect(),
            priority: 0,
            block: false,
        }
    }

    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn block(mut self, block: bool) -> Self {
        self.block = block;
        self
    }

    fn matcher(self, handler: Handler, temporary: bool) -> (Arc<MatcherRegistry>, Matcher) {
        let mut matcher = Matcher::new(self.kind, self.rules);
        matcher.priority = self.priority;
        matcher.block = self.block;
        matcher.temporary = temporary;
        matcher.handler = Some(handler);
        (self.registry, matcher)
    }

    /// Wait for the next matching event
    pub fn next(self) -> Pending {
        let (tx, rx) = oneshot::channel();
        let slot = Mutex::new(Some(tx));
        let handler = Handler::from_fn(move |ctx| {
            if let Some(tx) = slot.lock().take() {
                let _ = tx.send(ctx.clone());
            }
        });
        let (registry, matcher) = self.matcher(handler, true);
        Pending {
            rx,
            handle: registry.insert(matcher),
        }
    }

    /// Receive every matching event until the receiver is dropped
    pub fn repeat(self) -> Repeat {
        let (tx, rx) = mpsc::unbounded_channel();
        let handler = Handler::from_fn(move |ctx| {
            let _ = tx.send(ctx.clone());
        });
        let (registry, matcher) = self.matcher(handler, false);
        Repeat {
            rx,
            handle: registry.insert(matcher),
        }
    }
}

/// Receiver of a single future event
pub struct Pending {
    rx: oneshot::Receiver<Ctx>,
    handle: MatcherHandle,
}

impl Pending {
    pub fn handle(&self) -> &MatcherHandle {
        &self.handle
    }

    pub async fn recv(mut self) -> Option<Ctx> {
        (&mut self.rx).await.ok()
    }

    /// Wait at most `timeout`; the matcher is removed either way
    pub async fn recv_timeout(mut self, timeout: Duration) -> Option<Ctx> {
        match tokio::time::timeout(timeout, &mut self.rx).await {
            Ok(received) => received.ok(),
            Err(_) => {
                tracing::debug!(matcher = self.handle.id().0, "Future event timed out");
                None
            }
        }
    }
}

impl Drop for Pending {
    fn drop(&mut self) {
        self.handle.delete();
    }
}

/// Receiver of a stream of future events
pub struct Repeat {
    rx: mpsc::UnboundedReceiver<Ctx>,
    handle: MatcherHandle,
}

impl Repeat {
    pub fn handle(&self) -> &MatcherHandle {
        &self.handle
    }

    pub async fn recv(&mut self) -> Option<Ctx> {
        self.rx.recv().await
    }
}

impl Drop for Repeat {
    fn drop(&mut self) {
        self.handle.delete();
    }
}
