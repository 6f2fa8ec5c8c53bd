//! Matcher chain evaluation

use std::sync::Arc;

use super::{Matcher, Rule};
use crate::context::Ctx;

/// Result of one predicate stage (pre-handlers, rules, mid-handlers)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Every predicate passed
    Continue,
    /// A predicate failed; try the next matcher
    Skip,
    /// A predicate failed on a breaking matcher; stop the chain
    Abort,
}

async fn run_stage(rules: &[Rule], ctx: &mut Ctx) -> StageOutcome {
    for rule in rules {
        if !rule.check(ctx).await {
            return if ctx.breaks() {
                StageOutcome::Abort
            } else {
                StageOutcome::Skip
            };
        }
    }
    StageOutcome::Continue
}

/// Run an event through matchers sorted by ascending priority
///
/// Post-handlers of a matcher's engine run after it whatever the outcome.
pub async fn evaluate(mut ctx: Ctx, matchers: Vec<Arc<Matcher>>) {
    for matcher in matchers {
        ctx.state.clear();
        ctx.enter(&matcher);
        let hooks = matcher.hooks().map(|h| h.snapshot()).unwrap_or_default();

        let mut outcome = run_stage(&hooks.pre, &mut ctx).await;
        if outcome == StageOutcome::Continue {
            outcome = run_stage(matcher.rules(), &mut ctx).await;
        }
        if outcome == StageOutcome::Continue {
            outcome = run_stage(&hooks.mid, &mut ctx).await;
        }
        if outcome == StageOutcome::Continue {
            if matcher.claim() {
                tracing::debug!(
                    kind = %matcher.kind(),
                    matcher = matcher.id().0,
                    priority = matcher.priority(),
                    "Matcher handling event"
                );
                if let Some(handler) = matcher.handler() {
                    handler.call(&mut ctx).await;
                }
                if matcher.is_temporary() {
                    matcher.delete();
                }
            } else {
                // a concurrent evaluation already consumed this temporary matcher
                outcome = StageOutcome::Skip;
            }
        }

        for post in &hooks.post {
            post(&mut ctx);
        }

        match outcome {
            StageOutcome::Abort => {
                tracing::debug!(matcher = matcher.id().0, "Matcher chain aborted");
                break;
            }
            StageOutcome::Skip => {}
            StageOutcome::Continue => {
                if ctx.is_blocked() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::events::{EventKind, EventType};
    use crate::matcher::Engine;
    use crate::rules;
    use crate::testing::message_ctx;

    fn record(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> impl Fn(&mut Ctx) + Send + Sync {
        let log = Arc::clone(log);
        move |_| log.lock().push(name)
    }

    async fn run(ctx: Ctx) {
        let matchers = ctx.bot().matchers().snapshot(ctx.kind());
        evaluate(ctx, matchers).await;
    }

    #[tokio::test]
    async fn test_priority_order() {
        let ctx = message_ctx(EventType::AtMessageCreate, "hello");
        let engine = Engine::new(Arc::clone(ctx.bot().matchers()));
        let log = Arc::new(Mutex::new(Vec::new()));

        engine.on_message([]).priority(3).handle_fn(record(&log, "third"));
        engine.on_message([]).priority(1).handle_fn(record(&log, "first"));
        engine.on_message([]).priority(2).handle_fn(record(&log, "second"));

        run(ctx).await;
        assert_eq!(*log.lock(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_block_stops_lower_priorities() {
        let ctx = message_ctx(EventType::AtMessageCreate, "hello");
        let engine = Engine::new(Arc::clone(ctx.bot().matchers()));
        let log = Arc::new(Mutex::new(Vec::new()));

        engine.on_message([]).priority(1).handle_fn(record(&log, "first"));
        engine
            .on_message([])
            .priority(2)
            .set_block(true)
            .handle_fn(record(&log, "second"));
        engine.on_message([]).priority(3).handle_fn(record(&log, "third"));

        run(ctx).await;
        assert_eq!(*log.lock(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_block_only_when_matched() {
        let ctx = message_ctx(EventType::AtMessageCreate, "hello");
        let engine = Engine::new(Arc::clone(ctx.bot().matchers()));
        let log = Arc::new(Mutex::new(Vec::new()));

        engine
            .on_message_prefix("nope", [])
            .priority(1)
            .set_block(true)
            .handle_fn(record(&log, "blocked"));
        engine.on_message([]).priority(2).handle_fn(record(&log, "after"));

        run(ctx).await;
        assert_eq!(*log.lock(), vec!["after"]);
    }

    #[tokio::test]
    async fn test_handler_can_block() {
        let ctx = message_ctx(EventType::AtMessageCreate, "hello");
        let engine = Engine::new(Arc::clone(ctx.bot().matchers()));
        let log = Arc::new(Mutex::new(Vec::new()));

        let first = record(&log, "first");
        engine.on_message([]).priority(1).handle_fn(move |ctx| {
            first(ctx);
            ctx.block();
        });
        engine.on_message([]).priority(2).handle_fn(record(&log, "second"));

        run(ctx).await;
        assert_eq!(*log.lock(), vec!["first"]);
    }

    #[tokio::test]
    async fn test_break_aborts_chain() {
        let ctx = message_ctx(EventType::AtMessageCreate, "hello");
        let engine = Engine::new(Arc::clone(ctx.bot().matchers()));
        let log = Arc::new(Mutex::new(Vec::new()));

        engine
            .on_message_prefix("nope", [])
            .priority(1)
            .set_break(true)
            .handle_fn(record(&log, "broken"));
        engine.on_message([]).priority(2).handle_fn(record(&log, "after"));

        run(ctx.clone()).await;
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn test_rule_can_request_break() {
        let ctx = message_ctx(EventType::AtMessageCreate, "hello");
        let engine = Engine::new(Arc::clone(ctx.bot().matchers()));
        let log = Arc::new(Mutex::new(Vec::new()));

        let breaker = Rule::new(|ctx| {
            ctx.break_chain();
            false
        });
        engine.on_message([breaker]).priority(1).register();
        engine.on_message([]).priority(2).handle_fn(record(&log, "after"));

        run(ctx).await;
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn test_temporary_fires_once() {
        let ctx = message_ctx(EventType::AtMessageCreate, "hello");
        let engine = Engine::new(Arc::clone(ctx.bot().matchers()));
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        engine.on_message([]).temporary().handle_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        run(ctx.clone()).await;
        run(ctx.clone()).await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.bot().matchers().count(EventKind::Message), 0);
    }

    #[tokio::test]
    async fn test_temporary_survives_until_matched() {
        let ctx = message_ctx(EventType::AtMessageCreate, "hello");
        let engine = Engine::new(Arc::clone(ctx.bot().matchers()));

        engine.on_message_prefix("nope", []).temporary().register();
        run(ctx.clone()).await;

        assert_eq!(ctx.bot().matchers().count(EventKind::Message), 1);
    }

    #[tokio::test]
    async fn test_post_handlers_run_on_skip() {
        let ctx = message_ctx(EventType::AtMessageCreate, "hello");
        let engine = Engine::new(Arc::clone(ctx.bot().matchers()));
        let posts = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&posts);
        engine.use_post_handler(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        engine.on_message_prefix("nope", []).register();
        engine.on_message_prefix("hel", []).register();

        run(ctx).await;
        assert_eq!(posts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_state_cleared_between_matchers() {
        let ctx = message_ctx(EventType::AtMessageCreate, "hello world");
        let engine = Engine::new(Arc::clone(ctx.bot().matchers()));
        let seen = Arc::new(Mutex::new(Vec::new()));

        engine.on_message_prefix("hello", []).priority(1).register();
        let sink = Arc::clone(&seen);
        engine.on_message([]).priority(2).handle_fn(move |ctx| {
            sink.lock().push(ctx.state.get_str("args").map(str::to_string));
        });

        run(ctx).await;
        assert_eq!(*seen.lock(), vec![None]);
    }

    #[tokio::test]
    async fn test_pre_handler_gates_all_matchers() {
        let ctx = message_ctx(EventType::AtMessageCreate, "hello");
        let engine = Engine::new(Arc::clone(ctx.bot().matchers()));
        let log = Arc::new(Mutex::new(Vec::new()));

        engine.use_pre_handler(rules::only_direct());
        engine.on_message([]).handle_fn(record(&log, "gated"));

        run(ctx).await;
        assert!(log.lock().is_empty());
    }
}
