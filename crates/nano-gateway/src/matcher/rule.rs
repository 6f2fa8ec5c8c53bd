//! Rules and handlers
//!
//! A rule is an async predicate over the context; a handler is the terminal
//! action of a matcher. Both are type-erased behind an `Arc` so matchers can
//! be cloned into each evaluation cheaply.

use std::future::{ready, Future};
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::context::Ctx;

type RuleFn = dyn for<'a> Fn(&'a mut Ctx) -> BoxFuture<'a, bool> + Send + Sync;
type HandlerFn = dyn for<'a> Fn(&'a mut Ctx) -> BoxFuture<'a, ()> + Send + Sync;

/// Runs after a matcher's evaluation whatever its outcome
pub type PostHandler = Arc<dyn Fn(&mut Ctx) + Send + Sync>;

/// Predicate over an event context
#[derive(Clone)]
pub struct Rule(Arc<RuleFn>);

impl Rule {
    /// Rule from a synchronous predicate
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Ctx) -> bool + Send + Sync + 'static,
    {
        Self::new_async(move |ctx| {
            let matched = f(ctx);
            Box::pin(ready(matched))
        })
    }

    /// Rule from a predicate that may suspend, e.g. to wait for a follow-up
    pub fn new_async<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Ctx) -> BoxFuture<'a, bool> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Rule that always passes
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    pub async fn check(&self, ctx: &mut Ctx) -> bool {
        (self.0)(ctx).await
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Rule")
    }
}

/// Terminal handler of a matcher
#[derive(Clone)]
pub struct Handler(Arc<HandlerFn>);

impl Handler {
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Ctx) -> BoxFuture<'a, ()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Handler from a synchronous function
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&mut Ctx) + Send + Sync + 'static,
    {
        Self::new(move |ctx| {
            f(ctx);
            Box::pin(ready(()))
        })
    }

    /// Handler that takes its own copy of the context
    ///
    /// Convenient for handlers written as `async move` blocks that only read
    /// the context.
    pub fn owned<F, Fut>(f: F) -> Self
    where
        F: Fn(Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::new(move |ctx| Box::pin(f(ctx.clone())))
    }

    pub async fn call(&self, ctx: &mut Ctx) {
        (self.0)(ctx).await;
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Handler")
    }
}
