//! # Handlers
//!
//! The three shapes of application code the dispatcher runs:
//!
//! - [`InitHandler`] — once, synchronously, before the run loop starts.
//! - [`BackgroundHandler`] — once each, as an independent task for the life
//!   of the run loop, owning a root-derived context.
//! - [`Handler`] — per event, as a middleware, state-chain handler, or
//!   postware.
//!
//! Plain (non-async) closures implement the traits via blanket impls, so
//! `screen.bind_handlers(state, [handler(|ctx, event| ...)])` just works;
//! anything that needs to await implements the trait directly.

use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::event::Event;
use crate::dispatch::context::Context;

/// Application code run against one event.
///
/// Handler failures are the application's business: the dispatcher neither
/// catches nor retries them. A handler that panics takes down only its own
/// dispatch task.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &Context, event: &Event);
}

/// Application code run once at startup, before any event is dispatched.
#[async_trait]
pub trait InitHandler: Send + Sync {
    async fn run(&self, ctx: &Context);
}

/// A long-running task started alongside the run loop. Receives an owned
/// root-derived context; should watch `ctx.cancelled()` to learn about
/// shutdown.
#[async_trait]
pub trait BackgroundHandler: Send + Sync {
    async fn run(&self, ctx: Context);
}

#[async_trait]
impl<F> Handler for F
where
    F: Fn(&Context, &Event) + Send + Sync,
{
    async fn handle(&self, ctx: &Context, event: &Event) {
        self(ctx, event);
    }
}

#[async_trait]
impl<F> InitHandler for F
where
    F: Fn(&Context) + Send + Sync,
{
    async fn run(&self, ctx: &Context) {
        self(ctx);
    }
}

pub type SharedHandler = Arc<dyn Handler>;
pub type SharedInitHandler = Arc<dyn InitHandler>;
pub type SharedBackgroundHandler = Arc<dyn BackgroundHandler>;

/// Wrap a plain closure as a chain/middleware/postware handler.
pub fn handler<F>(f: F) -> SharedHandler
where
    F: Fn(&Context, &Event) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a plain closure as an init handler.
pub fn init_handler<F>(f: F) -> SharedInitHandler
where
    F: Fn(&Context) + Send + Sync + 'static,
{
    Arc::new(f)
}
