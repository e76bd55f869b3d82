//! # Router
//!
//! Owns every binding table — init handlers, background handlers, global
//! middlewares, global postwares, and the state → handler-chain map — and
//! drives one event through its full dispatch cycle.
//!
//! Dispatch order for one event: middlewares, then the current state's chain
//! (cursor-driven, abortable), then postwares — strictly sequential. Resize
//! events short-circuit into a viewport size update and are never routed.

use std::collections::HashMap;

use log::{debug, trace};

use crate::backend::event::Event;
use crate::core::state::State;
use crate::dispatch::context::Context;
use crate::dispatch::handler::{SharedBackgroundHandler, SharedHandler, SharedInitHandler};

/// The binding table and dispatch engine.
///
/// All `bind_*` methods are last-write-wins: binding a key that already has
/// handlers replaces the previous chain wholesale.
#[derive(Default)]
pub(crate) struct Router {
    init_handlers: Vec<SharedInitHandler>,
    background_handlers: Vec<SharedBackgroundHandler>,
    middlewares: Vec<SharedHandler>,
    postwares: Vec<SharedHandler>,
    bindings: HashMap<State, Vec<SharedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_init_handlers(&mut self, handlers: impl IntoIterator<Item = SharedInitHandler>) {
        self.init_handlers = handlers.into_iter().collect();
    }

    pub fn bind_background_handlers(
        &mut self,
        handlers: impl IntoIterator<Item = SharedBackgroundHandler>,
    ) {
        self.background_handlers = handlers.into_iter().collect();
    }

    pub fn bind_global_middlewares(&mut self, handlers: impl IntoIterator<Item = SharedHandler>) {
        self.middlewares = handlers.into_iter().collect();
    }

    pub fn bind_global_postwares(&mut self, handlers: impl IntoIterator<Item = SharedHandler>) {
        self.postwares = handlers.into_iter().collect();
    }

    pub fn bind_handlers(
        &mut self,
        state: State,
        handlers: impl IntoIterator<Item = SharedHandler>,
    ) {
        self.bindings.insert(state, handlers.into_iter().collect());
    }

    pub fn init_handlers(&self) -> &[SharedInitHandler] {
        &self.init_handlers
    }

    pub fn background_handlers(&self) -> &[SharedBackgroundHandler] {
        &self.background_handlers
    }

    /// Run one event through its full dispatch cycle.
    pub async fn dispatch(&self, root: &Context, event: Event) {
        // Resize is consumed here: viewport bookkeeping, not application input.
        if let Event::Resize(width, height) = event {
            debug!("Resize to {width}x{height}");
            root.set_view_size(width, height);
            return;
        }

        let state = root.state();
        // An unbound state is an empty chain, silently a no-op — never an error.
        let chain = self.bindings.get(&state).cloned().unwrap_or_default();
        trace!("Dispatching {event:?} in state {state} (chain of {})", chain.len());

        let ctx = root.child();

        for middleware in &self.middlewares {
            middleware.handle(&ctx, &event).await;
        }

        // Cursor and abort flag are re-read every iteration: a handler may
        // abort the chain mid-flight.
        loop {
            let index = ctx.cursor_index();
            if ctx.chain_aborted() || index >= chain.len() {
                break;
            }
            chain[index].handle(&ctx, &event).await;
            ctx.advance_cursor();
        }

        // Postwares are unconditional — they run even after an abort.
        for postware in &self.postwares {
            postware.handle(&ctx, &event).await;
        }

        ctx.cancel_dispatch();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::backend::event::Event;
    use crate::core::cell::DEFAULT_CELL;
    use crate::core::state::NO_STATE;
    use crate::dispatch::cancel::CancelToken;
    use crate::dispatch::handler::handler;
    use crate::test_support::RecordingBackend;

    fn test_root() -> Context {
        let (kill_tx, _kill_rx) = tokio::sync::mpsc::channel(1);
        // The receiver is gone, so kill() becomes a no-op — fine for these tests.
        Context::root(Arc::new(RecordingBackend::new()), DEFAULT_CELL, kill_tx, CancelToken::new())
    }

    /// A handler that appends its label to a shared trace.
    fn tracing(label: &'static str, trace: &Arc<Mutex<Vec<&'static str>>>) -> SharedHandler {
        let trace = Arc::clone(trace);
        handler(move |_ctx, _event| trace.lock().unwrap().push(label))
    }

    #[tokio::test]
    async fn full_chain_runs_in_bound_order() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();
        router.bind_global_middlewares([tracing("M1", &trace), tracing("M2", &trace)]);
        router.bind_handlers(
            NO_STATE,
            [tracing("H1", &trace), tracing("H2", &trace), tracing("H3", &trace)],
        );
        router.bind_global_postwares([tracing("P1", &trace)]);

        router.dispatch(&test_root(), Event::key_char('x')).await;

        assert_eq!(*trace.lock().unwrap(), vec!["M1", "M2", "H1", "H2", "H3", "P1"]);
    }

    #[tokio::test]
    async fn abort_skips_rest_of_chain_but_not_postwares() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();
        router.bind_global_middlewares([tracing("M1", &trace), tracing("M2", &trace)]);

        let aborting = {
            let trace = Arc::clone(&trace);
            handler(move |ctx: &Context, _event: &Event| {
                trace.lock().unwrap().push("H1");
                ctx.abort();
            })
        };
        router.bind_handlers(NO_STATE, [aborting, tracing("H2", &trace), tracing("H3", &trace)]);
        router.bind_global_postwares([tracing("P1", &trace)]);

        router.dispatch(&test_root(), Event::key_char('x')).await;

        assert_eq!(*trace.lock().unwrap(), vec!["M1", "M2", "H1", "P1"]);
    }

    #[tokio::test]
    async fn abort_from_middleware_skips_whole_chain() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();
        router.bind_global_middlewares([handler(|ctx: &Context, _event: &Event| ctx.abort())]);
        router.bind_handlers(NO_STATE, [tracing("H1", &trace)]);
        router.bind_global_postwares([tracing("P1", &trace)]);

        router.dispatch(&test_root(), Event::key_char('x')).await;

        assert_eq!(*trace.lock().unwrap(), vec!["P1"]);
    }

    #[tokio::test]
    async fn unbound_state_is_a_silent_no_op() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();
        router.bind_global_postwares([tracing("P1", &trace)]);

        let root = test_root();
        root.set_state(State::new("nowhere"));
        router.dispatch(&root, Event::key_char('x')).await;

        assert_eq!(*trace.lock().unwrap(), vec!["P1"]);
    }

    #[tokio::test]
    async fn rebinding_replaces_a_chain() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();
        router.bind_handlers(NO_STATE, [tracing("old", &trace)]);
        router.bind_handlers(NO_STATE, [tracing("new", &trace)]);

        router.dispatch(&test_root(), Event::key_char('x')).await;

        assert_eq!(*trace.lock().unwrap(), vec!["new"]);
    }

    #[tokio::test]
    async fn state_transition_routes_the_next_event() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();

        let switching = {
            let trace = Arc::clone(&trace);
            handler(move |ctx: &Context, _event: &Event| {
                trace.lock().unwrap().push("base");
                ctx.set_state(State::new("editor"));
            })
        };
        router.bind_handlers(NO_STATE, [switching]);
        router.bind_handlers(State::new("editor"), [tracing("editor", &trace)]);

        let root = test_root();
        router.dispatch(&root, Event::key_char('a')).await;
        router.dispatch(&root, Event::key_char('b')).await;

        assert_eq!(*trace.lock().unwrap(), vec!["base", "editor"]);
    }

    #[tokio::test]
    async fn resize_updates_viewport_without_routing() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();
        router.bind_global_middlewares([tracing("M1", &trace)]);
        router.bind_handlers(NO_STATE, [tracing("H1", &trace)]);

        let root = test_root();
        router.dispatch(&root, Event::Resize(120, 40)).await;

        assert!(trace.lock().unwrap().is_empty());
        let view = root.viewport();
        assert_eq!((view.width, view.height), (120, 40));
    }

    #[tokio::test]
    async fn dispatch_cancels_its_child_token_when_done() {
        let seen: Arc<Mutex<Option<Context>>> = Arc::new(Mutex::new(None));
        let mut router = Router::new();
        let capture = {
            let seen = Arc::clone(&seen);
            handler(move |ctx: &Context, _event: &Event| {
                *seen.lock().unwrap() = Some(ctx.clone());
            })
        };
        router.bind_handlers(NO_STATE, [capture]);

        router.dispatch(&test_root(), Event::key_char('x')).await;

        let ctx = seen.lock().unwrap().take().unwrap();
        assert!(ctx.is_cancelled());
    }
}
