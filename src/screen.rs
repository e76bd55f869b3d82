//! # Screen
//!
//! The top-level object an application embeds: owns the backend and the
//! router, exposes the binding API, and drives the run loop.
//!
//! Lifecycle: construct, `init()`, bind handlers, `run().await`. `run`
//! executes init handlers synchronously, starts background handlers and the
//! event-polling task, then dispatches incoming events until the kill signal
//! arrives. On exit the root cancellation token is canceled (background
//! handlers watching it wind down) and the backend is restored.
//!
//! Dispatch concurrency is configurable (see [`DispatchMode`]): concurrent
//! mode spawns one task per event with no ordering guarantee between events;
//! serial mode processes them one at a time. Either way, grid access is
//! serialized inside the context.

use std::fmt;
use std::sync::Arc;

use log::{info, warn};
use tokio::sync::mpsc;

use crate::backend::event::Event;
use crate::backend::{Backend, BackendError, CrosstermBackend};
use crate::core::config::{DispatchMode, ScreenOptions};
use crate::core::state::State;
use crate::dispatch::cancel::CancelToken;
use crate::dispatch::context::Context;
use crate::dispatch::handler::{SharedBackgroundHandler, SharedHandler, SharedInitHandler};
use crate::dispatch::router::Router;

/// Capacity of the internal normalized-event channel. Input is human-paced;
/// this only buffers bursts between the polling task and the run loop.
const EVENT_CHANNEL_CAPACITY: usize = 128;

#[derive(Debug)]
pub enum ScreenError {
    /// `run()` was called before a successful `init()`.
    NotInitialized,
    Backend(BackendError),
}

impl fmt::Display for ScreenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenError::NotInitialized => write!(f, "screen was not initialized before run"),
            ScreenError::Backend(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ScreenError {}

impl From<BackendError> for ScreenError {
    fn from(e: BackendError) -> Self {
        ScreenError::Backend(e)
    }
}

/// The event-dispatch framework's embedding surface.
pub struct Screen {
    backend: Arc<dyn Backend>,
    router: Router,
    options: ScreenOptions,
    initialized: bool,
}

impl Screen {
    /// A screen on the real terminal with default options.
    pub fn new() -> Self {
        Self::with_options(ScreenOptions::default())
    }

    /// A screen on the real terminal with explicit options.
    pub fn with_options(options: ScreenOptions) -> Self {
        Self::with_backend(Arc::new(CrosstermBackend::new()), options)
    }

    /// A screen on any backend — the seam tests and alternative terminals
    /// plug into.
    pub fn with_backend(backend: Arc<dyn Backend>, options: ScreenOptions) -> Self {
        Self { backend, router: Router::new(), options, initialized: false }
    }

    /// Prepare the backend. Must succeed before `run()`; a failure here is
    /// fatal to startup and nothing is retried.
    pub fn init(&mut self) -> Result<(), ScreenError> {
        self.backend.init()?;
        self.initialized = true;
        Ok(())
    }

    /// Restore the terminal without running. `run()` restores it itself.
    pub fn close(&self) {
        self.backend.close();
    }

    // Binding API. All last-write-wins; call before `run()`.

    pub fn bind_init_handlers(&mut self, handlers: impl IntoIterator<Item = SharedInitHandler>) {
        self.router.bind_init_handlers(handlers);
    }

    pub fn bind_background_handlers(
        &mut self,
        handlers: impl IntoIterator<Item = SharedBackgroundHandler>,
    ) {
        self.router.bind_background_handlers(handlers);
    }

    pub fn bind_global_middlewares(&mut self, handlers: impl IntoIterator<Item = SharedHandler>) {
        self.router.bind_global_middlewares(handlers);
    }

    pub fn bind_global_postwares(&mut self, handlers: impl IntoIterator<Item = SharedHandler>) {
        self.router.bind_global_postwares(handlers);
    }

    pub fn bind_handlers(
        &mut self,
        state: State,
        handlers: impl IntoIterator<Item = SharedHandler>,
    ) {
        self.router.bind_handlers(state, handlers);
    }

    /// Run the dispatch loop until `kill()` is signaled.
    pub async fn run(self) -> Result<(), ScreenError> {
        if !self.initialized {
            return Err(ScreenError::NotInitialized);
        }
        let Self { backend, router, options, .. } = self;
        let router = Arc::new(router);

        let (kill_tx, mut kill_rx) = mpsc::channel(1);
        let root_cancel = CancelToken::new();
        let root = Context::root(
            Arc::clone(&backend),
            options.default_cell,
            kill_tx,
            root_cancel.clone(),
        );

        match backend.size() {
            Ok((width, height)) => root.set_view_size(width, height),
            Err(e) => warn!("Could not read initial terminal size: {e}"),
        }

        for handler in router.init_handlers() {
            handler.run(&root).await;
        }

        for handler in router.background_handlers() {
            let handler = Arc::clone(handler);
            let ctx = root.clone();
            tokio::spawn(async move { handler.run(ctx).await });
        }

        // One dedicated blocking task polls the backend and feeds normalized
        // events into the loop. It exits when the receiver side is dropped.
        let (event_tx, mut event_rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAPACITY);
        let poll_backend = Arc::clone(&backend);
        let poll_timeout = options.poll_timeout;
        tokio::task::spawn_blocking(move || {
            loop {
                match poll_backend.poll_event(poll_timeout) {
                    Ok(Some(event)) => {
                        if event_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        if event_tx.is_closed() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Event poll failed: {e}");
                        if event_tx.is_closed() {
                            break;
                        }
                    }
                }
            }
        });

        info!("Run loop started ({:?} dispatch)", options.dispatch);
        loop {
            // Biased: once kill is signaled, no further event is dispatched.
            tokio::select! {
                biased;
                _ = kill_rx.recv() => {
                    info!("Kill signal received, stopping run loop");
                    break;
                }
                event = event_rx.recv() => {
                    let Some(event) = event else { break };
                    match options.dispatch {
                        DispatchMode::Concurrent => {
                            let router = Arc::clone(&router);
                            let root = root.clone();
                            tokio::spawn(async move { router.dispatch(&root, event).await });
                        }
                        DispatchMode::Serial => router.dispatch(&root, event).await,
                    }
                }
            }
        }

        // Propagates to background handlers and any still-running dispatches.
        root_cancel.cancel();
        backend.close();
        Ok(())
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingBackend;

    #[tokio::test]
    async fn run_without_init_fails() {
        let screen =
            Screen::with_backend(Arc::new(RecordingBackend::new()), ScreenOptions::default());
        assert!(matches!(screen.run().await, Err(ScreenError::NotInitialized)));
    }

    #[tokio::test]
    async fn kill_from_a_middleware_stops_the_run_loop() {
        use crate::dispatch::handler::handler;

        crate::test_support::init_test_logger();
        let backend = Arc::new(RecordingBackend::with_events([Event::key_char('q')]));
        let mut screen = Screen::with_backend(backend, ScreenOptions::default());
        screen.bind_global_middlewares([handler(|ctx: &Context, _event: &Event| ctx.kill())]);
        screen.init().unwrap();

        // Returns only if the kill signal terminates the loop.
        tokio::time::timeout(std::time::Duration::from_secs(5), screen.run())
            .await
            .expect("run loop did not terminate after kill")
            .unwrap();
    }
}
