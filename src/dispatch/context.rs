//! # Execution Context
//!
//! The [`Context`] is what every handler receives: the shared drawing surface
//! (grid + viewport + backend behind one lock), the shared routing state, and
//! the per-dispatch control surface (chain cursor, cancellation, kill).
//!
//! One root context is created when the run loop starts and lives for the
//! process; each dispatched event gets a child derived from it. Children
//! share the grid, viewport, and routing state by reference — only the chain
//! cursor and the cancellation token are per-dispatch.
//!
//! Grid and viewport mutation (including the backend writes it triggers) is
//! serialized behind a single mutex, so concurrently running dispatches never
//! interleave partial updates. The lock is only ever held inside synchronous
//! calls, never across an await.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::backend::{Backend, BackendError};
use crate::core::buffer::{CellBuffer, Viewport};
use crate::core::cell::{Cell, Color};
use crate::core::state::State;
use crate::dispatch::cancel::CancelToken;

/// Where one dispatch is in its handler chain.
///
/// `aborted` is an explicit flag: once set, the chain loop stops at its next
/// iteration check, whatever the index says.
#[derive(Debug, Default)]
struct ChainCursor {
    index: usize,
    aborted: bool,
}

/// State shared by the root context and every child: the drawing surface,
/// the current routing state, and the kill signal.
struct Shared {
    backend: Arc<dyn Backend>,
    buffer: Mutex<CellBuffer>,
    state: Mutex<State>,
    kill_tx: mpsc::Sender<()>,
}

/// The execution context threaded through handlers.
///
/// Cloning is cheap and shares everything except nothing — clones are handed
/// to background tasks; per-dispatch children come from [`Context::child`].
#[derive(Clone)]
pub struct Context {
    shared: Arc<Shared>,
    cursor: Arc<Mutex<ChainCursor>>,
    cancel: CancelToken,
}

impl Context {
    pub(crate) fn root(
        backend: Arc<dyn Backend>,
        default_cell: Cell,
        kill_tx: mpsc::Sender<()>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                backend,
                buffer: Mutex::new(CellBuffer::new(default_cell)),
                state: Mutex::new(State::default()),
                kill_tx,
            }),
            cursor: Arc::new(Mutex::new(ChainCursor::default())),
            cancel,
        }
    }

    /// Derive the per-dispatch child: shared surface, fresh cursor, fresh
    /// child cancellation token.
    pub(crate) fn child(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            cursor: Arc::new(Mutex::new(ChainCursor::default())),
            cancel: self.cancel.child(),
        }
    }

    // Drawing

    pub fn set_cell(&self, x: i32, y: i32, cell: Cell) -> Result<(), BackendError> {
        self.with_buffer(|buffer, backend| buffer.set_cell(backend, x, y, cell))
    }

    pub fn get_cell(&self, x: i32, y: i32) -> Cell {
        self.shared.buffer.lock().unwrap().get_cell(x, y)
    }

    pub fn set_row(&self, y: i32, cells: &[Cell]) -> Result<(), BackendError> {
        self.with_buffer(|buffer, backend| buffer.set_row(backend, y, cells))
    }

    pub fn set_column(&self, x: i32, cells: &[Cell]) -> Result<(), BackendError> {
        self.with_buffer(|buffer, backend| buffer.set_column(backend, x, cells))
    }

    pub fn clear_row(&self, y: i32) -> Result<(), BackendError> {
        self.with_buffer(|buffer, backend| buffer.clear_row(backend, y))
    }

    pub fn clear_column(&self, x: i32) -> Result<(), BackendError> {
        self.with_buffer(|buffer, backend| buffer.clear_column(backend, x))
    }

    pub fn set_text(
        &self,
        x: i32,
        y: i32,
        text: &str,
        foreground: Color,
        background: Color,
    ) -> Result<(), BackendError> {
        self.with_buffer(|buffer, backend| {
            buffer.set_text(backend, x, y, text, foreground, background)
        })
    }

    /// Discard the whole grid and clear the display.
    pub fn clear(&self) -> Result<(), BackendError> {
        self.with_buffer(|buffer, backend| buffer.clear(backend))
    }

    pub fn set_view_position(&self, x: i32, y: i32) -> Result<(), BackendError> {
        self.with_buffer(|buffer, backend| buffer.set_view_position(backend, x, y))
    }

    /// Repaint the viewport from the grid in full.
    pub fn redraw_view(&self) -> Result<(), BackendError> {
        self.with_buffer(|buffer, backend| buffer.redraw_view(backend))
    }

    pub(crate) fn set_view_size(&self, width: u16, height: u16) {
        self.shared.buffer.lock().unwrap().set_view_size(width, height);
    }

    pub fn viewport(&self) -> Viewport {
        self.shared.buffer.lock().unwrap().viewport()
    }

    pub fn default_cell(&self) -> Cell {
        self.shared.buffer.lock().unwrap().default_cell()
    }

    // Backend passthrough

    pub fn flush(&self) -> Result<(), BackendError> {
        self.shared.backend.flush()
    }

    pub fn size(&self) -> Result<(u16, u16), BackendError> {
        self.shared.backend.size()
    }

    pub fn hide_cursor(&self) -> Result<(), BackendError> {
        self.shared.backend.hide_cursor()
    }

    pub fn show_cursor(&self, x: u16, y: u16) -> Result<(), BackendError> {
        self.shared.backend.show_cursor(x, y)
    }

    // Routing state

    /// The current routing state.
    pub fn state(&self) -> State {
        self.shared.state.lock().unwrap().clone()
    }

    /// Transition to another routing state. Takes effect for the next
    /// dispatched event; the current chain keeps running.
    pub fn set_state(&self, state: State) {
        *self.shared.state.lock().unwrap() = state;
    }

    // Dispatch control

    /// Skip the remaining handlers of the current state chain for this event.
    /// Global postwares still run.
    pub fn abort(&self) {
        self.cursor.lock().unwrap().aborted = true;
    }

    /// Stop the whole run loop. Sends on a single-slot channel; repeated
    /// calls are a no-op.
    pub fn kill(&self) {
        let _ = self.shared.kill_tx.try_send(());
    }

    /// Resolves when this dispatch's token (or the root's, at shutdown) is
    /// canceled. The cooperation point for long-running handler code.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    // Dispatcher internals

    pub(crate) fn cursor_index(&self) -> usize {
        self.cursor.lock().unwrap().index
    }

    pub(crate) fn advance_cursor(&self) {
        self.cursor.lock().unwrap().index += 1;
    }

    pub(crate) fn chain_aborted(&self) -> bool {
        self.cursor.lock().unwrap().aborted
    }

    /// Cancel this dispatch's token, releasing anything derived from it.
    pub(crate) fn cancel_dispatch(&self) {
        self.cancel.cancel();
    }

    fn with_buffer<T>(
        &self,
        op: impl FnOnce(&mut CellBuffer, &dyn Backend) -> Result<T, BackendError>,
    ) -> Result<T, BackendError> {
        let mut buffer = self.shared.buffer.lock().unwrap();
        op(&mut buffer, self.shared.backend.as_ref())
    }
}
