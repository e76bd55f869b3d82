//! # Terminal Backend
//!
//! The core never talks to a terminal directly; everything goes through the
//! [`Backend`] trait. [`CrosstermBackend`] is the shipped implementation, and
//! tests substitute a recording fake. Methods take `&self` — implementations
//! use interior mutability where they need state, which lets one backend be
//! shared between the event-polling task and concurrently running dispatches.

mod crossterm;
pub mod event;

use std::fmt;
use std::time::Duration;

use crate::core::cell::{Cell, Color};
use event::Event;

pub use self::crossterm::CrosstermBackend;

/// Errors reported by a terminal backend.
#[derive(Debug)]
pub enum BackendError {
    /// An underlying I/O operation failed.
    Io(std::io::Error),
    /// The backend cannot provide a required capability.
    Unsupported(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Io(e) => write!(f, "backend I/O error: {e}"),
            BackendError::Unsupported(msg) => write!(f, "backend unsupported: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<std::io::Error> for BackendError {
    fn from(e: std::io::Error) -> Self {
        BackendError::Io(e)
    }
}

/// The minimal terminal contract the dispatch core requires.
///
/// Coordinates are physical screen coordinates — viewport translation has
/// already happened by the time a call reaches the backend.
pub trait Backend: Send + Sync {
    /// Prepare the terminal. Called once before the run loop starts; a
    /// failure here is fatal to startup.
    fn init(&self) -> Result<(), BackendError>;

    /// Restore the terminal. Called once when the run loop exits.
    fn close(&self);

    /// Wait up to `timeout` for the next input event, already normalized.
    /// `Ok(None)` means the timeout elapsed without input.
    fn poll_event(&self, timeout: Duration) -> Result<Option<Event>, BackendError>;

    /// Draw one cell at screen coordinates.
    fn set_cell(&self, x: u16, y: u16, cell: &Cell) -> Result<(), BackendError>;

    /// Clear the whole display using the given colors.
    fn clear(&self, foreground: Color, background: Color) -> Result<(), BackendError>;

    /// Make all queued drawing visible.
    fn flush(&self) -> Result<(), BackendError>;

    /// Current terminal dimensions as (width, height).
    fn size(&self) -> Result<(u16, u16), BackendError>;

    fn hide_cursor(&self) -> Result<(), BackendError>;

    fn show_cursor(&self, x: u16, y: u16) -> Result<(), BackendError>;
}
