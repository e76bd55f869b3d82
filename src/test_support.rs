//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::backend::event::Event;
use crate::backend::{Backend, BackendError};
use crate::core::cell::{Cell, Color};

/// One call observed by the [`RecordingBackend`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendCall {
    SetCell { x: u16, y: u16, cell: Cell },
    Clear { foreground: Color, background: Color },
    Flush,
    HideCursor,
    ShowCursor { x: u16, y: u16 },
}

/// An in-memory backend that records every draw call and replays a scripted
/// event queue. Once the queue is drained, `poll_event` behaves like an idle
/// terminal (sleeps out its timeout, returns `Ok(None)`).
pub struct RecordingBackend {
    calls: Mutex<Vec<BackendCall>>,
    events: Mutex<VecDeque<Event>>,
    size: (u16, u16),
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::with_events([])
    }

    pub fn with_events(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            events: Mutex::new(events.into_iter().collect()),
            size: (80, 24),
        }
    }

    /// Drain and return everything recorded so far.
    pub fn take_calls(&self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls.lock().unwrap())
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Backend for RecordingBackend {
    fn init(&self) -> Result<(), BackendError> {
        Ok(())
    }

    fn close(&self) {}

    fn poll_event(&self, timeout: Duration) -> Result<Option<Event>, BackendError> {
        if let Some(event) = self.events.lock().unwrap().pop_front() {
            return Ok(Some(event));
        }
        // Mimic a blocking poll on an idle terminal so the polling task
        // doesn't spin.
        std::thread::sleep(timeout);
        Ok(None)
    }

    fn set_cell(&self, x: u16, y: u16, cell: &Cell) -> Result<(), BackendError> {
        self.record(BackendCall::SetCell { x, y, cell: *cell });
        Ok(())
    }

    fn clear(&self, foreground: Color, background: Color) -> Result<(), BackendError> {
        self.record(BackendCall::Clear { foreground, background });
        Ok(())
    }

    fn flush(&self) -> Result<(), BackendError> {
        self.record(BackendCall::Flush);
        Ok(())
    }

    fn size(&self) -> Result<(u16, u16), BackendError> {
        Ok(self.size)
    }

    fn hide_cursor(&self) -> Result<(), BackendError> {
        self.record(BackendCall::HideCursor);
        Ok(())
    }

    fn show_cursor(&self, x: u16, y: u16) -> Result<(), BackendError> {
        self.record(BackendCall::ShowCursor { x, y });
        Ok(())
    }
}

/// Initialize a terminal logger for a test, ignoring double-init errors.
pub fn init_test_logger() {
    let _ = simplelog::TermLogger::init(
        simplelog::LevelFilter::Debug,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
}
