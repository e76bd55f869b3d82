//! Crossterm-backed terminal. The only module that touches the real
//! terminal: raw mode, the alternate screen, and queued draw commands.

use std::io::{Write, stdout};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use crossterm::style::{Color as CtColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
};
use crossterm::{execute, queue};
use log::info;

use super::event::{Event, normalize};
use super::{Backend, BackendError};
use crate::core::cell::{Cell, Color};

impl From<Color> for CtColor {
    fn from(color: Color) -> Self {
        match color {
            Color::Default => CtColor::Reset,
            Color::Rgb(r, g, b) => CtColor::Rgb { r, g, b },
        }
    }
}

impl From<CtColor> for Color {
    fn from(color: CtColor) -> Self {
        match color {
            CtColor::Rgb { r, g, b } => Color::Rgb(r, g, b),
            // Reset and the named palette colors all mean "let the terminal
            // decide" as far as the portable model is concerned.
            _ => Color::Default,
        }
    }
}

/// The real terminal, via crossterm.
///
/// Stateless by construction: every call builds its command queue against a
/// fresh `stdout()` handle, so the one instance can be shared freely between
/// the polling task and concurrent dispatches.
#[derive(Debug, Default)]
pub struct CrosstermBackend;

impl CrosstermBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for CrosstermBackend {
    fn init(&self) -> Result<(), BackendError> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, EnableMouseCapture, Hide)?;
        info!("Terminal initialized (raw mode, alternate screen, mouse capture)");
        Ok(())
    }

    fn close(&self) {
        // Errors on teardown are unreportable; the terminal is going away.
        let _ = execute!(stdout(), Show, DisableMouseCapture, LeaveAlternateScreen);
        let _ = disable_raw_mode();
        info!("Terminal restored");
    }

    fn poll_event(&self, timeout: Duration) -> Result<Option<Event>, BackendError> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        Ok(normalize(event::read()?))
    }

    fn set_cell(&self, x: u16, y: u16, cell: &Cell) -> Result<(), BackendError> {
        let mut out = stdout();
        queue!(
            out,
            MoveTo(x, y),
            SetForegroundColor(cell.foreground.into()),
            SetBackgroundColor(cell.background.into()),
            Print(cell.symbol),
            ResetColor,
        )?;
        Ok(())
    }

    fn clear(&self, foreground: Color, background: Color) -> Result<(), BackendError> {
        let mut out = stdout();
        queue!(
            out,
            SetForegroundColor(foreground.into()),
            SetBackgroundColor(background.into()),
            Clear(ClearType::All),
            ResetColor,
        )?;
        Ok(())
    }

    fn flush(&self) -> Result<(), BackendError> {
        stdout().flush()?;
        Ok(())
    }

    fn size(&self) -> Result<(u16, u16), BackendError> {
        Ok(terminal::size()?)
    }

    fn hide_cursor(&self) -> Result<(), BackendError> {
        execute!(stdout(), Hide)?;
        Ok(())
    }

    fn show_cursor(&self, x: u16, y: u16) -> Result<(), BackendError> {
        execute!(stdout(), MoveTo(x, y), Show)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sentinel_round_trips_through_backend_colors() {
        let backend_repr: CtColor = Color::Default.into();
        assert_eq!(Color::from(backend_repr), Color::Default);
        assert_ne!(Color::from(backend_repr), Color::Rgb(0, 0, 0));
    }

    #[test]
    fn rgb_round_trips_through_backend_colors() {
        let color = Color::Rgb(21, 21, 21);
        let backend_repr: CtColor = color.into();
        assert_eq!(Color::from(backend_repr), color);
    }

    #[test]
    fn named_backend_colors_collapse_to_default() {
        assert_eq!(Color::from(CtColor::Red), Color::Default);
    }
}
