//! # Portable Events
//!
//! The closed set of event variants the dispatcher routes. Backend-native
//! events are translated into exactly one of these (or dropped) by
//! [`normalize`]; the mapping is pure and stateless.
//!
//! Key and mouse code tables are not redefined here — the variants carry
//! crossterm's `KeyCode`/`KeyModifiers`/`MouseEventKind`, which are plain
//! data enums with no I/O attached.

use crossterm::event::{Event as CrosstermEvent, KeyEventKind};

pub use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEventKind};

/// A keyboard event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// The printable character, when the key produces one.
    pub symbol: Option<char>,
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

/// A mouse event at screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseEvent {
    pub x: u16,
    pub y: u16,
    pub kind: MouseEventKind,
    pub modifiers: KeyModifiers,
}

/// An input event as seen by handler chains.
///
/// Matched exhaustively everywhere — adding a variant is a compile error at
/// every dispatch site, never a silent default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// New terminal dimensions. Consumed by the dispatcher itself (viewport
    /// size update), never routed through handler chains.
    Resize(u16, u16),
}

impl Event {
    /// Convenience constructor for a plain character key press.
    pub fn key_char(c: char) -> Self {
        Event::Key(KeyEvent {
            symbol: Some(c),
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::NONE,
        })
    }
}

/// Translate a backend-native crossterm event into a portable [`Event`].
///
/// Returns `None` for event types the dispatcher has no use for (focus
/// changes, bracketed paste, key releases) — those are dropped, not routed.
pub fn normalize(native: CrosstermEvent) -> Option<Event> {
    match native {
        CrosstermEvent::Key(key) => {
            // Release events would double-fire every chain on terminals
            // reporting them (kitty protocol).
            if key.kind == KeyEventKind::Release {
                return None;
            }
            let symbol = match key.code {
                KeyCode::Char(c) => Some(c),
                _ => None,
            };
            Some(Event::Key(KeyEvent {
                symbol,
                code: key.code,
                modifiers: key.modifiers,
            }))
        }
        CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(MouseEvent {
            x: mouse.column,
            y: mouse.row,
            kind: mouse.kind,
            modifiers: mouse.modifiers,
        })),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        _ => None,
    }
}
