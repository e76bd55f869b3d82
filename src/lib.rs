//! # termflow
//!
//! A terminal event-dispatch framework: input and resize events from a
//! terminal backend are normalized into a closed [`Event`] type and routed
//! through handler chains keyed by an application-defined [`State`], while
//! handlers draw into a growable virtual grid that is mirrored onto the
//! terminal through a movable viewport.
//!
//! ```no_run
//! use termflow::{Event, NO_STATE, Screen, handler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), termflow::ScreenError> {
//!     let mut screen = Screen::new();
//!     screen.bind_global_middlewares([handler(|ctx, event| {
//!         if let Event::Key(key) = event {
//!             if key.symbol == Some('q') {
//!                 ctx.abort();
//!                 ctx.kill();
//!             }
//!         }
//!     })]);
//!     screen.bind_handlers(NO_STATE, [handler(|ctx, event| {
//!         if let Event::Key(_) = event {
//!             let _ = ctx.set_text(0, 0, "hello", termflow::Color::Default,
//!                 termflow::Color::Default);
//!             let _ = ctx.flush();
//!         }
//!     })]);
//!     screen.init()?;
//!     screen.run().await
//! }
//! ```

pub mod backend;
pub mod core;
pub mod dispatch;
mod screen;

#[cfg(test)]
pub mod test_support;

pub use crate::backend::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
pub use crate::backend::{Backend, BackendError, CrosstermBackend};
pub use crate::core::buffer::Viewport;
pub use crate::core::cell::{Cell, Color, DEFAULT_CELL};
pub use crate::core::config::{ConfigError, DispatchMode, ScreenOptions, TermflowConfig};
pub use crate::core::state::{NO_STATE, State};
pub use crate::dispatch::cancel::CancelToken;
pub use crate::dispatch::context::Context;
pub use crate::dispatch::handler::{
    BackgroundHandler, Handler, InitHandler, SharedBackgroundHandler, SharedHandler,
    SharedInitHandler, handler, init_handler,
};
pub use crate::screen::{Screen, ScreenError};
