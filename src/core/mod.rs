//! # Core Data Model
//!
//! The virtual-terminal data model, independent of any backend or of the
//! dispatch machinery:
//!
//! - [`cell`]: one character position — symbol plus colors, with the
//!   terminal-default color sentinel
//! - [`buffer`]: the growable grid and the viewport mirrored onto the backend
//! - [`state`]: the opaque routing token handler chains are keyed by
//! - [`config`]: screen options, loadable from a sparse TOML file

pub mod buffer;
pub mod cell;
pub mod config;
pub mod state;
