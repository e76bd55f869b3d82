//! # Dispatch Engine
//!
//! Event routing: the router holds the binding tables (state-keyed handler
//! chains plus global middlewares/postwares), and each dispatched event runs
//! against a child [`context::Context`] derived from the root: middlewares
//! first, then the current state's chain (abortable), then postwares, with
//! the child's cancellation token canceled once the cycle completes.

pub mod cancel;
pub mod context;
pub mod handler;
pub(crate) mod router;
