//! # Cancellation Tokens
//!
//! Explicit structured cancellation on top of `tokio::sync::watch`: one root
//! token lives for the whole run loop, and every dispatch (and background
//! handler) gets a child derived from it. Canceling the root propagates to
//! every child; canceling a child affects only that child. Cancellation is
//! cooperative — handlers observe it through [`CancelToken::cancelled`], it
//! never preempts anything.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::watch;

/// A cancellation signal, optionally chained to a parent.
///
/// A child keeps a handle to its whole ancestry, so root cancellation is
/// observed at any nesting depth, not just by direct children.
#[derive(Clone, Debug)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    parent: Option<Box<CancelToken>>,
}

impl CancelToken {
    /// A root token with no parent.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx), parent: None }
    }

    /// Derive a child: canceled when either it or any ancestor is canceled.
    /// Propagation is strictly top-down — canceling the child leaves the
    /// parent (and any siblings) untouched.
    pub fn child(&self) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx), parent: Some(Box::new(self.clone())) }
    }

    /// Cancel this token (and, transitively, its children).
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow() || self.parent.as_ref().is_some_and(|p| p.is_cancelled())
    }

    /// Resolves once this token or any ancestor is canceled.
    ///
    /// Returns a boxed future so the recursion through the ancestor chain
    /// has a finite, provably `Send` future type.
    pub fn cancelled(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let mut own = self.tx.subscribe();
            match &self.parent {
                Some(parent) => {
                    tokio::select! {
                        _ = own.wait_for(|cancelled| *cancelled) => {}
                        _ = parent.cancelled() => {}
                    }
                }
                None => {
                    // The sender is owned by this token, so wait_for cannot fail.
                    let _ = own.wait_for(|cancelled| *cancelled).await;
                }
            }
        })
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
