//! # Routing States
//!
//! A [`State`] is an opaque token selecting which handler chain processes
//! incoming events. Applications define their own states; [`NO_STATE`] is the
//! reserved initial state every screen starts in.

use std::borrow::Cow;
use std::fmt;

/// An application-defined routing key.
///
/// States compare by name. Binding handlers to a state and later switching to
/// it (via `Context::set_state`) routes subsequent events through that chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct State(Cow<'static, str>);

/// The default routing state a screen starts in.
pub const NO_STATE: State = State(Cow::Borrowed(""));

impl State {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for State {
    fn default() -> Self {
        NO_STATE
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<no state>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_compare_by_name() {
        assert_eq!(State::new("editor"), State::new(String::from("editor")));
        assert_ne!(State::new("editor"), State::new("browser"));
        assert_eq!(State::default(), NO_STATE);
    }
}
