//! Lifecycle of the server.
use crate::{Method, ServerError};

/// State of the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No environment was made yet. Only `make` is accepted.
    Uninitialized,

    /// An environment is active. Every method is accepted.
    Ready,
}

/// Checks requests against the current [`LifecycleState`].
///
/// There is no way back to [`LifecycleState::Uninitialized`]: a failed `make`
/// keeps the previous environment.
#[derive(Debug)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Lifecycle {
    /// Starts [`LifecycleState::Uninitialized`].
    pub const fn new() -> Self {
        Self {
            state: LifecycleState::Uninitialized,
        }
    }

    /// Current state.
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Rejects `method` if it is not allowed in the current state.
    pub fn on_request(&self, method: Method) -> Result<(), ServerError> {
        match (self.state, method) {
            (LifecycleState::Uninitialized, Method::Make) | (LifecycleState::Ready, _) => Ok(()),
            (LifecycleState::Uninitialized, method) => Err(ServerError::NotInitialized {
                method: method.as_str(),
            }),
        }
    }

    /// Applies the transition of a successful `method`.
    pub fn on_success(&mut self, method: Method) {
        if method == Method::Make {
            self.state = LifecycleState::Ready;
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_only_make_before_ready() {
        let lc = Lifecycle::new();
        assert_eq!(lc.state(), LifecycleState::Uninitialized);
        assert!(lc.on_request(Method::Make).is_ok());
        for m in [Method::Info, Method::Reset, Method::Step, Method::Dynamics] {
            assert!(matches!(
                lc.on_request(m),
                Err(ServerError::NotInitialized { method }) if method == m.as_str()
            ));
        }
    }

    #[test]
    fn test_ready_accepts_everything() {
        let mut lc = Lifecycle::default();
        lc.on_success(Method::Make);
        assert_eq!(lc.state(), LifecycleState::Ready);
        for m in [
            Method::Info,
            Method::Make,
            Method::Reset,
            Method::Step,
            Method::Dynamics,
        ] {
            assert!(lc.on_request(m).is_ok());
            lc.on_success(m);
            assert_eq!(lc.state(), LifecycleState::Ready);
        }
    }
}
