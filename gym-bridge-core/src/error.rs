//! Errors in the environment layer.
use thiserror::Error;

/// Errors raised while building or driving environments.
#[derive(Error, Debug, PartialEq)]
pub enum EnvError {
    /// No constructor is registered under the given name.
    #[error("Unknown environment: {0}")]
    UnknownEnv(String),

    /// A vectorized environment needs at least one instance.
    #[error("A vectorized environment needs at least one instance")]
    EmptyVecEnv,

    /// Instances of a vectorized environment disagree on their spaces.
    #[error("Instance {0} has spaces different from instance 0")]
    SpaceMismatch(usize),

    /// The shape of an action batch does not match the vectorized environment.
    #[error("Invalid action shape {got:?}, expected {expected}")]
    ActionShape {
        /// Shape of the given batch.
        got: Vec<usize>,
        /// Human readable description of the accepted shapes.
        expected: String,
    },

    /// An action is not a member of the action space.
    #[error("Invalid action {act}: {reason}")]
    InvalidAction {
        /// Debug representation of the action.
        act: String,
        /// Why the action was rejected.
        reason: String,
    },
}
