//! Errors of the server.
use crate::transport::TransportError;
use thiserror::Error;

/// Errors raised while serving requests.
///
/// All variants but [`ServerError::Transport`] are scoped to the request that
/// raised them: they are answered with an error message and the server goes on.
#[derive(Error, Debug)]
pub enum ServerError {
    /// A verb other than `make` was requested before any environment was made.
    #[error("No environment, call make before {method}")]
    NotInitialized {
        /// The rejected method.
        method: &'static str,
    },

    /// `dynamics` was requested on an environment without a transition table.
    #[error("Environment {0} has no transition table")]
    NoTransitionTable(String),

    /// `dynamics` was requested for a pair outside the transition table.
    #[error("No transition for state {state} and action {action}")]
    NoTransition {
        /// Requested state.
        state: usize,
        /// Requested action.
        action: usize,
    },

    /// The request names a method the server does not know.
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// A request parameter is missing or malformed.
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    /// The request could not be decoded.
    #[error("Failed to decode request: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// The response could not be encoded.
    #[error("Failed to encode response: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// The environment failed.
    #[error("Environment error: {0}")]
    Env(#[from] anyhow::Error),

    /// The transport failed. This ends the server loop.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}
