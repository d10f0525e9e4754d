//! Error types for throttle operations

use thiserror::Error;

/// Errors reported by a [`GroupThrottle`](crate::GroupThrottle) or an
/// [`AnyThrottle`](crate::AnyThrottle)
#[derive(Debug, Error)]
pub enum ThrottleError {
    /// The handle was closed; its control loop no longer accepts commands
    #[error("throttle is closed")]
    Closed,

    /// Keys must be non-empty
    #[error("key must not be empty")]
    EmptyKey,

    /// Item does not match the element type the callback was bound with
    #[error("type does not match callback: expected {expected}, found {found}")]
    InvalidType {
        expected: &'static str,
        found: &'static str,
    },

    /// Bound value is not a function
    #[error("callback must be a function")]
    NotCallable,

    /// Callback does not take exactly one parameter
    #[error("callback must have a single param, found {0}")]
    ParamCount(usize),

    /// The single callback parameter is not a sequence of items
    #[error("callback param must be a sequence")]
    ParamType,

    /// Tokio dispatch was requested outside of a Tokio runtime
    #[error("tokio dispatch requires a running tokio runtime")]
    NoRuntime,

    /// The control loop thread could not be started
    #[error("failed to spawn control loop: {0}")]
    Spawn(#[from] std::io::Error),
}

impl ThrottleError {
    /// Construction-time errors are never worth retrying
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            ThrottleError::NotCallable
                | ThrottleError::ParamCount(_)
                | ThrottleError::ParamType
                | ThrottleError::NoRuntime
        )
    }
}
