use thiserror::Error;

/// Error type for all protocol operations.
///
/// Every failure is a precondition violation surfaced synchronously to the
/// caller. Operations check all preconditions before mutating anything, so a
/// returned error means no state was touched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SuretyError {
    #[error("not authorized: {0}")]
    Authorization(String),

    #[error("state conflict: {0}")]
    StateConflict(String),

    #[error("insufficient value: required {required}, provided {provided}")]
    InsufficientValue { required: u64, provided: u64 },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("contract is not operational")]
    OperationalHalt,
}
