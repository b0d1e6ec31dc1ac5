//! Error types for the FaunaDB provider.

use thiserror::Error;

/// Errors that can occur during a resource lifecycle operation.
///
/// Validation problems discovered by `Check` are *not* errors; they are
/// returned as data ([`CheckFailure`](crate::handler::CheckFailure)) so the
/// orchestrator can report every problem at once. Everything here terminates
/// the call with a distinguishing code the orchestrator can act on.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The URN names a resource type this provider does not implement.
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    /// A resource URN could not be parsed.
    #[error("Invalid resource URN: {0}")]
    InvalidUrn(String),

    /// An input property is missing, mistyped, or still unknown where a
    /// concrete value is required.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backend could not be reached or refused the call. Transient;
    /// the orchestrator owns the retry policy.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend has no resource with the given ID. `Read` surfaces this
    /// so the orchestrator learns about out-of-band deletion; `Delete`
    /// treats the same condition as success.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A lifecycle call was made that the diff classification forbids,
    /// e.g. `Update` for a change that requires replacement.
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// The operation was aborted by a cancellation signal.
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// A property bag could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ProviderError> for tonic::Status {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::UnknownResourceType(msg) => tonic::Status::not_found(msg),
            ProviderError::InvalidUrn(msg) => tonic::Status::invalid_argument(msg),
            ProviderError::Validation(msg) => tonic::Status::invalid_argument(msg),
            ProviderError::BackendUnavailable(msg) => tonic::Status::unavailable(msg),
            ProviderError::NotFound(msg) => tonic::Status::not_found(msg),
            ProviderError::InvalidStateTransition(msg) => tonic::Status::failed_precondition(msg),
            ProviderError::Cancelled(msg) => tonic::Status::cancelled(msg),
            ProviderError::Serialization(err) => {
                tonic::Status::invalid_argument(format!("Serialization error: {}", err))
            },
        }
    }
}
