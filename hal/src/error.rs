//! HAL error types.

use thiserror::Error;
use vela_core::{AllocError, Status, StatusCode};

/// Errors returned by semaphore and fence operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HalError {
    /// A fixed capacity was exceeded.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
    /// Host memory could not be allocated.
    #[error("failed to allocate {size} bytes of host memory (align {align})")]
    AllocationFailure { size: usize, align: usize },
    /// A wait did not complete before its deadline.
    #[error("deadline exceeded")]
    DeadlineExceeded,
    /// The object is not in a state that permits the operation.
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),
    /// A failure status delivered to a semaphore through `fail()`.
    #[error("{0}")]
    PropagatedFailure(Status),
}

impl HalError {
    /// The status code this error maps to.
    pub fn code(&self) -> StatusCode {
        match self {
            Self::ResourceExhausted(_) | Self::AllocationFailure { .. } => {
                StatusCode::ResourceExhausted
            }
            Self::DeadlineExceeded => StatusCode::DeadlineExceeded,
            Self::FailedPrecondition(_) => StatusCode::FailedPrecondition,
            Self::PropagatedFailure(status) => status.code(),
        }
    }
}

impl From<AllocError> for HalError {
    fn from(err: AllocError) -> Self {
        Self::AllocationFailure {
            size: err.size,
            align: err.align,
        }
    }
}

/// Convert an error into the status used to fail dependent work.
///
/// Propagated failures are unwrapped so the original status travels on
/// unchanged.
impl From<HalError> for Status {
    fn from(err: HalError) -> Self {
        match err {
            HalError::PropagatedFailure(status) => status,
            other => Status::new(other.code(), other.to_string()),
        }
    }
}

pub type HalResult<T> = Result<T, HalError>;
