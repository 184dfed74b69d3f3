use thiserror::Error;

use crate::common::auth::DenyReason;
use crate::domains::artefacts::machines::LifecycleEvent;
use crate::domains::artefacts::models::ArtefactStatus;
use crate::kernel::StoreError;

/// Errors surfaced by the access-control and lifecycle core.
///
/// Every variant maps to exactly one HTTP status (see `server::error`).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(DenyReason),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Illegal transition: cannot {event} an artefact in status {from}")]
    IllegalTransition {
        from: ArtefactStatus,
        event: LifecycleEvent,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Unauthenticated => "unauthenticated",
            Error::Forbidden(reason) => reason.code(),
            Error::NotFound(_) => "not_found",
            Error::IllegalTransition { .. } => "illegal_transition",
            Error::Conflict(_) => "conflict",
            Error::InvalidRole(_) => "invalid_role",
            Error::Validation(_) => "validation_error",
            Error::StoreUnavailable(_) => "store_unavailable",
            Error::Internal(_) => "internal_error",
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => Error::Conflict(msg),
            StoreError::NotFound(what) => Error::NotFound(what),
            StoreError::Unavailable(msg) => Error::StoreUnavailable(msg),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
