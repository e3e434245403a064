use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Failure of a store operation. Every variant leaves the store unchanged;
/// these are the typed form of the platform's "guarded no-op" rules.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No active session.
    #[error("no active session")]
    Unauthorized,
    /// The session user is not allowed to perform this operation.
    #[error("operation not permitted")]
    Forbidden,
    /// A referenced entity id is absent from the store.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The operation would violate a uniqueness or self-reference rule.
    #[error("{0}")]
    Conflict(&'static str),
    /// The snapshot could not be written through to storage.
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// `axum`-compatible error handler.
#[derive(Error)]
pub struct Error {
    status: StatusCode,
    err: anyhow::Error,
}

impl Error {
    pub fn with_status(status: StatusCode, err: impl Into<anyhow::Error>) -> Self {
        Self {
            status,
            err: err.into(),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            err,
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        let status = match err {
            StoreError::Unauthorized => StatusCode::UNAUTHORIZED,
            StoreError::Forbidden => StatusCode::FORBIDDEN,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Conflict(_) => StatusCode::CONFLICT,
            StoreError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self {
            status,
            err: err.into(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:?}", self.status, self.err)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.err.fmt(f)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        error!("{:?}", self.err);

        // N.B: Forward out the error message to the requester if this is a debug build.
        // This is insecure for production builds, so we'll return an empty body if this
        // is a release build.
        if cfg!(debug_assertions) {
            Response::builder()
                .status(self.status)
                .body(Body::new(format!("{:?}", self.err)))
                .unwrap()
        } else {
            Response::builder()
                .status(self.status)
                .body(Body::empty())
                .unwrap()
        }
    }
}
