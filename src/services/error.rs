use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Failure taxonomy for the enrollment workflows. Business-rule violations
/// carry a user-facing message; store errors are logged and collapsed into a
/// generic retry message so internals never leak to the caller.
#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Precondition {
        /// Stable short code, used as the redirect `notice` parameter.
        code: &'static str,
        message: String,
    },

    #[error("you do not have permission to perform this action")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("something went wrong, please try again")]
    Db(#[from] sqlx::Error),
}

impl EnrollmentError {
    pub fn precondition(code: &'static str, message: impl Into<String>) -> Self {
        EnrollmentError::Precondition {
            code,
            message: message.into(),
        }
    }

    /// Short code for redirect-with-notice responses.
    pub fn notice_code(&self) -> &'static str {
        match self {
            EnrollmentError::Validation(_) => "invalid",
            EnrollmentError::Precondition { code, .. } => code,
            EnrollmentError::Forbidden => "forbidden",
            EnrollmentError::NotFound(_) => "not_found",
            EnrollmentError::Db(_) => "error",
        }
    }
}

// Precondition notice codes shared by the services.
pub mod codes {
    pub const FULL: &str = "full";
    pub const INACTIVE: &str = "inactive";
    pub const DUPLICATE: &str = "duplicate";
    pub const CONFLICT: &str = "conflict";
    pub const ALREADY_PROCESSED: &str = "already_processed";
    pub const NOT_CART_ELIGIBLE: &str = "not_cart_eligible";
    pub const ALREADY_STARTED: &str = "already_started";
}

impl IntoResponse for EnrollmentError {
    fn into_response(self) -> Response {
        let status = match &self {
            EnrollmentError::Validation(_) | EnrollmentError::Precondition { .. } => {
                StatusCode::BAD_REQUEST
            }
            EnrollmentError::Forbidden => StatusCode::FORBIDDEN,
            EnrollmentError::NotFound(_) => StatusCode::NOT_FOUND,
            EnrollmentError::Db(e) => {
                error!("database error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}

pub type EnrollmentResult<T> = Result<T, EnrollmentError>;

/// Maps a store-level unique violation onto the same user-facing duplicate
/// message the pre-check produces. The partial unique indexes are the
/// authoritative guard; this keeps the error readable when two concurrent
/// requests race past the pre-check.
pub fn duplicate_on_unique_violation(err: sqlx::Error, message: &str) -> EnrollmentError {
    if let sqlx::Error::Database(ref db) = err {
        if db.is_unique_violation() {
            return EnrollmentError::precondition(codes::DUPLICATE, message);
        }
    }
    EnrollmentError::Db(err)
}
