// ============================================================================
// ROCKET PARTS PLATFORM - SHARED ERROR TAXONOMY
// ============================================================================
// Module: shared/src/error.rs
// Description: Closed error taxonomy shared by order/inventory/payment
//              services, with boundary classifiers into HTTP and gRPC.
// ============================================================================

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Closed set of domain error kinds. Every failure in the saga is one of
/// these; callers branch on the variant, never on a message string.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("insufficient stock for {sku}: requested {requested}, available {available}")]
    InsufficientStock {
        sku: String,
        requested: i32,
        available: i32,
    },

    #[error("optimistic conflict on {entity} {id}")]
    OptimisticConflict { entity: String, id: String },

    #[error("{service} dependency failed: {source}")]
    ExternalDependency { service: String, source: String },

    #[error("{operation} timed out")]
    Timeout { operation: String },

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether a failure of this kind is safe to retry at the RPC client
    /// boundary (see shared::retry). Validation/not-found/conflict kinds
    /// are never retryable; they reflect a decision already made.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::ExternalDependency { .. } | Error::Timeout { .. }
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) | Error::OptimisticConflict { .. } => StatusCode::CONFLICT,
            Error::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            Error::ExternalDependency { .. } => StatusCode::BAD_GATEWAY,
            Error::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::NotFound(_) => "not_found",
            Error::Conflict(_) => "conflict",
            Error::InsufficientStock { .. } => "insufficient_stock",
            Error::OptimisticConflict { .. } => "optimistic_conflict",
            Error::ExternalDependency { .. } => "external_dependency",
            Error::Timeout { .. } => "timeout",
            Error::Internal(_) => "internal",
        }
    }

    /// Classify a gRPC status received from a downstream service into the
    /// shared taxonomy. This is the single place string/code matching on
    /// tonic statuses happens; everywhere else operates on `Error`.
    pub fn from_status(service: &str, status: &tonic::Status) -> Self {
        use tonic::Code;
        match status.code() {
            Code::InvalidArgument => Error::Validation(status.message().to_string()),
            Code::NotFound => Error::NotFound(status.message().to_string()),
            Code::AlreadyExists | Code::FailedPrecondition => {
                Error::Conflict(status.message().to_string())
            }
            Code::DeadlineExceeded => Error::Timeout {
                operation: format!("{service}: {}", status.message()),
            },
            _ => Error::ExternalDependency {
                service: service.to_string(),
                source: status.message().to_string(),
            },
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("row not found".to_string()),
            other => Error::Internal(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Internal(format!("serialization error: {err}"))
    }
}

impl From<Error> for tonic::Status {
    fn from(err: Error) -> Self {
        use tonic::Code;
        let code = match &err {
            Error::Validation(_) | Error::InsufficientStock { .. } => Code::InvalidArgument,
            Error::NotFound(_) => Code::NotFound,
            Error::Conflict(_) => Code::AlreadyExists,
            Error::OptimisticConflict { .. } => Code::FailedPrecondition,
            Error::ExternalDependency { .. } => Code::Unavailable,
            Error::Timeout { .. } => Code::DeadlineExceeded,
            Error::Internal(_) => Code::Internal,
        };
        tonic::Status::new(code, err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_retryable_status_codes() {
        let unavailable = tonic::Status::unavailable("down");
        assert!(Error::from_status("inventory", &unavailable).is_retryable());

        let deadline = tonic::Status::deadline_exceeded("slow");
        assert!(Error::from_status("inventory", &deadline).is_retryable());
    }

    #[test]
    fn classifies_non_retryable_status_codes() {
        let invalid = tonic::Status::invalid_argument("bad sku");
        let classified = Error::from_status("inventory", &invalid);
        assert!(!classified.is_retryable());
        assert!(matches!(classified, Error::Validation(_)));

        let exists = tonic::Status::already_exists("dup");
        assert!(!Error::from_status("inventory", &exists).is_retryable());
    }

    #[test]
    fn http_status_mapping() {
        assert_eq!(
            Error::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::InsufficientStock {
                sku: "RKT-ENG-001".into(),
                requested: 2,
                available: 1
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
