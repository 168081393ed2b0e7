//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Every
//! failure the core can produce is an expected, recoverable condition that
//! is reported back to the caller: over REST as a structured JSON body, over
//! the WebSocket session adapter as an `error` envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::lot::format_amount;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1002,
///     "message": "bid must be at least $2,000"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 Internal Server Error    |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Bid amount is below the current minimum acceptable bid.
    #[error("bid must be at least ${}", format_amount(*minimum))]
    BidTooLow {
        /// Smallest amount that would have been accepted.
        minimum: u64,
    },

    /// Bid amount is zero.
    #[error("bid amount must be positive")]
    NonPositiveBid,

    /// Chat message is empty after trimming.
    #[error("message cannot be empty")]
    EmptyMessage,

    /// The caller invoked an operation before joining / connecting.
    #[error("you must join first")]
    NotJoined,

    /// No auction round is currently accepting bids.
    #[error("no active auction")]
    NoActiveAuction,

    /// Note with the given ID was not found.
    #[error("note {0} not found")]
    NoteNotFound(String),

    /// Invalid startup configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::BidTooLow { .. } => 1002,
            Self::NonPositiveBid => 1003,
            Self::EmptyMessage => 1004,
            Self::NotJoined => 1005,
            Self::NoActiveAuction => 2001,
            Self::NoteNotFound(_) => 2002,
            Self::Configuration(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::BidTooLow { .. }
            | Self::NonPositiveBid
            | Self::EmptyMessage
            | Self::NotJoined => StatusCode::BAD_REQUEST,
            Self::NoActiveAuction => StatusCode::CONFLICT,
            Self::NoteNotFound(_) => StatusCode::NOT_FOUND,
            Self::Configuration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds the structured body shared by REST and WebSocket error replies.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.error_code(),
            message: self.to_string(),
            details: None,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_body(),
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn bid_too_low_names_formatted_minimum() {
        let err = GatewayError::BidTooLow { minimum: 2000 };
        assert_eq!(err.to_string(), "bid must be at least $2,000");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn state_errors_map_to_conflict_and_not_found() {
        assert_eq!(
            GatewayError::NoActiveAuction.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            GatewayError::NoteNotFound("n-1".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn body_carries_code_and_message() {
        let body = GatewayError::EmptyMessage.to_body();
        assert_eq!(body.code, 1004);
        assert_eq!(body.message, "message cannot be empty");
        assert!(body.details.is_none());
    }
}
