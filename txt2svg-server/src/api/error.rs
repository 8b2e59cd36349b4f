//! API error types and `Txt2SvgError` → HTTP status mapping.

use super::response;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use txt2svg_core::error::Txt2SvgError;

/// Message sent for every fault the client cannot act on.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// API error with HTTP status code and error code.
///
/// `message` is what the client sees; internal details stay in logs.
#[derive(Debug)]
pub struct ApiError {
    /// Error code (e.g., "E101").
    pub code: &'static str,
    /// Client-facing message.
    pub message: String,
    /// HTTP status code.
    pub status: StatusCode,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: &'static str, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            code,
            message: message.into(),
            status,
        }
    }

    /// Create a 500 Internal Server Error with the generic message.
    pub fn internal(code: &'static str) -> Self {
        Self::new(code, INTERNAL_ERROR_MESSAGE, StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Check if this is a server-side fault.
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Convert to HTTP response.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        response::error_response(self.status, &self.message)
    }
}

impl From<Txt2SvgError> for ApiError {
    fn from(err: Txt2SvgError) -> Self {
        let code = err.code();

        match &err {
            Txt2SvgError::UnsupportedFont { key } => Self::new(
                code,
                format!("Unsupported font: {}", key),
                StatusCode::BAD_REQUEST,
            ),
            Txt2SvgError::GenerationEmpty => Self::new(
                code,
                "Generated SVG is empty",
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            Txt2SvgError::AssetNotFound { .. } | Txt2SvgError::AssetPath { .. } => {
                Self::new(code, "Not found", StatusCode::NOT_FOUND)
            }
            _ => Self::internal(code),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
