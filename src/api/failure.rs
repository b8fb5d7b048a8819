//! Failures raised by route handlers
//!
//! Handlers return [`Failure`] to take part in structured error mapping.
//! The closed set of variants is the only thing the translator catches;
//! any other error response a handler builds is passed through untouched.

use std::backtrace::Backtrace;
use std::fmt;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum Failure {
    /// Request body or path did not match the expected schema
    #[error("{0}")]
    RequestValidation(ValidationFailure),

    /// Handler deliberately answers with a status and a detail string
    #[error("{0}")]
    Http(HttpFailure),
}

impl Failure {
    pub fn validation(rendering: impl Into<String>) -> Self {
        Failure::RequestValidation(ValidationFailure::new(rendering))
    }

    pub fn http(status: StatusCode, detail: impl Into<String>) -> Self {
        Failure::Http(HttpFailure {
            status,
            detail: detail.into(),
        })
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::http(StatusCode::NOT_FOUND, detail)
    }

    /// Status the translator will answer with
    pub fn status(&self) -> StatusCode {
        match self {
            Failure::RequestValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Failure::Http(http) => http.status,
        }
    }
}

/// Schema failure with the backtrace captured where it was raised.
///
/// The trace is always captured, regardless of `RUST_BACKTRACE`.
#[derive(Debug, Clone)]
pub struct ValidationFailure {
    rendering: String,
    trace: Arc<Backtrace>,
}

impl ValidationFailure {
    pub fn new(rendering: impl Into<String>) -> Self {
        Self {
            rendering: rendering.into(),
            trace: Arc::new(Backtrace::force_capture()),
        }
    }

    /// Raw rendering, before normalization
    pub fn rendering(&self) -> &str {
        &self.rendering
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.trace
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendering)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFailure {
    pub status: StatusCode,
    pub detail: String,
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status.as_u16(), self.detail)
    }
}

impl From<JsonRejection> for Failure {
    fn from(rejection: JsonRejection) -> Self {
        Failure::validation(rejection.body_text())
    }
}

impl From<PathRejection> for Failure {
    fn from(rejection: PathRejection) -> Self {
        Failure::validation(rejection.body_text())
    }
}

/// Bodyless response tagged with the failure.
///
/// The translator middleware swaps it for the formatted envelope; the body
/// is only filled in there so logging and formatting happen in one place.
impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        response.extensions_mut().insert(self);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::backtrace::BacktraceStatus;

    #[test]
    fn test_status_per_category() {
        assert_eq!(
            Failure::validation("bad").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            Failure::http(StatusCode::CONFLICT, "taken").status(),
            StatusCode::CONFLICT
        );
        assert_eq!(Failure::not_found("gone").status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_into_response_carries_failure() {
        let response = Failure::not_found("missing").into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        match response.extensions().get::<Failure>() {
            Some(Failure::Http(http)) => assert_eq!(http.detail, "missing"),
            other => panic!("Unexpected extension: {other:?}"),
        }
    }

    #[test]
    fn test_validation_always_captures_backtrace() {
        // Holds even when RUST_BACKTRACE is unset
        match Failure::validation("bad\nbody") {
            Failure::RequestValidation(validation) => {
                assert_eq!(validation.backtrace().status(), BacktraceStatus::Captured);
            }
            other => panic!("Unexpected failure: {other:?}"),
        }
    }

    #[test]
    fn test_display_keeps_raw_rendering() {
        let failure = Failure::validation("a\n\n   b");
        assert_eq!(failure.to_string(), "a\n\n   b");
    }
}
