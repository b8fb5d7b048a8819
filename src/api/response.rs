//! Canonical JSON error bodies

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Generic error envelope: `{"status_code":..,"message":..,"data":null}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    pub data: Option<Value>,
}

/// Envelope for deliberate HTTP failures: `{"error":{"message":..}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpErrorBody {
    pub error: ErrorMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

/// Build the generic envelope. `data` is never populated here.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> ErrorResponse {
    ErrorResponse {
        status_code: status.as_u16(),
        message: message.into(),
        data: None,
    }
}

pub fn http_error_body(detail: impl Into<String>) -> HttpErrorBody {
    HttpErrorBody {
        error: ErrorMessage {
            message: detail.into(),
        },
    }
}

/// Flatten a failure rendering onto one line.
///
/// Newlines become spaces, then every run of three spaces collapses to one
/// until none is left. The result never contains `\n` or `"   "`.
pub fn normalize_message(raw: &str) -> String {
    let mut message = raw.replace('\n', " ");
    while message.contains("   ") {
        message = message.replace("   ", " ");
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let body = error_response(StatusCode::UNPROCESSABLE_ENTITY, "bad input");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"status_code": 422, "message": "bad input", "data": null})
        );
    }

    #[test]
    fn test_error_response_accepts_any_status() {
        let body = error_response(StatusCode::from_u16(599).unwrap(), "");
        assert_eq!(body.status_code, 599);
        assert!(body.data.is_none());
    }

    #[test]
    fn test_http_error_body_serializes_exactly() {
        let body = http_error_body("not found");
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"error":{"message":"not found"}}"#
        );
    }

    #[test]
    fn test_normalize_collapses_newlines_and_triple_spaces() {
        assert_eq!(normalize_message("a\n\n   b"), "a b");
        assert_eq!(normalize_message("line one\nline two"), "line one line two");
        assert_eq!(normalize_message("x   y"), "x y");
    }

    #[test]
    fn test_normalize_leaves_short_runs() {
        assert_eq!(normalize_message("a  b"), "a  b");
        assert_eq!(normalize_message("a    b"), "a  b");
        assert_eq!(normalize_message("plain"), "plain");
        assert_eq!(normalize_message(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "a\n\n   b",
            "     five spaces",
            "\n\n\n\n",
            "body -> field\n  missing\n   value",
            "tabs\tare\tkept",
        ];

        for input in inputs {
            let once = normalize_message(input);
            assert!(!once.contains('\n'), "newline left in {once:?}");
            assert!(!once.contains("   "), "triple space left in {once:?}");
            assert_eq!(normalize_message(&once), once);
        }
    }
}
