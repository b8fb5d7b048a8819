//! Failure-to-response translation
//!
//! Installed once on the composed router as a middleware. Handler responses
//! tagged with a [`Failure`] are logged through the injected [`FailureSink`]
//! and replaced by the matching envelope. Every other response, including
//! the runtime's own answer to a panic, passes through unchanged.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::failure::Failure;
use crate::api::response::{error_response, http_error_body, normalize_message};

/// Destination for translated-failure log lines
pub trait FailureSink: Send + Sync {
    /// Unexpected-input failures, logged with the captured backtrace
    fn error(&self, message: &str, backtrace: &Backtrace);

    /// Deliberate HTTP failures, detail only
    fn warning(&self, message: &str);
}

/// Sink writing to the process-wide `tracing` subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl FailureSink for TracingSink {
    fn error(&self, message: &str, backtrace: &Backtrace) {
        if backtrace.status() == BacktraceStatus::Captured {
            tracing::error!("{}\n{}", message, backtrace);
        } else {
            tracing::error!("{}", message);
        }
    }

    fn warning(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// Maps each failure category to its status and envelope
#[derive(Clone)]
pub struct Translator {
    sink: Arc<dyn FailureSink>,
}

impl Translator {
    pub fn new(sink: Arc<dyn FailureSink>) -> Self {
        Self { sink }
    }

    pub fn translate(&self, failure: &Failure) -> Response {
        match failure {
            Failure::RequestValidation(validation) => {
                self.sink.error(
                    &format!("Exception: {}", validation.rendering()),
                    validation.backtrace(),
                );

                let status = StatusCode::UNPROCESSABLE_ENTITY;
                let body = error_response(status, normalize_message(validation.rendering()));
                (status, Json(body)).into_response()
            }
            Failure::Http(http) => {
                self.sink.warning(&format!("HTTP Exception: {}", http.detail));
                (http.status, Json(http_error_body(http.detail.as_str()))).into_response()
            }
        }
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

/// Middleware entry point, see [`crate::api::compose::ServiceComposer::build`]
pub async fn translate_failures(
    State(translator): State<Translator>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<Failure>() {
        Some(failure) => translator.translate(&failure),
        None => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingSink {
        lines: Mutex<Vec<(&'static str, String)>>,
        traces: Mutex<Vec<BacktraceStatus>>,
    }

    impl FailureSink for CapturingSink {
        fn error(&self, message: &str, backtrace: &Backtrace) {
            self.lines.lock().unwrap().push(("error", message.to_string()));
            self.traces.lock().unwrap().push(backtrace.status());
        }

        fn warning(&self, message: &str) {
            self.lines
                .lock()
                .unwrap()
                .push(("warning", message.to_string()));
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_failure_translation() {
        let sink = Arc::new(CapturingSink::default());
        let translator = Translator::new(sink.clone());

        let response = translator.translate(&Failure::validation("a\n\n   b"));

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"status_code": 422, "message": "a b", "data": null})
        );

        let lines = sink.lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, "error");
        // Logged before normalization
        assert_eq!(lines[0].1, "Exception: a\n\n   b");
        assert_eq!(*sink.traces.lock().unwrap(), vec![BacktraceStatus::Captured]);
    }

    #[tokio::test]
    async fn test_http_failure_translation() {
        let sink = Arc::new(CapturingSink::default());
        let translator = Translator::new(sink.clone());

        let response = translator.translate(&Failure::http(StatusCode::FORBIDDEN, "no access"));

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": {"message": "no access"}})
        );

        let lines = sink.lines.lock().unwrap();
        assert_eq!(
            *lines,
            vec![("warning", "HTTP Exception: no access".to_string())]
        );
        assert!(sink.traces.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_http_failure_detail_is_not_normalized() {
        let translator = Translator::new(Arc::new(CapturingSink::default()));

        let response = translator.translate(&Failure::not_found("two\nlines"));

        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": {"message": "two\nlines"}})
        );
    }
}
