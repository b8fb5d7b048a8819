//! HTTP API server

use axum::Router;

use crate::error::Result;

pub mod compose;
pub mod extract;
pub mod failure;
pub mod handlers;
pub mod response;
pub mod state;
pub mod translator;

pub use compose::{RouteGroup, ServiceComposer};
pub use failure::{Failure, HttpFailure, ValidationFailure};
pub use response::{error_response, http_error_body, normalize_message, ErrorResponse};
pub use state::AppState;
pub use translator::{FailureSink, TracingSink, Translator};

/// Catalog browsing, mounted under `/integrations`
pub fn integrations_routes() -> RouteGroup<AppState> {
    RouteGroup::new("integrations", "/integrations")
        .get("", handlers::list_integrations)
        .get("/{provider}", handlers::get_integration)
}

/// Provider calls, mounted under `/execute`
pub fn execution_routes() -> RouteGroup<AppState> {
    RouteGroup::new("execution", "/execute")
        .post("/{provider}", handlers::execute)
        .post("/{provider}/{method}", handlers::execute_method)
}

pub fn health_routes() -> RouteGroup<AppState> {
    RouteGroup::new("health", "").get("/health", handlers::health)
}

/// Build the API router using the provided application state
pub fn create_router(state: AppState, translator: Translator) -> Result<Router> {
    ServiceComposer::new()
        .group(health_routes())
        .group(integrations_routes())
        .group(execution_routes())
        .build(state, translator)
}
