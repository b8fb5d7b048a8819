//! API handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::extract::{ValidatedJson, ValidatedPath};
use crate::api::{AppState, Failure};
use crate::catalog::{Integration, IntegrationMethod};
use crate::executor::ExecutionCall;

/// Liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// List every enabled integration
pub async fn list_integrations(State(state): State<AppState>) -> Json<ListIntegrationsResponse> {
    Json(ListIntegrationsResponse {
        integrations: state.catalog.list().into_iter().cloned().collect(),
    })
}

#[derive(Debug, Serialize)]
pub struct ListIntegrationsResponse {
    pub integrations: Vec<Integration>,
}

pub async fn get_integration(
    State(state): State<AppState>,
    ValidatedPath(provider): ValidatedPath<String>,
) -> Result<Json<Integration>, Failure> {
    let integration = find_integration(&state, &provider)?;
    Ok(Json(integration.clone()))
}

/// Execute a provider call, naming the method in the body
///
/// The method may be omitted for single-method providers.
pub async fn execute(
    State(state): State<AppState>,
    ValidatedPath(provider): ValidatedPath<String>,
    ValidatedJson(payload): ValidatedJson<ExecutionRequest>,
) -> Result<Json<ExecutionResponse>, Failure> {
    let integration = find_integration(&state, &provider)?;

    let method = match payload.method.as_deref() {
        Some(name) => find_method(integration, name)?,
        None => integration.default_method().ok_or_else(|| {
            Failure::validation(format!(
                "1 validation error for ExecutionRequest\nmethod\n  Field required: integration '{}' exposes {} methods",
                provider,
                integration.methods.len()
            ))
        })?,
    };

    run(&state, integration, method, payload.arguments, payload.setup).await
}

/// Execute a provider call with the method in the path
pub async fn execute_method(
    State(state): State<AppState>,
    ValidatedPath((provider, method)): ValidatedPath<(String, String)>,
    ValidatedJson(payload): ValidatedJson<MethodExecutionRequest>,
) -> Result<Json<ExecutionResponse>, Failure> {
    let integration = find_integration(&state, &provider)?;
    let method = find_method(integration, &method)?;

    run(&state, integration, method, payload.arguments, payload.setup).await
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutionRequest {
    #[serde(default)]
    pub method: Option<String>,
    pub arguments: Map<String, Value>,
    #[serde(default)]
    pub setup: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodExecutionRequest {
    pub arguments: Map<String, Value>,
    #[serde(default)]
    pub setup: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
pub struct ExecutionResponse {
    pub provider: String,
    pub method: String,
    pub output: Value,
}

async fn run(
    state: &AppState,
    integration: &Integration,
    method: &IntegrationMethod,
    arguments: Map<String, Value>,
    setup: Option<Map<String, Value>>,
) -> Result<Json<ExecutionResponse>, Failure> {
    let call = ExecutionCall {
        provider: integration.provider.clone(),
        method: method.method.clone(),
        arguments,
        setup,
    };

    let output = state.executor.execute(call).await?;

    Ok(Json(ExecutionResponse {
        provider: integration.provider.clone(),
        method: method.method.clone(),
        output,
    }))
}

fn find_integration<'a>(state: &'a AppState, provider: &str) -> Result<&'a Integration, Failure> {
    state
        .catalog
        .get(provider)
        .ok_or_else(|| Failure::not_found(format!("integration '{}' not found", provider)))
}

fn find_method<'a>(
    integration: &'a Integration,
    method: &str,
) -> Result<&'a IntegrationMethod, Failure> {
    integration.method(method).ok_or_else(|| {
        Failure::not_found(format!(
            "method '{}' not found for integration '{}'",
            method, integration.provider
        ))
    })
}
