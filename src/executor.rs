//! Execution backends for the execution route group

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::api::Failure;

/// A resolved call against one integration method
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionCall {
    pub provider: String,
    pub method: String,
    pub arguments: Map<String, Value>,
    #[serde(skip)]
    pub setup: Option<Map<String, Value>>,
}

/// Runs integration calls.
///
/// Implementations report caller-visible problems as [`Failure`]; anything
/// else they must handle themselves.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, call: ExecutionCall) -> Result<Value, Failure>;
}

/// Resolves calls without contacting any provider
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunExecutor;

#[async_trait]
impl Executor for DryRunExecutor {
    async fn execute(&self, call: ExecutionCall) -> Result<Value, Failure> {
        tracing::debug!(provider = %call.provider, method = %call.method, "Dry-run execution");

        Ok(json!({
            "dry_run": true,
            "provider": call.provider,
            "method": call.method,
            "arguments": call.arguments,
            "setup_provided": call.setup.is_some(),
        }))
    }
}
