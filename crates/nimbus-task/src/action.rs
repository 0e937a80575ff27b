//! Action trait: the unit of work.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use nimbus_cloud::{ProvisionConfig, ResourceStore, VendorClients};
use nimbus_core::{Error, Kit, Result};

use crate::engine::{BatchRunner, EngineConfig};
use crate::store::DetailStore;

/// Collaborators an action runs against.
///
/// Built once at startup alongside the registry and shared by every
/// in-flight execution.
#[derive(Clone)]
pub struct ActionContext {
    pub clients: Arc<VendorClients>,
    pub details: Arc<dyn DetailStore>,
    pub resources: Arc<dyn ResourceStore>,
    pub config: EngineConfig,
}

impl ActionContext {
    pub fn new(
        clients: Arc<VendorClients>,
        details: Arc<dyn DetailStore>,
        resources: Arc<dyn ResourceStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            clients,
            details,
            resources,
            config,
        }
    }

    /// Batch runner bound to this context's detail store and cap.
    pub fn batch(&self) -> BatchRunner<'_> {
        BatchRunner::new(self.details.as_ref(), self.config.max_batch_size)
    }

    pub fn provision(&self) -> &ProvisionConfig {
        &self.config.provision
    }
}

/// A named, typed, registrable unit of work.
///
/// `run` must tolerate being invoked more than once for the same logical
/// operation when the underlying vendor call is idempotent. Actions that
/// are not naturally idempotent must override `rollback` with a real
/// compensation; relying on the default no-op is a statement that `run`
/// is idempotent and must be documented on the implementer.
#[async_trait]
pub trait Action: Send + Sync {
    /// Stable identifier, unique across the registry.
    fn name(&self) -> &'static str;

    async fn run(&self, kit: &Kit, ctx: &ActionContext, params: serde_json::Value)
        -> Result<serde_json::Value>;

    /// Compensating step. The default succeeds immediately and is only a
    /// valid implementation for idempotent actions.
    async fn rollback(
        &self,
        kit: &Kit,
        ctx: &ActionContext,
        params: serde_json::Value,
    ) -> Result<()> {
        let _ = (kit, ctx, params);
        Ok(())
    }
}

/// Deserialize an action's untyped parameter payload into its declared
/// shape. A payload that does not coerce is an input error.
pub fn parse_params<T: DeserializeOwned>(name: &str, params: serde_json::Value) -> Result<T> {
    serde_json::from_value(params)
        .map_err(|e| Error::invalid(format!("action {name} parameter mismatch: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Params {
        count: u32,
    }

    #[test]
    fn parse_params_coerces_valid_payloads() {
        let p: Params = parse_params("demo", serde_json::json!({"count": 3})).unwrap();
        assert_eq!(p.count, 3);
    }

    #[test]
    fn parse_params_rejects_mismatches_as_invalid_parameter() {
        let err = parse_params::<Params>("demo", serde_json::json!({"count": "three"}))
            .unwrap_err();
        assert!(err.is_invalid_parameter());
        assert!(err.to_string().contains("demo"));
    }
}
