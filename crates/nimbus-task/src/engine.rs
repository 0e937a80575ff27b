//! Task execution engine: action dispatch and the batch state machine.

use std::sync::Arc;

use nimbus_cloud::{ProvisionConfig, ResourceStore, VendorClients};
use nimbus_core::{Error, Kit, Result};

use crate::action::ActionContext;
use crate::detail::DetailState;
use crate::registry::ActionRegistry;
use crate::store::DetailStore;

/// Engine tunables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Hard cap on details per batch; larger requests are rejected before
    /// any work starts.
    pub max_batch_size: usize,
    pub provision: ProvisionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 20,
            provision: ProvisionConfig::default(),
        }
    }
}

/// Resolves actions by name, deserializes their parameters, and runs them
/// against the shared context.
pub struct TaskEngine {
    registry: Arc<ActionRegistry>,
    ctx: ActionContext,
}

impl TaskEngine {
    pub fn new(
        registry: Arc<ActionRegistry>,
        clients: Arc<VendorClients>,
        details: Arc<dyn DetailStore>,
        resources: Arc<dyn ResourceStore>,
        config: EngineConfig,
    ) -> Self {
        let ctx = ActionContext::new(clients, details, resources, config);
        Self { registry, ctx }
    }

    /// Execute an action by name with an untyped parameter payload.
    pub async fn execute(
        &self,
        kit: &Kit,
        name: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let action = self.registry.get(name)?;
        tracing::info!(rid = kit.rid(), action = name, "action run start");
        let result = action.run(kit, &self.ctx, params).await;
        match &result {
            Ok(_) => tracing::info!(rid = kit.rid(), action = name, "action run done"),
            Err(err) => {
                tracing::error!(rid = kit.rid(), action = name, error = %err, "action run failed")
            }
        }
        result
    }

    /// Run an action's compensation with the same parameters its run saw.
    pub async fn rollback(&self, kit: &Kit, name: &str, params: serde_json::Value) -> Result<()> {
        let action = self.registry.get(name)?;
        tracing::info!(rid = kit.rid(), action = name, "action rollback start");
        action.rollback(kit, &self.ctx, params).await
    }

    pub fn context(&self) -> &ActionContext {
        &self.ctx
    }
}

/// Drives an ordered batch of details through the persisted state machine.
///
/// Items run strictly sequentially. Each item follows the single-item
/// protocol: re-read persisted state, honor `Cancel` as already satisfied,
/// reject anything else that is not `Init`, commit `Running`, invoke the
/// vendor call, commit the terminal state. Every transition is persisted
/// before the next item starts, and the first hard failure stops the
/// batch, leaving earlier items in their committed terminal state and
/// later items untouched.
pub struct BatchRunner<'a> {
    store: &'a dyn DetailStore,
    max_batch_size: usize,
}

impl<'a> BatchRunner<'a> {
    pub fn new(store: &'a dyn DetailStore, max_batch_size: usize) -> Self {
        Self {
            store,
            max_batch_size,
        }
    }

    /// Run `call` once per detail, in order. `call(i)` performs the vendor
    /// operation for the i-th detail and returns the outcome payload to
    /// persist. Cancelled details yield `None` in the returned vector.
    pub async fn run<F, Fut>(
        &self,
        kit: &Kit,
        detail_ids: &[String],
        call: F,
    ) -> Result<Vec<Option<serde_json::Value>>>
    where
        F: Fn(usize) -> Fut,
        Fut: Future<Output = Result<serde_json::Value>>,
    {
        if detail_ids.len() > self.max_batch_size {
            return Err(Error::TooManyRequest(format!(
                "batch size {} exceeds cap {}",
                detail_ids.len(),
                self.max_batch_size
            )));
        }

        let mut outcomes = Vec::with_capacity(detail_ids.len());
        for (index, detail_id) in detail_ids.iter().enumerate() {
            // Deadline check before the item starts, so an expired kit
            // leaves the remaining tail in `Init` and resumable.
            if kit.expired() {
                return Err(Error::aborted(format!(
                    "deadline passed before task detail {detail_id}"
                )));
            }
            let ids = [detail_id.clone()];
            // Re-read at the last possible moment: the guard, not an
            // in-memory lock, is what keeps at most one execution active
            // per detail.
            let details = self.store.get(kit, &ids).await?;
            let detail = &details[0];

            if detail.state == DetailState::Cancel {
                tracing::info!(rid = kit.rid(), detail_id = %detail_id, "detail cancelled, skipping");
                outcomes.push(None);
                continue;
            }
            if detail.state != DetailState::Init {
                return Err(Error::invalid(format!(
                    "task detail {detail_id} state {} is not init",
                    detail.state
                )));
            }

            self.store
                .update_state(kit, &ids, DetailState::Running, None, None)
                .await?;

            match call(index).await {
                Ok(value) => {
                    self.store
                        .update_state(kit, &ids, DetailState::Success, Some(value.clone()), None)
                        .await?;
                    outcomes.push(Some(value));
                }
                Err(err) => {
                    tracing::error!(rid = kit.rid(), detail_id = %detail_id, error = %err, "detail failed");
                    self.store
                        .update_state(kit, &ids, DetailState::Failed, None, Some(err.to_string()))
                        .await?;
                    return Err(err);
                }
            }
        }
        Ok(outcomes)
    }
}
