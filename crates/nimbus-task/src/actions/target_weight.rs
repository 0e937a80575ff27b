//! Batch listener target weight adjustment.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use nimbus_cloud::TargetWeightRequest;
use nimbus_core::{Error, Kit, Result, Vendor};

use crate::action::{parse_params, Action, ActionContext};

pub const NAME: &str = "batch-modify-target-weight";

/// Parameters for one batch of per-listener weight adjustments. Each
/// request is paired positionally with its task detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifyTargetWeightOption {
    pub vendor: Vendor,
    pub lb_cloud_id: String,
    pub detail_ids: Vec<String>,
    pub requests: Vec<TargetWeightRequest>,
}

impl ModifyTargetWeightOption {
    pub fn validate(&self) -> Result<()> {
        if self.requests.is_empty() {
            return Err(Error::invalid("requests is required"));
        }
        if self.detail_ids.len() != self.requests.len() {
            return Err(Error::invalid(format!(
                "detail_ids and requests num not match, {} != {}",
                self.detail_ids.len(),
                self.requests.len()
            )));
        }
        Ok(())
    }
}

/// Sets listener target weights to absolute values, one listener per task
/// detail, strictly in order.
///
/// The vendor call is idempotent (weights are set, not incremented), so
/// this action deliberately keeps the default no-op rollback.
pub struct ModifyTargetWeightAction;

#[async_trait]
impl Action for ModifyTargetWeightAction {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(
        &self,
        kit: &Kit,
        ctx: &ActionContext,
        params: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let opt: ModifyTargetWeightOption = parse_params(NAME, params)?;
        opt.validate()?;

        // Resolve the facade once for the whole batch.
        let client = ctx.clients.get(opt.vendor)?;

        let client = client.as_ref();
        let lb_cloud_id = &opt.lb_cloud_id;
        let requests = &opt.requests;
        let outcomes = ctx
            .batch()
            .run(kit, &opt.detail_ids, move |i| async move {
                let result = client
                    .modify_target_weight(kit, lb_cloud_id, &requests[i])
                    .await?;
                Ok(serde_json::to_value(result)?)
            })
            .await?;

        Ok(serde_json::to_value(outcomes)?)
    }
}
