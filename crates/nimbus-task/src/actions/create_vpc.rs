//! VPC provisioning as a task action.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use nimbus_cloud::{provision, CreatedVpc, VpcCreateSpec};
use nimbus_core::{Kit, ResourceKind, Result, Vendor};

use crate::action::{parse_params, Action, ActionContext};
use crate::detail::DetailState;

pub const NAME: &str = "create-vpc";

/// Parameters for provisioning one VPC (and its subnets) under one task
/// detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVpcOption {
    pub vendor: Vendor,
    pub detail_id: String,
    pub spec: VpcCreateSpec,
}

/// Creates a VPC with read-back verification, then its subnets.
///
/// Not idempotent: a second run would create a second VPC. Rollback
/// deletes whatever the run recorded in the detail's outcome.
pub struct CreateVpcAction;

#[async_trait]
impl Action for CreateVpcAction {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(
        &self,
        kit: &Kit,
        ctx: &ActionContext,
        params: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let opt: CreateVpcOption = parse_params(NAME, params)?;
        let client = ctx.clients.get(opt.vendor)?;

        let detail_ids = vec![opt.detail_id.clone()];
        let client = client.as_ref();
        let resources = ctx.resources.as_ref();
        let provision_cfg = ctx.provision();
        let spec = &opt.spec;
        let outcomes = ctx
            .batch()
            .run(kit, &detail_ids, move |_| async move {
                let created =
                    provision::create_vpc(kit, client, resources, provision_cfg, spec).await?;
                Ok(serde_json::to_value(created)?)
            })
            .await?;

        Ok(serde_json::to_value(outcomes)?)
    }

    async fn rollback(
        &self,
        kit: &Kit,
        ctx: &ActionContext,
        params: serde_json::Value,
    ) -> Result<()> {
        let opt: CreateVpcOption = parse_params(NAME, params)?;
        let client = ctx.clients.get(opt.vendor)?;

        // The run persisted what it created into the detail outcome; a run
        // that failed before creating anything left nothing to undo.
        let ids = vec![opt.detail_id.clone()];
        let details = ctx.details.get(kit, &ids).await?;
        let detail = &details[0];
        if detail.state != DetailState::Success {
            tracing::info!(
                rid = kit.rid(),
                detail_id = %opt.detail_id,
                state = %detail.state,
                "create-vpc rollback: nothing recorded, skipping"
            );
            return Ok(());
        }
        let Some(result) = &detail.result else {
            return Ok(());
        };
        let created: CreatedVpc = serde_json::from_value(result.clone())?;

        // Dependents first, then the VPC itself.
        for subnet_id in &created.subnet_cloud_ids {
            client.delete(kit, ResourceKind::Subnet, subnet_id).await?;
        }
        client
            .delete(kit, ResourceKind::Vpc, &created.vpc_cloud_id)
            .await?;
        tracing::info!(
            rid = kit.rid(),
            vpc_cloud_id = %created.vpc_cloud_id,
            "create-vpc rollback done"
        );
        Ok(())
    }
}
