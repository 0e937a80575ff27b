//! Create-then-read-back provisioning.
//!
//! Synchronous create calls can return before the vendor's own inventory
//! reflects the new resource. Provisioning therefore waits a bounded delay
//! before the read-back list, and requires the read-back to return exactly
//! one record; anything else means a programming or environment error, not
//! plain lag, and aborts without creating dependent resources.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use nimbus_core::{Error, Kit, ResourceKind, ResourceRecord, Result};

use crate::client::{ListFilter, SubnetCreateSpec, VendorClient, VpcCreateSpec};
use crate::store::ResourceStore;

/// Tunables for provisioning.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// Delay between a create returning and the read-back list. The
    /// exactly-one-match check is the contract; the delay only bounds how
    /// long we give the vendor inventory to catch up.
    pub readback_delay: Duration,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            readback_delay: Duration::from_secs(3),
        }
    }
}

/// Outcome of a VPC provisioning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedVpc {
    pub vpc_cloud_id: String,
    pub subnet_cloud_ids: Vec<String>,
}

/// Create a VPC, verify it via read-back, record it locally, then create
/// the requested subnets grouped by region.
///
/// Subnets are never attempted when the VPC read-back is ambiguous.
pub async fn create_vpc(
    kit: &Kit,
    client: &dyn VendorClient,
    store: &dyn ResourceStore,
    config: &ProvisionConfig,
    spec: &VpcCreateSpec,
) -> Result<CreatedVpc> {
    let vendor = client.vendor();
    let vpc_cloud_id = client.create_vpc(kit, spec).await?;
    tracing::info!(
        rid = kit.rid(),
        %vendor,
        vpc_cloud_id = %vpc_cloud_id,
        "vpc created, reading back"
    );

    let record = read_back_one(kit, client, config, &spec.account_id, ResourceKind::Vpc, &vpc_cloud_id)
        .await?;
    store
        .upsert(kit, record.with_scope(spec.region.clone()))
        .await?;

    // Vendors create subnets per region; group the requests accordingly.
    let mut by_region: HashMap<&str, Vec<&SubnetCreateSpec>> = HashMap::new();
    for subnet in &spec.subnets {
        by_region.entry(subnet.region.as_str()).or_default().push(subnet);
    }

    let mut subnet_cloud_ids = Vec::with_capacity(spec.subnets.len());
    for (region, subnets) in by_region {
        for subnet in subnets {
            let subnet_cloud_id = client.create_subnet(kit, &vpc_cloud_id, subnet).await?;
            let record = read_back_one(
                kit,
                client,
                config,
                &spec.account_id,
                ResourceKind::Subnet,
                &subnet_cloud_id,
            )
            .await?;
            store
                .upsert(kit, record.with_scope(region.to_string()))
                .await?;
            subnet_cloud_ids.push(subnet_cloud_id);
        }
    }

    Ok(CreatedVpc {
        vpc_cloud_id,
        subnet_cloud_ids,
    })
}

/// Read back a just-created resource after the configured delay and demand
/// exactly one match.
async fn read_back_one(
    kit: &Kit,
    client: &dyn VendorClient,
    config: &ProvisionConfig,
    account_id: &str,
    kind: ResourceKind,
    cloud_id: &str,
) -> Result<ResourceRecord> {
    if !config.readback_delay.is_zero() {
        tokio::time::sleep(config.readback_delay).await;
    }

    let filter = ListFilter::by_cloud_id(account_id, kind, cloud_id);
    let mut records = client.list(kit, &filter).await?;
    if records.len() != 1 {
        return Err(Error::aborted(format!(
            "read-back of created {kind} {cloud_id} returned {} records, want exactly 1",
            records.len()
        )));
    }
    Ok(records.remove(0))
}
