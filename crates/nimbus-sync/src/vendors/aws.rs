//! AWS sync pipeline.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use nimbus_cloud::{ResourceStore, SyncScope, VendorClient, VendorClients};
use nimbus_core::{Kit, ResourceKind, Result, Vendor};

use crate::pipeline::{LeafRunner, SyncAllOption, SyncPipeline};
use crate::report::SyncReport;

const LEAF_KINDS: &[ResourceKind] = &[
    ResourceKind::Disk,
    ResourceKind::Vpc,
    ResourceKind::Subnet,
    ResourceKind::Eip,
    ResourceKind::SecurityGroup,
    ResourceKind::Cvm,
    ResourceKind::RouteTable,
];

pub struct AwsPipeline {
    client: Arc<dyn VendorClient>,
    store: Arc<dyn ResourceStore>,
}

impl AwsPipeline {
    pub fn new(clients: &VendorClients, store: Arc<dyn ResourceStore>) -> Result<Self> {
        Ok(Self {
            client: clients.get(Vendor::Aws)?,
            store,
        })
    }
}

#[async_trait]
impl SyncPipeline for AwsPipeline {
    fn vendor(&self) -> Vendor {
        Vendor::Aws
    }

    async fn sync_all(&self, kit: &Kit, opt: &SyncAllOption) -> Result<SyncReport> {
        opt.validate()?;
        let start = Instant::now();
        tracing::info!(rid = kit.rid(), account = %opt.account_id, "aws sync all start");

        let mut report = SyncReport::new(Vendor::Aws, &opt.account_id);

        let regions = self.client.list_regions(kit, &opt.account_id).await?;
        let scopes: Vec<SyncScope> = regions.into_iter().map(SyncScope::Region).collect();

        let runner = LeafRunner::new(self.client.as_ref(), self.store.as_ref());
        runner
            .run(kit, &mut report, &opt.account_id, &scopes, LEAF_KINDS)
            .await;

        if opt.sync_public_resource {
            runner
                .sync_first_success(kit, &mut report, &opt.account_id, &scopes, ResourceKind::Image)
                .await;
        }

        tracing::info!(
            rid = kit.rid(),
            account = %opt.account_id,
            attempted = report.attempted,
            failures = report.failures.len(),
            cost = ?start.elapsed(),
            "aws sync all end"
        );
        Ok(report)
    }
}
