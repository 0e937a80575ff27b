//! Vendor dispatch for sync runs.

use std::collections::HashMap;
use std::sync::Arc;

use nimbus_cloud::{ResourceStore, VendorClients};
use nimbus_core::{Error, Kit, Result, Vendor};

use crate::pipeline::{SyncAllOption, SyncPipeline};
use crate::report::SyncReport;
use crate::vendors::{AwsPipeline, AzurePipeline, GcpPipeline, HuaWeiPipeline, TCloudPipeline};

/// Maps a vendor tag to its pipeline, once, at construction.
pub struct SyncOrchestrator {
    pipelines: HashMap<Vendor, Arc<dyn SyncPipeline>>,
}

impl SyncOrchestrator {
    /// Build a pipeline for every vendor the client set is configured for.
    pub fn new(clients: &VendorClients, store: Arc<dyn ResourceStore>) -> Result<Self> {
        let mut pipelines: Vec<Arc<dyn SyncPipeline>> = Vec::new();
        for vendor in clients.vendors() {
            let pipeline: Arc<dyn SyncPipeline> = match vendor {
                Vendor::TCloud => Arc::new(TCloudPipeline::new(clients, store.clone())?),
                Vendor::Aws => Arc::new(AwsPipeline::new(clients, store.clone())?),
                Vendor::Azure => Arc::new(AzurePipeline::new(clients, store.clone())?),
                Vendor::Gcp => Arc::new(GcpPipeline::new(clients, store.clone())?),
                Vendor::HuaWei => Arc::new(HuaWeiPipeline::new(clients, store.clone())?),
            };
            pipelines.push(pipeline);
        }
        Ok(Self::with_pipelines(pipelines))
    }

    pub fn with_pipelines(pipelines: Vec<Arc<dyn SyncPipeline>>) -> Self {
        let pipelines = pipelines.into_iter().map(|p| (p.vendor(), p)).collect();
        Self { pipelines }
    }

    /// Run a full sync for one vendor account.
    pub async fn sync_all(
        &self,
        kit: &Kit,
        vendor: Vendor,
        opt: &SyncAllOption,
    ) -> Result<SyncReport> {
        let pipeline = self
            .pipelines
            .get(&vendor)
            .ok_or_else(|| Error::invalid(format!("no sync pipeline for vendor: {vendor}")))?;
        pipeline.sync_all(kit, opt).await
    }

    pub fn vendors(&self) -> impl Iterator<Item = Vendor> + '_ {
        self.pipelines.keys().copied()
    }
}
