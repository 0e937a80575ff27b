//! Per-vendor sync pipeline contract and the shared leaf-stage runner.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use nimbus_cloud::{ResourceStore, SyncRequest, SyncScope, VendorClient};
use nimbus_core::{Error, Kit, ResourceKind, Result, Vendor};

use crate::report::SyncReport;

/// Options for one full-account sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncAllOption {
    pub account_id: String,
    /// Whether to also sync public resources (image catalogs).
    #[serde(default)]
    pub sync_public_resource: bool,
}

impl SyncAllOption {
    pub fn validate(&self) -> Result<()> {
        if self.account_id.is_empty() {
            return Err(Error::invalid("account_id is required"));
        }
        Ok(())
    }
}

/// One vendor's staged sync pipeline.
///
/// Scope discovery is the hard-dependency stage: its failure aborts the
/// run and propagates verbatim, and no leaf sync runs without its output.
/// Leaf failures stay inside the returned report.
#[async_trait]
pub trait SyncPipeline: Send + Sync {
    fn vendor(&self) -> Vendor;

    async fn sync_all(&self, kit: &Kit, opt: &SyncAllOption) -> Result<SyncReport>;
}

/// Shared leaf-stage execution: iterate scope × kind, upsert what syncs,
/// log and remember what fails, never abort.
pub(crate) struct LeafRunner<'a> {
    client: &'a dyn VendorClient,
    store: &'a dyn ResourceStore,
}

impl<'a> LeafRunner<'a> {
    pub fn new(client: &'a dyn VendorClient, store: &'a dyn ResourceStore) -> Self {
        Self { client, store }
    }

    /// Run every (scope, kind) pair in order. A failing pair is recorded in
    /// the report and iteration continues with the next pair; the first
    /// recorded failure is what `report.first_failure()` surfaces. An
    /// expired kit deadline stops iteration with one recorded failure for
    /// the pair that would have run next.
    pub async fn run(
        &self,
        kit: &Kit,
        report: &mut SyncReport,
        account_id: &str,
        scopes: &[SyncScope],
        kinds: &[ResourceKind],
    ) {
        for scope in scopes {
            for &kind in kinds {
                if kit.expired() {
                    tracing::warn!(
                        rid = kit.rid(),
                        vendor = %self.client.vendor(),
                        %scope,
                        %kind,
                        "deadline passed, stopping leaf stages"
                    );
                    report.record_failure(scope.clone(), kind, "deadline passed".to_string());
                    return;
                }
                self.run_unit(kit, report, account_id, scope, kind).await;
            }
        }
    }

    async fn run_unit(
        &self,
        kit: &Kit,
        report: &mut SyncReport,
        account_id: &str,
        scope: &SyncScope,
        kind: ResourceKind,
    ) -> bool {
        report.attempted += 1;
        let req = SyncRequest {
            account_id: account_id.to_string(),
            scope: scope.clone(),
            kind,
        };
        let start = Instant::now();
        match self.client.sync(kit, &req).await {
            Ok(records) => {
                // Count records as they land so a failing upsert partway
                // through the list leaves the report matching the store.
                let mut upserted = 0usize;
                for record in records {
                    if let Err(err) = self.store.upsert(kit, record).await {
                        tracing::error!(
                            rid = kit.rid(),
                            vendor = %self.client.vendor(),
                            %scope,
                            %kind,
                            error = %err,
                            "upsert of synced record failed"
                        );
                        report.record_failure(scope.clone(), kind, err.to_string());
                        return false;
                    }
                    upserted += 1;
                    report.synced_records += 1;
                }
                tracing::debug!(
                    rid = kit.rid(),
                    vendor = %self.client.vendor(),
                    %scope,
                    %kind,
                    records = upserted,
                    cost = ?start.elapsed(),
                    "sync unit done"
                );
                true
            }
            Err(err) => {
                tracing::error!(
                    rid = kit.rid(),
                    vendor = %self.client.vendor(),
                    %scope,
                    %kind,
                    error = %err,
                    "sync unit failed"
                );
                report.record_failure(scope.clone(), kind, err.to_string());
                false
            }
        }
    }

    /// Sync a kind once per scope-enumeration pass: stop after the first
    /// scope that succeeds. A failure keeps trying later scopes; only when
    /// every scope failed does the report carry a failure (the first one).
    pub async fn sync_first_success(
        &self,
        kit: &Kit,
        report: &mut SyncReport,
        account_id: &str,
        scopes: &[SyncScope],
        kind: ResourceKind,
    ) {
        let mut probe = SyncReport::new(report.vendor, account_id);
        for scope in scopes {
            if self.run_unit(kit, &mut probe, account_id, scope, kind).await {
                report.attempted += probe.attempted;
                report.synced_records += probe.synced_records;
                return;
            }
        }
        report.attempted += probe.attempted;
        report.synced_records += probe.synced_records;
        if let Some(first) = probe.failures.into_iter().next() {
            report.failures.push(first);
        }
    }
}
