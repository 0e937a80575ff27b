//! Pipeline scenarios against the mock vendor client.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use nimbus_cloud::mock::MockVendorClient;
use nimbus_cloud::{MemoryResourceStore, ResourceStore, SyncScope, VendorClients};
use nimbus_core::{Error, Kit, ResourceKind, ResourceRecord, Result, Vendor};
use nimbus_sync::{SyncAllOption, SyncOrchestrator};

struct Harness {
    orchestrator: SyncOrchestrator,
    client: Arc<MockVendorClient>,
    store: Arc<MemoryResourceStore>,
    kit: Kit,
}

fn harness(vendor: Vendor) -> Harness {
    let client = Arc::new(MockVendorClient::new(vendor));
    let clients = VendorClients::new(vec![client.clone()]);
    let store = Arc::new(MemoryResourceStore::new());
    let orchestrator = SyncOrchestrator::new(&clients, store.clone()).unwrap();
    Harness {
        orchestrator,
        client,
        store,
        kit: Kit::new(),
    }
}

fn opt(public: bool) -> SyncAllOption {
    SyncAllOption {
        account_id: "acc".into(),
        sync_public_resource: public,
    }
}

#[tokio::test]
async fn scope_discovery_failure_aborts_before_any_leaf_call() {
    let h = harness(Vendor::Gcp);
    h.client.set_regions(["ap-1", "ap-2"]);
    h.client.fail_scope_discovery();

    let err = h
        .orchestrator
        .sync_all(&h.kit, Vendor::Gcp, &opt(false))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::VendorCallFailed { .. }));
    assert!(h.client.sync_calls().is_empty());
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn leaf_failure_continues_and_first_error_is_surfaced() {
    // AWS has 7 region-scoped leaf kinds; 2 regions = 14 pairs.
    let h = harness(Vendor::Aws);
    h.client.set_regions(["ap-1", "ap-2"]);
    h.client
        .fail_sync(SyncScope::Region("ap-1".into()), ResourceKind::Vpc);
    h.client
        .fail_sync(SyncScope::Region("ap-2".into()), ResourceKind::Disk);

    let report = h
        .orchestrator
        .sync_all(&h.kit, Vendor::Aws, &opt(false))
        .await
        .unwrap();

    // Every pair was attempted despite the failures.
    assert_eq!(report.attempted, 14);
    assert_eq!(h.client.sync_calls().len(), 14);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.synced_records, 12);
    assert_eq!(h.store.len().await, 12);

    // Iteration is scope-major, so ap-1's vpc failure comes first.
    let first = report.first_failure().unwrap();
    assert_eq!(first.scope, SyncScope::Region("ap-1".into()));
    assert_eq!(first.kind, ResourceKind::Vpc);
    assert!(report.result().is_err());
}

#[tokio::test]
async fn clean_run_is_fully_synced() {
    let h = harness(Vendor::Aws);
    h.client.set_regions(["ap-1"]);

    let report = h
        .orchestrator
        .sync_all(&h.kit, Vendor::Aws, &opt(false))
        .await
        .unwrap();

    assert!(report.fully_synced());
    assert_eq!(report.attempted, 7);
    assert_eq!(h.store.len().await, 7);
}

#[tokio::test]
async fn image_sync_stops_at_first_successful_scope() {
    let h = harness(Vendor::Aws);
    h.client.set_regions(["ap-1", "ap-2"]);

    let report = h
        .orchestrator
        .sync_all(&h.kit, Vendor::Aws, &opt(true))
        .await
        .unwrap();

    let image_calls: Vec<_> = h
        .client
        .sync_calls()
        .into_iter()
        .filter(|c| c.kind == ResourceKind::Image)
        .collect();
    assert_eq!(image_calls.len(), 1);
    assert_eq!(image_calls[0].scope, SyncScope::Region("ap-1".into()));
    assert!(report.fully_synced());
}

#[tokio::test]
async fn image_failure_on_one_scope_is_not_fatal_if_the_next_succeeds() {
    let h = harness(Vendor::Aws);
    h.client.set_regions(["ap-1", "ap-2"]);
    h.client
        .fail_sync(SyncScope::Region("ap-1".into()), ResourceKind::Image);

    let report = h
        .orchestrator
        .sync_all(&h.kit, Vendor::Aws, &opt(true))
        .await
        .unwrap();

    let image_calls: Vec<_> = h
        .client
        .sync_calls()
        .into_iter()
        .filter(|c| c.kind == ResourceKind::Image)
        .collect();
    assert_eq!(image_calls.len(), 2);
    // The catalog landed via ap-2, so the run is clean.
    assert!(report.fully_synced());
}

#[tokio::test]
async fn image_failure_on_every_scope_is_reported_once() {
    let h = harness(Vendor::Aws);
    h.client.set_regions(["ap-1", "ap-2"]);
    for region in ["ap-1", "ap-2"] {
        h.client
            .fail_sync(SyncScope::Region(region.into()), ResourceKind::Image);
    }

    let report = h
        .orchestrator
        .sync_all(&h.kit, Vendor::Aws, &opt(true))
        .await
        .unwrap();

    let image_failures: Vec<_> = report
        .failures
        .iter()
        .filter(|f| f.kind == ResourceKind::Image)
        .collect();
    assert_eq!(image_failures.len(), 1);
    assert_eq!(image_failures[0].scope, SyncScope::Region("ap-1".into()));
}

/// Store that accepts a fixed number of upserts, then fails every further
/// one.
struct QuotaStore {
    inner: MemoryResourceStore,
    remaining: Mutex<usize>,
}

impl QuotaStore {
    fn new(quota: usize) -> Self {
        Self {
            inner: MemoryResourceStore::new(),
            remaining: Mutex::new(quota),
        }
    }
}

#[async_trait]
impl ResourceStore for QuotaStore {
    async fn upsert(&self, kit: &Kit, record: ResourceRecord) -> Result<()> {
        {
            let mut remaining = self.remaining.lock().unwrap();
            if *remaining == 0 {
                return Err(Error::Store("storage quota exhausted".into()));
            }
            *remaining -= 1;
        }
        self.inner.upsert(kit, record).await
    }

    async fn get(
        &self,
        kit: &Kit,
        vendor: Vendor,
        account_id: &str,
        cloud_id: &str,
    ) -> Result<Option<ResourceRecord>> {
        self.inner.get(kit, vendor, account_id, cloud_id).await
    }

    async fn list_by_kind(
        &self,
        kit: &Kit,
        vendor: Vendor,
        account_id: &str,
        kind: ResourceKind,
    ) -> Result<Vec<ResourceRecord>> {
        self.inner.list_by_kind(kit, vendor, account_id, kind).await
    }
}

#[tokio::test]
async fn upsert_failure_mid_unit_keeps_the_partial_count() {
    let client = Arc::new(MockVendorClient::new(Vendor::Aws));
    client.set_regions(["ap-1"]);
    client.set_records_per_sync(3);
    let clients = VendorClients::new(vec![client.clone()]);
    let store = Arc::new(QuotaStore::new(1));
    let orchestrator = SyncOrchestrator::new(&clients, store.clone()).unwrap();

    let report = orchestrator
        .sync_all(&Kit::new(), Vendor::Aws, &opt(false))
        .await
        .unwrap();

    // The first unit landed one record before its second upsert failed;
    // the report counts what is actually in the store.
    assert_eq!(report.synced_records, 1);
    assert_eq!(store.inner.len().await, 1);
    assert_eq!(report.attempted, 7);
    assert_eq!(report.failures.len(), 7);
}

#[tokio::test]
async fn expired_deadline_stops_leaf_stages() {
    let h = harness(Vendor::Aws);
    h.client.set_regions(["ap-1"]);
    let kit = Kit::new().with_timeout(Duration::ZERO);

    let report = h
        .orchestrator
        .sync_all(&kit, Vendor::Aws, &opt(false))
        .await
        .unwrap();

    assert!(h.client.sync_calls().is_empty());
    assert_eq!(report.attempted, 0);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.contains("deadline"));
}

#[tokio::test]
async fn azure_fans_out_over_resource_groups() {
    let h = harness(Vendor::Azure);
    h.client.set_resource_groups(["rg-1", "rg-2"]);

    let report = h
        .orchestrator
        .sync_all(&h.kit, Vendor::Azure, &opt(false))
        .await
        .unwrap();

    // 8 group-scoped leaf kinds per resource group.
    assert_eq!(report.attempted, 16);
    assert!(h
        .client
        .sync_calls()
        .iter()
        .all(|c| matches!(c.scope, SyncScope::ResourceGroup(_))));
}

#[tokio::test]
async fn tcloud_syncs_sub_accounts_before_regional_leaves() {
    let h = harness(Vendor::TCloud);
    h.client.set_regions(["ap-1"]);

    let report = h
        .orchestrator
        .sync_all(&h.kit, Vendor::TCloud, &opt(false))
        .await
        .unwrap();

    let calls = h.client.sync_calls();
    assert_eq!(calls[0].scope, SyncScope::Global);
    assert_eq!(calls[0].kind, ResourceKind::SubAccount);
    // Global sub-account stage + 8 regional leaf kinds.
    assert_eq!(report.attempted, 9);
}

#[tokio::test]
async fn gcp_leaves_use_firewalls_not_security_groups() {
    let h = harness(Vendor::Gcp);
    h.client.set_regions(["ap-1"]);

    h.orchestrator
        .sync_all(&h.kit, Vendor::Gcp, &opt(false))
        .await
        .unwrap();

    let kinds: Vec<_> = h.client.sync_calls().iter().map(|c| c.kind).collect();
    assert!(kinds.contains(&ResourceKind::Firewall));
    assert!(!kinds.contains(&ResourceKind::SecurityGroup));
}

#[tokio::test]
async fn unconfigured_vendor_is_rejected() {
    let h = harness(Vendor::Aws);
    let err = h
        .orchestrator
        .sync_all(&h.kit, Vendor::Gcp, &opt(false))
        .await
        .unwrap_err();
    assert!(err.is_invalid_parameter());
}

#[tokio::test]
async fn empty_account_id_is_rejected() {
    let h = harness(Vendor::Aws);
    let bad = SyncAllOption {
        account_id: String::new(),
        sync_public_resource: false,
    };
    let err = h
        .orchestrator
        .sync_all(&h.kit, Vendor::Aws, &bad)
        .await
        .unwrap_err();
    assert!(err.is_invalid_parameter());
    assert!(h.client.sync_calls().is_empty());
}
