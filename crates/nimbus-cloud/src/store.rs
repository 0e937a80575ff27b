//! Resource record store boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use nimbus_core::{Kit, ResourceKind, ResourceRecord, Result, Vendor};

/// Local store of cloud resource projections.
///
/// Mutation is a single-record upsert keyed by the record's natural key
/// `(vendor, account, cloud_id)`; no multi-record transactions exist at
/// this boundary.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn upsert(&self, kit: &Kit, record: ResourceRecord) -> Result<()>;

    async fn get(
        &self,
        kit: &Kit,
        vendor: Vendor,
        account_id: &str,
        cloud_id: &str,
    ) -> Result<Option<ResourceRecord>>;

    async fn list_by_kind(
        &self,
        kit: &Kit,
        vendor: Vendor,
        account_id: &str,
        kind: ResourceKind,
    ) -> Result<Vec<ResourceRecord>>;
}

type Key = (Vendor, String, String);

/// In-memory store used by tests and by deployments that keep projections
/// ephemeral. The relational store implements the same trait elsewhere.
#[derive(Default)]
pub struct MemoryResourceStore {
    inner: RwLock<HashMap<Key, ResourceRecord>>,
}

impl MemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn upsert(&self, kit: &Kit, mut record: ResourceRecord) -> Result<()> {
        let key = (
            record.vendor,
            record.account_id.clone(),
            record.cloud_id.clone(),
        );
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.get(&key) {
            // Updates keep the original creation time.
            record.created_at = existing.created_at;
            record.updated_at = Utc::now();
        }
        tracing::debug!(
            rid = kit.rid(),
            vendor = %record.vendor,
            cloud_id = %record.cloud_id,
            kind = %record.kind,
            "upsert resource record"
        );
        inner.insert(key, record);
        Ok(())
    }

    async fn get(
        &self,
        _kit: &Kit,
        vendor: Vendor,
        account_id: &str,
        cloud_id: &str,
    ) -> Result<Option<ResourceRecord>> {
        let key = (vendor, account_id.to_string(), cloud_id.to_string());
        Ok(self.inner.read().await.get(&key).cloned())
    }

    async fn list_by_kind(
        &self,
        _kit: &Kit,
        vendor: Vendor,
        account_id: &str,
        kind: ResourceKind,
    ) -> Result<Vec<ResourceRecord>> {
        Ok(self
            .inner
            .read()
            .await
            .values()
            .filter(|r| r.vendor == vendor && r.account_id == account_id && r.kind == kind)
            .cloned()
            .collect())
    }
}
