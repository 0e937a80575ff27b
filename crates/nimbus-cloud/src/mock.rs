//! Scriptable in-memory vendor client for tests.
//!
//! Lets a test enumerate fixed scopes, fail chosen calls, and inspect what
//! the engine or a pipeline actually asked the vendor for.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use nimbus_core::{Error, Kit, ResourceKind, ResourceRecord, Result, Vendor};

use crate::client::{
    ListFilter, SubnetCreateSpec, SyncRequest, SyncScope, TargetWeightRequest, TargetWeightResult,
    VendorClient, VpcCreateSpec,
};

#[derive(Default)]
struct MockState {
    regions: Vec<String>,
    resource_groups: Vec<String>,
    fail_scope_discovery: bool,
    fail_sync_on: HashSet<(SyncScope, ResourceKind)>,
    fail_weight_on: HashSet<String>,
    fail_create_vpc: bool,
    readback_count: usize,
    records_per_sync: usize,
    next_id: u64,
    sync_calls: Vec<SyncRequest>,
    weight_calls: Vec<String>,
    created: Vec<(ResourceKind, String)>,
    deleted: Vec<(ResourceKind, String)>,
}

/// Test double for [`VendorClient`].
pub struct MockVendorClient {
    vendor: Vendor,
    state: Mutex<MockState>,
}

impl MockVendorClient {
    pub fn new(vendor: Vendor) -> Self {
        Self {
            vendor,
            state: Mutex::new(MockState {
                readback_count: 1,
                records_per_sync: 1,
                next_id: 1,
                ..MockState::default()
            }),
        }
    }

    pub fn set_regions<S: Into<String>>(&self, regions: impl IntoIterator<Item = S>) {
        self.state.lock().unwrap().regions = regions.into_iter().map(Into::into).collect();
    }

    pub fn set_resource_groups<S: Into<String>>(&self, groups: impl IntoIterator<Item = S>) {
        self.state.lock().unwrap().resource_groups = groups.into_iter().map(Into::into).collect();
    }

    /// Make scope discovery (regions and resource groups) fail.
    pub fn fail_scope_discovery(&self) {
        self.state.lock().unwrap().fail_scope_discovery = true;
    }

    /// Make sync fail for one (scope, kind) pair.
    pub fn fail_sync(&self, scope: SyncScope, kind: ResourceKind) {
        self.state.lock().unwrap().fail_sync_on.insert((scope, kind));
    }

    /// Make weight adjustment fail for one listener.
    pub fn fail_weight(&self, listener_cloud_id: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .fail_weight_on
            .insert(listener_cloud_id.into());
    }

    pub fn fail_create_vpc(&self) {
        self.state.lock().unwrap().fail_create_vpc = true;
    }

    /// How many records every read-back list returns per requested id.
    pub fn set_readback_count(&self, count: usize) {
        self.state.lock().unwrap().readback_count = count;
    }

    /// How many records every successful sync call returns.
    pub fn set_records_per_sync(&self, count: usize) {
        self.state.lock().unwrap().records_per_sync = count;
    }

    pub fn sync_calls(&self) -> Vec<SyncRequest> {
        self.state.lock().unwrap().sync_calls.clone()
    }

    pub fn weight_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().weight_calls.clone()
    }

    pub fn created(&self) -> Vec<(ResourceKind, String)> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn deleted(&self) -> Vec<(ResourceKind, String)> {
        self.state.lock().unwrap().deleted.clone()
    }

    fn next_cloud_id(state: &mut MockState, prefix: &str) -> String {
        let id = format!("{prefix}-{}", state.next_id);
        state.next_id += 1;
        id
    }
}

#[async_trait]
impl VendorClient for MockVendorClient {
    fn vendor(&self) -> Vendor {
        self.vendor
    }

    async fn list_regions(&self, _kit: &Kit, _account_id: &str) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        if state.fail_scope_discovery {
            return Err(Error::vendor_call(self.vendor, "region listing unavailable"));
        }
        Ok(state.regions.clone())
    }

    async fn list_resource_groups(&self, _kit: &Kit, _account_id: &str) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        if state.fail_scope_discovery {
            return Err(Error::vendor_call(
                self.vendor,
                "resource group listing unavailable",
            ));
        }
        Ok(state.resource_groups.clone())
    }

    async fn sync(&self, _kit: &Kit, req: &SyncRequest) -> Result<Vec<ResourceRecord>> {
        let mut state = self.state.lock().unwrap();
        state.sync_calls.push(req.clone());
        if state
            .fail_sync_on
            .contains(&(req.scope.clone(), req.kind))
        {
            return Err(Error::vendor_call(
                self.vendor,
                format!("sync {} failed in {}", req.kind, req.scope),
            ));
        }
        let scope = match &req.scope {
            SyncScope::Global => None,
            SyncScope::Region(r) => Some(r.clone()),
            SyncScope::ResourceGroup(g) => Some(g.clone()),
        };
        let mut records = Vec::with_capacity(state.records_per_sync);
        for _ in 0..state.records_per_sync {
            let cloud_id = Self::next_cloud_id(&mut state, "res");
            let mut record =
                ResourceRecord::new(self.vendor, &req.account_id, cloud_id, req.kind, "synced");
            record.scope = scope.clone();
            records.push(record);
        }
        Ok(records)
    }

    async fn list(&self, _kit: &Kit, filter: &ListFilter) -> Result<Vec<ResourceRecord>> {
        filter.validate()?;
        let state = self.state.lock().unwrap();
        let kind = filter.kind.unwrap_or(ResourceKind::Vpc);
        let mut records = Vec::new();
        for cloud_id in &filter.cloud_ids {
            for _ in 0..state.readback_count {
                records.push(ResourceRecord::new(
                    self.vendor,
                    &filter.account_id,
                    cloud_id,
                    kind,
                    cloud_id,
                ));
            }
        }
        Ok(records)
    }

    async fn create_vpc(&self, _kit: &Kit, spec: &VpcCreateSpec) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        if state.fail_create_vpc {
            return Err(Error::vendor_call(self.vendor, "vpc create failed"));
        }
        let id = Self::next_cloud_id(&mut state, "vpc");
        state.created.push((ResourceKind::Vpc, spec.name.clone()));
        Ok(id)
    }

    async fn create_subnet(
        &self,
        _kit: &Kit,
        _vpc_cloud_id: &str,
        spec: &SubnetCreateSpec,
    ) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_cloud_id(&mut state, "subnet");
        state.created.push((ResourceKind::Subnet, spec.name.clone()));
        Ok(id)
    }

    async fn delete(&self, _kit: &Kit, kind: ResourceKind, cloud_id: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .deleted
            .push((kind, cloud_id.to_string()));
        Ok(())
    }

    async fn modify_target_weight(
        &self,
        _kit: &Kit,
        _lb_cloud_id: &str,
        req: &TargetWeightRequest,
    ) -> Result<TargetWeightResult> {
        let mut state = self.state.lock().unwrap();
        state.weight_calls.push(req.listener_cloud_id.clone());
        if state.fail_weight_on.contains(&req.listener_cloud_id) {
            return Err(Error::vendor_call(
                self.vendor,
                format!("weight adjustment failed on {}", req.listener_cloud_id),
            ));
        }
        Ok(TargetWeightResult {
            listener_cloud_id: req.listener_cloud_id.clone(),
            applied: req.target_cloud_ids.len(),
        })
    }
}
