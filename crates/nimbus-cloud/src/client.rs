//! Vendor client facade trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use nimbus_core::{Error, Kit, ResourceKind, ResourceRecord, Result, Vendor};

/// Upper bound on explicit cloud ids in one list call.
pub const MAX_LIST_IDS: usize = 500;

/// Scope a sync call runs under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum SyncScope {
    /// Account-wide resources with no regional dimension.
    Global,
    Region(String),
    ResourceGroup(String),
}

impl std::fmt::Display for SyncScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncScope::Global => f.write_str("global"),
            SyncScope::Region(r) => write!(f, "region:{r}"),
            SyncScope::ResourceGroup(g) => write!(f, "resource-group:{g}"),
        }
    }
}

/// One (account, scope, resource kind) sync unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    pub account_id: String,
    pub scope: SyncScope,
    pub kind: ResourceKind,
}

/// Filter for a facade list call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListFilter {
    pub account_id: String,
    pub kind: Option<ResourceKind>,
    pub cloud_ids: Vec<String>,
    pub scope: Option<SyncScope>,
}

impl ListFilter {
    pub fn by_cloud_id(
        account_id: impl Into<String>,
        kind: ResourceKind,
        cloud_id: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            kind: Some(kind),
            cloud_ids: vec![cloud_id.into()],
            scope: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cloud_ids.len() > MAX_LIST_IDS {
            return Err(Error::TooManyRequest(format!(
                "cloud_ids length should <= {MAX_LIST_IDS}, got {}",
                self.cloud_ids.len()
            )));
        }
        Ok(())
    }
}

/// Spec for creating a VPC, optionally with subnets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VpcCreateSpec {
    pub account_id: String,
    pub name: String,
    pub region: String,
    pub cidr: Option<String>,
    #[serde(default)]
    pub subnets: Vec<SubnetCreateSpec>,
}

/// Spec for creating a subnet inside a VPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubnetCreateSpec {
    pub name: String,
    pub region: String,
    pub cidr: String,
}

/// One listener's worth of a batch weight adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetWeightRequest {
    pub listener_cloud_id: String,
    pub target_cloud_ids: Vec<String>,
    pub weight: u32,
}

/// Outcome of a weight adjustment on one listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetWeightResult {
    pub listener_cloud_id: String,
    pub applied: usize,
}

/// One logical interface per vendor.
///
/// Calls take a [`Kit`] for correlation and deadline propagation and may
/// fail transiently; nothing here retries.
#[async_trait]
pub trait VendorClient: Send + Sync {
    fn vendor(&self) -> Vendor;

    /// Enumerate the vendor's regions for an account.
    async fn list_regions(&self, kit: &Kit, account_id: &str) -> Result<Vec<String>>;

    /// Enumerate resource groups for an account. Only meaningful for
    /// vendors that scope resources by group.
    async fn list_resource_groups(&self, kit: &Kit, account_id: &str) -> Result<Vec<String>> {
        let _ = (kit, account_id);
        Err(Error::invalid(format!(
            "vendor {} does not scope resources by resource group",
            self.vendor()
        )))
    }

    /// Pull vendor inventory for one (account, scope, kind) unit and return
    /// the normalized records.
    async fn sync(&self, kit: &Kit, req: &SyncRequest) -> Result<Vec<ResourceRecord>>;

    async fn list(&self, kit: &Kit, filter: &ListFilter) -> Result<Vec<ResourceRecord>>;

    /// Create a VPC, returning its cloud-native id.
    async fn create_vpc(&self, kit: &Kit, spec: &VpcCreateSpec) -> Result<String>;

    /// Create a subnet under an existing VPC, returning its cloud-native id.
    async fn create_subnet(
        &self,
        kit: &Kit,
        vpc_cloud_id: &str,
        spec: &SubnetCreateSpec,
    ) -> Result<String>;

    async fn delete(&self, kit: &Kit, kind: ResourceKind, cloud_id: &str) -> Result<()>;

    /// Set listener target weights on a load balancer. Absolute weights, so
    /// the call is idempotent. Vendors without the capability keep the
    /// default rejection.
    async fn modify_target_weight(
        &self,
        kit: &Kit,
        lb_cloud_id: &str,
        req: &TargetWeightRequest,
    ) -> Result<TargetWeightResult> {
        let _ = (kit, lb_cloud_id, req);
        Err(Error::invalid(format!(
            "vendor {} does not support listener target weight adjustment",
            self.vendor()
        )))
    }
}
