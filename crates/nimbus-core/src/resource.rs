//! Local projection of cloud resources.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::vendor::Vendor;

/// Resource types the control plane tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Vpc,
    Subnet,
    Disk,
    Eip,
    SecurityGroup,
    Firewall,
    Cvm,
    RouteTable,
    NetworkInterface,
    Image,
    SubAccount,
    LoadBalancer,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResourceKind::Vpc => "vpc",
            ResourceKind::Subnet => "subnet",
            ResourceKind::Disk => "disk",
            ResourceKind::Eip => "eip",
            ResourceKind::SecurityGroup => "security_group",
            ResourceKind::Firewall => "firewall",
            ResourceKind::Cvm => "cvm",
            ResourceKind::RouteTable => "route_table",
            ResourceKind::NetworkInterface => "network_interface",
            ResourceKind::Image => "image",
            ResourceKind::SubAccount => "sub_account",
            ResourceKind::LoadBalancer => "load_balancer",
        };
        f.write_str(s)
    }
}

/// One cloud resource as seen by the local store.
///
/// Keyed by `(vendor, account_id, cloud_id)`; upserted by sync or by an
/// explicit create, never fabricated elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub vendor: Vendor,
    pub account_id: String,
    /// Cloud-native identifier, unique within the vendor account.
    pub cloud_id: String,
    pub kind: ResourceKind,
    pub name: String,
    /// Region or resource group the resource lives in, when scoped.
    pub scope: Option<String>,
    /// Vendor-specific attributes kept as an opaque bag.
    pub attributes: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResourceRecord {
    pub fn new(
        vendor: Vendor,
        account_id: impl Into<String>,
        cloud_id: impl Into<String>,
        kind: ResourceKind,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            vendor,
            account_id: account_id.into(),
            cloud_id: cloud_id.into(),
            kind,
            name: name.into(),
            scope: None,
            attributes: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Natural key of the record.
    pub fn key(&self) -> (Vendor, &str, &str) {
        (self.vendor, &self.account_id, &self.cloud_id)
    }

    pub fn get_attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_vendor_account_cloud_id() {
        let rec = ResourceRecord::new(Vendor::Gcp, "acc-1", "vpc-9", ResourceKind::Vpc, "main");
        assert_eq!(rec.key(), (Vendor::Gcp, "acc-1", "vpc-9"));
    }

    #[test]
    fn attributes_round_trip_typed() {
        let rec = ResourceRecord::new(Vendor::Aws, "acc-1", "i-1", ResourceKind::Cvm, "web")
            .with_attribute("cpu", serde_json::json!(4));
        assert_eq!(rec.get_attribute::<u32>("cpu"), Some(4));
        assert_eq!(rec.get_attribute::<u32>("memory"), None);
    }
}
