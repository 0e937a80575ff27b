//! Write-once lookup table from vendor tag to client implementation.

use std::collections::HashMap;
use std::sync::Arc;

use nimbus_core::{Error, Result, Vendor};

use crate::client::VendorClient;

/// The set of configured vendor clients.
///
/// Built once at process start and shared read-only by every in-flight
/// execution; the vendor tag is resolved here exactly once per operation
/// instead of being re-switched at each call site.
pub struct VendorClients {
    inner: HashMap<Vendor, Arc<dyn VendorClient>>,
}

impl VendorClients {
    pub fn new(clients: Vec<Arc<dyn VendorClient>>) -> Self {
        let inner = clients.into_iter().map(|c| (c.vendor(), c)).collect();
        Self { inner }
    }

    /// Resolve the client for a vendor. An unconfigured vendor is an input
    /// error, never a panic.
    pub fn get(&self, vendor: Vendor) -> Result<Arc<dyn VendorClient>> {
        self.inner
            .get(&vendor)
            .cloned()
            .ok_or_else(|| Error::invalid(format!("unsupported vendor: {vendor}")))
    }

    pub fn vendors(&self) -> impl Iterator<Item = Vendor> + '_ {
        self.inner.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
