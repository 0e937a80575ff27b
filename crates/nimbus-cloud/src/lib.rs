//! Nimbus Cloud
//!
//! The vendor client facade boundary: one logical interface per cloud
//! vendor, a write-once lookup table from vendor tag to implementation,
//! the local resource record store, and the create-then-read-back
//! provisioning helper.
//!
//! The concrete SDK bindings live outside this workspace; everything here
//! treats a vendor client as an opaque remote call with latency and
//! transient-failure risk.

pub mod client;
pub mod clients;
pub mod mock;
pub mod provision;
pub mod store;

// Re-exports
pub use client::{
    ListFilter, SubnetCreateSpec, SyncRequest, SyncScope, TargetWeightRequest, TargetWeightResult,
    VendorClient, VpcCreateSpec, MAX_LIST_IDS,
};
pub use clients::VendorClients;
pub use provision::{create_vpc, CreatedVpc, ProvisionConfig};
pub use store::{MemoryResourceStore, ResourceStore};
