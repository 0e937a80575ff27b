//! Nimbus Core
//!
//! Shared types for the Nimbus multi-cloud control plane: the error
//! taxonomy used across every crate, the execution kit that threads a
//! request id and deadline through every call, the vendor enum, and the
//! local projection of cloud resources.

pub mod error;
pub mod kit;
pub mod resource;
pub mod vendor;

// Re-exports
pub use error::{Error, Result};
pub use kit::Kit;
pub use resource::{ResourceKind, ResourceRecord};
pub use vendor::Vendor;
