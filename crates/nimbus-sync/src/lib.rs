//! Nimbus Sync
//!
//! The resource sync orchestrator: a staged, per-vendor pipeline that
//! discovers scope resources (regions, resource groups) first, then fans
//! out per-scope sync calls for every dependent resource type. Scope
//! discovery failures abort the run; leaf failures are logged, remembered,
//! and the pipeline keeps going so every independent unit gets its
//! attempt.

pub mod orchestrator;
pub mod pipeline;
pub mod report;
pub mod vendors;

// Re-exports
pub use orchestrator::SyncOrchestrator;
pub use pipeline::{SyncAllOption, SyncPipeline};
pub use report::{SyncFailure, SyncReport};
