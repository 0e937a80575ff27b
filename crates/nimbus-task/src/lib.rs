//! Nimbus Task
//!
//! The task execution engine: named, typed, registrable units of work with
//! run/rollback semantics, a persisted per-detail state machine, and
//! idempotent batch execution. One logical worker drives one batch; items
//! execute strictly in order and every state transition is persisted
//! before the next item starts, so a crash mid-batch leaves a resumable
//! tail of `Init` details.

pub mod action;
pub mod actions;
pub mod detail;
pub mod engine;
pub mod registry;
pub mod store;

// Re-exports
pub use action::{parse_params, Action, ActionContext};
pub use detail::{DetailState, TaskDetail};
pub use engine::{BatchRunner, EngineConfig, TaskEngine};
pub use registry::{builtin_registry, ActionRegistry};
pub use store::{DetailStore, MemoryDetailStore};
