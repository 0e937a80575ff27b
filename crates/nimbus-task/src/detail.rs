//! Task detail model and its state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nimbus_core::Vendor;

/// Execution state of one task detail.
///
/// Engine-driven transitions are `Init → Running` and `Running → Success |
/// Failed`. `Cancel` may be set out-of-band from any non-terminal state;
/// the engine honors it at the next guard check. Terminal states are
/// immutable once committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailState {
    Init,
    Running,
    Success,
    Failed,
    Cancel,
}

impl DetailState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DetailState::Success | DetailState::Failed | DetailState::Cancel)
    }

    /// Whether the transition to `next` is legal.
    pub fn can_transition(&self, next: DetailState) -> bool {
        match (self, next) {
            (DetailState::Init, DetailState::Running) => true,
            (DetailState::Running, DetailState::Success) => true,
            (DetailState::Running, DetailState::Failed) => true,
            // Out-of-band cancellation, any time before the engine observes
            // Running as terminal work.
            (DetailState::Init, DetailState::Cancel) => true,
            (DetailState::Running, DetailState::Cancel) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for DetailState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DetailState::Init => "init",
            DetailState::Running => "running",
            DetailState::Success => "success",
            DetailState::Failed => "failed",
            DetailState::Cancel => "cancel",
        };
        f.write_str(s)
    }
}

/// Persisted record of one sub-operation's execution state and outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDetail {
    pub id: String,
    /// The task grouping this detail with its siblings.
    pub task_id: String,
    pub vendor: Vendor,
    pub state: DetailState,
    /// Opaque outcome payload, set on success.
    pub result: Option<serde_json::Value>,
    /// Failure message, set on failure.
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl TaskDetail {
    pub fn new(id: impl Into<String>, task_id: impl Into<String>, vendor: Vendor) -> Self {
        Self {
            id: id.into(),
            task_id: task_id.into(),
            vendor,
            state: DetailState::Init,
            result: None,
            error: None,
            updated_at: Utc::now(),
        }
    }
}
