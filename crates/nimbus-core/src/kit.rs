//! Execution kit: the per-request context threaded through every call.
//!
//! Every facade call, store call and action run receives a [`Kit`] so that
//! logs across services can be correlated by request id and so deadlines
//! travel with the work instead of living in ambient state.

use std::time::{Duration, Instant};

use uuid::Uuid;

/// Per-request execution context.
#[derive(Debug, Clone)]
pub struct Kit {
    rid: String,
    deadline: Option<Instant>,
}

impl Kit {
    /// New kit with a fresh request id and no deadline.
    pub fn new() -> Self {
        Self {
            rid: Uuid::new_v4().to_string(),
            deadline: None,
        }
    }

    /// New kit carrying an externally assigned request id, e.g. one decoded
    /// from an inbound RPC header.
    pub fn with_rid(rid: impl Into<String>) -> Self {
        Self {
            rid: rid.into(),
            deadline: None,
        }
    }

    /// Attach a deadline relative to now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Request id for log correlation.
    pub fn rid(&self) -> &str {
        &self.rid
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the deadline, if any, has passed.
    pub fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

impl Default for Kit {
    fn default() -> Self {
        Self::new()
    }
}
