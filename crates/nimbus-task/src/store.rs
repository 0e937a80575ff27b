//! Task detail store boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use nimbus_core::{Error, Kit, Result};

use crate::detail::{DetailState, TaskDetail};

/// Persisted store of task details.
///
/// The store must offer strict-consistency reads of the most recent
/// committed state; the engine's pre-run guard depends on it. Details are
/// never deleted; terminal states are immutable.
#[async_trait]
pub trait DetailStore: Send + Sync {
    /// Insert new details. Ids must not already exist.
    async fn create(&self, kit: &Kit, details: Vec<TaskDetail>) -> Result<()>;

    /// Fetch details by id, in the order requested. Missing ids are an
    /// error: a detail referenced by a batch must exist.
    async fn get(&self, kit: &Kit, ids: &[String]) -> Result<Vec<TaskDetail>>;

    /// Transition details to `state`, recording the outcome payload and/or
    /// error message. Illegal transitions are rejected.
    async fn update_state(
        &self,
        kit: &Kit,
        ids: &[String],
        state: DetailState,
        result: Option<serde_json::Value>,
        error: Option<String>,
    ) -> Result<()>;
}

/// In-memory detail store for tests and single-process runs.
#[derive(Default)]
pub struct MemoryDetailStore {
    inner: RwLock<HashMap<String, TaskDetail>>,
}

impl MemoryDetailStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DetailStore for MemoryDetailStore {
    async fn create(&self, _kit: &Kit, details: Vec<TaskDetail>) -> Result<()> {
        let mut inner = self.inner.write().await;
        for detail in details {
            if inner.contains_key(&detail.id) {
                return Err(Error::Store(format!(
                    "task detail {} already exists",
                    detail.id
                )));
            }
            inner.insert(detail.id.clone(), detail);
        }
        Ok(())
    }

    async fn get(&self, _kit: &Kit, ids: &[String]) -> Result<Vec<TaskDetail>> {
        let inner = self.inner.read().await;
        ids.iter()
            .map(|id| {
                inner
                    .get(id)
                    .cloned()
                    .ok_or_else(|| Error::Store(format!("task detail {id} not found")))
            })
            .collect()
    }

    async fn update_state(
        &self,
        kit: &Kit,
        ids: &[String],
        state: DetailState,
        result: Option<serde_json::Value>,
        error: Option<String>,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        for id in ids {
            let detail = inner
                .get_mut(id)
                .ok_or_else(|| Error::Store(format!("task detail {id} not found")))?;
            if !detail.state.can_transition(state) {
                return Err(Error::Store(format!(
                    "task detail {id} cannot transition {} -> {state}",
                    detail.state
                )));
            }
            tracing::debug!(
                rid = kit.rid(),
                detail_id = %id,
                from = %detail.state,
                to = %state,
                "task detail transition"
            );
            detail.state = state;
            if result.is_some() {
                detail.result = result.clone();
            }
            if error.is_some() {
                detail.error = error.clone();
            }
            detail.updated_at = Utc::now();
        }
        Ok(())
    }
}
