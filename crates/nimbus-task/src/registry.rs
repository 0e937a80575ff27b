//! Action registry.

use std::collections::HashMap;
use std::sync::Arc;

use nimbus_core::{Error, Result};

use crate::action::Action;
use crate::actions;

/// Process-wide mapping from action name to implementation.
///
/// Built explicitly once at startup; registration order is the order of
/// `register` calls, never module load order. After construction the
/// registry is read-only and safe for concurrent lookups. Registering a
/// second action under an existing name is rejected at registration time,
/// never discovered at call time.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<&'static str, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, action: Arc<dyn Action>) -> Result<()> {
        let name = action.name();
        if self.actions.contains_key(name) {
            return Err(Error::invalid(format!(
                "action {name} is already registered"
            )));
        }
        self.actions.insert(name, action);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Action>> {
        self.actions
            .get(name)
            .cloned()
            .ok_or_else(|| Error::invalid(format!("unknown action: {name}")))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.actions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Registry with every built-in action, in deterministic order.
pub fn builtin_registry() -> Result<ActionRegistry> {
    let mut registry = ActionRegistry::new();
    registry.register(Arc::new(actions::target_weight::ModifyTargetWeightAction))?;
    registry.register(Arc::new(actions::create_vpc::CreateVpcAction))?;
    Ok(registry)
}
