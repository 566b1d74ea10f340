// Preference store - saves and restores control values across sessions
use crate::application::controls::{ControlId, ControlPanel, ControlValue};
use crate::error::PreferenceError;
use std::sync::Arc;

const TRUE: &str = "true";
const FALSE: &str = "false";

/// Flat string-keyed durable storage.
pub trait PreferenceBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    /// Write all entries in one go, overwriting existing keys.
    fn put(&self, entries: &[(String, String)]) -> Result<(), PreferenceError>;

    fn remove(&self, keys: &[String]) -> Result<(), PreferenceError>;
}

#[derive(Clone)]
pub struct PreferenceStore {
    backend: Arc<dyn PreferenceBackend>,
}

impl PreferenceStore {
    pub fn new(backend: Arc<dyn PreferenceBackend>) -> Self {
        Self { backend }
    }

    /// Persist the current value of each control in `ids`.
    pub fn save(&self, panel: &ControlPanel, ids: &[ControlId]) -> Result<(), PreferenceError> {
        let mut entries = Vec::with_capacity(ids.len());
        for &id in ids {
            let Ok(value) = panel.value(id) else {
                tracing::warn!("Skipping preference for unknown control {}", id.key());
                continue;
            };
            let encoded = match value {
                ControlValue::Flag(true) => TRUE.to_string(),
                ControlValue::Flag(false) => FALSE.to_string(),
                ControlValue::Text(text) => text.clone(),
            };
            entries.push((id.key(), encoded));
        }
        self.backend.put(&entries)?;
        tracing::info!("Saved {} preferences for {:?}", entries.len(), panel.view());
        Ok(())
    }

    /// Apply stored values to the panel. Missing keys leave defaults alone,
    /// and so does a stored value the control would refuse: a flag only
    /// takes `true` or `false`, a colour only `#rrggbb`.
    pub fn restore(&self, panel: &mut ControlPanel, ids: &[ControlId]) -> Result<usize, PreferenceError> {
        let mut restored = 0;
        for &id in ids {
            let Some(stored) = self.backend.get(&id.key())? else {
                continue;
            };
            let value = match panel.value(id) {
                Ok(ControlValue::Flag(_)) => match stored.as_str() {
                    TRUE => ControlValue::Flag(true),
                    FALSE => ControlValue::Flag(false),
                    _ => {
                        tracing::warn!("Ignoring stored {} = '{}', not a flag", id.key(), stored);
                        continue;
                    }
                },
                Ok(ControlValue::Text(_)) => ControlValue::Text(stored),
                Err(_) => continue,
            };
            match panel.set(id, value) {
                Ok(()) => restored += 1,
                Err(e) => tracing::warn!("Ignoring stored {}: {}", id.key(), e),
            }
        }
        tracing::debug!("Restored {} preferences for {:?}", restored, panel.view());
        Ok(restored)
    }

    pub fn clear(&self, ids: &[ControlId]) -> Result<(), PreferenceError> {
        let keys: Vec<String> = ids.iter().map(ControlId::key).collect();
        self.backend.remove(&keys)?;
        tracing::info!("Cleared {} preferences", keys.len());
        Ok(())
    }
}
