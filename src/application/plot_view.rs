// Common surface of the two plot controllers, used by the HTTP layer
use crate::application::controls::{ControlPanel, ControlValue, View};
use crate::error::{ControlError, LoadError, PreferenceError, RenderError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// A load whose inputs have already been read from the controls. Fetching
/// needs nothing from the view, so the view stays usable meanwhile.
#[async_trait]
pub trait PendingLoad: Send + 'static {
    type Loaded: Send + 'static;

    async fn fetch(self, now: DateTime<Utc>) -> Result<Self::Loaded, LoadError>;
}

#[async_trait]
pub trait PlotView: Send + Sync {
    type Load: PendingLoad;

    fn view(&self) -> View;

    fn panel(&self) -> &ControlPanel;

    /// Change one control by its key. Takes effect on the next load or apply.
    fn set_control(&mut self, key: &str, value: ControlValue) -> Result<(), ControlError>;

    /// Snapshot the selection and time range for a load.
    fn prepare_load(&self) -> Result<Self::Load, LoadError>;

    /// Replace the slots with fetched data, then replot, relabel and recolour.
    async fn finish_load(&mut self, loaded: <Self::Load as PendingLoad>::Loaded) -> Result<(), LoadError>;

    /// Snapshot, fetch, replace the slots, then redraw. Any failure stops
    /// the chain and leaves the loaded data as it was.
    #[cfg(test)]
    async fn load_data(&mut self, now: DateTime<Utc>) -> Result<(), LoadError> {
        let loaded = self.prepare_load()?.fetch(now).await?;
        self.finish_load(loaded).await
    }

    /// Re-read figure settings from the controls and redraw axes and colours.
    async fn apply_changes(&mut self) -> Result<(), LoadError>;

    async fn resize(&mut self) -> Result<(), RenderError>;

    fn save_preferences(&self) -> Result<(), PreferenceError>;

    fn clear_preferences(&self) -> Result<(), PreferenceError>;

    /// The figure as the external renderer should display it.
    fn figure(&self) -> Result<Value, serde_json::Error>;
}
