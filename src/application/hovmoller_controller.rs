// Hovmoller controller - owns the view's state and runs its load/apply pipelines
use crate::application::controls::{ControlPanel, ControlValue, View};
use crate::application::fetcher::DataFetcher;
use crate::application::plot::hovmoller::{HovmollerAdapter, HovmollerLabels};
use crate::application::plot_view::{PendingLoad, PlotView};
use crate::application::preferences::PreferenceStore;
use crate::application::registry::HovmollerRegistry;
use crate::application::renderer::{PlotSurface, RendererBinding};
use crate::application::selection_model::{
    read_colour_properties, read_hovmoller_figure, read_hovmoller_selection, read_time_range,
};
use crate::domain::figure::{ColourProperties, HovmollerFigureSettings};
use crate::domain::selection::{HovmollerSelection, TimeRange};
use crate::domain::series::ScatterSeries;
use crate::error::{ControlError, LoadError, PreferenceError, RenderError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Selection, window and colour properties read when the load started.
pub struct HovmollerLoad {
    fetcher: DataFetcher,
    selection: HovmollerSelection,
    range: TimeRange,
    colours: [ColourProperties; 2],
}

pub struct HovmollerData {
    selection: HovmollerSelection,
    colours: [ColourProperties; 2],
    series: [ScatterSeries; 2],
}

#[async_trait]
impl PendingLoad for HovmollerLoad {
    type Loaded = HovmollerData;

    async fn fetch(self, now: DateTime<Utc>) -> Result<HovmollerData, LoadError> {
        let series = self.fetcher.load_hovmoller(&self.selection, &self.range, now).await?;
        Ok(HovmollerData {
            selection: self.selection,
            colours: self.colours,
            series,
        })
    }
}

pub struct HovmollerController<S> {
    panel: ControlPanel,
    preferences: PreferenceStore,
    fetcher: DataFetcher,
    registry: HovmollerRegistry,
    settings: HovmollerFigureSettings,
    colours: [ColourProperties; 2],
    labels: HovmollerLabels,
    binding: RendererBinding<S>,
}

impl<S: PlotSurface> HovmollerController<S> {
    /// Restore saved preferences into fresh controls, then create the plot
    /// with empty slots.
    pub async fn initialise(
        surface: S,
        fetcher: DataFetcher,
        preferences: PreferenceStore,
        now: DateTime<Utc>,
    ) -> Result<Self, LoadError> {
        let mut panel = ControlPanel::new(View::Hovmoller, now);
        let ids = panel.persisted_ids();
        if let Err(e) = preferences.restore(&mut panel, &ids) {
            tracing::warn!("Could not restore Hovmoller preferences, using defaults: {}", e);
        }

        let mut controller = Self {
            settings: read_hovmoller_figure(&panel)?,
            colours: read_colour_properties(&panel)?,
            panel,
            preferences,
            fetcher,
            registry: HovmollerRegistry::new(),
            labels: HovmollerLabels::default(),
            binding: RendererBinding::new(surface),
        };

        controller.binding.create(HovmollerAdapter::initial_figure()).await?;
        controller.redraw_axes().await?;
        controller
            .binding
            .relayout_layout(&HovmollerAdapter::label_update(&controller.labels))
            .await?;
        Ok(controller)
    }

    #[cfg(test)]
    pub fn registry(&self) -> &HovmollerRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub fn surface(&self) -> &S {
        self.binding.surface()
    }

    async fn redraw_axes(&mut self) -> Result<(), RenderError> {
        let (data, layout) =
            HovmollerAdapter::compute_axes_update(&self.settings, &self.colours, &self.registry, &self.labels);
        self.binding.update_both(&data, &layout).await
    }
}

#[async_trait]
impl<S: PlotSurface + Serialize> PlotView for HovmollerController<S> {
    type Load = HovmollerLoad;

    fn view(&self) -> View {
        View::Hovmoller
    }

    fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    fn set_control(&mut self, key: &str, value: ControlValue) -> Result<(), ControlError> {
        let id = self.panel.lookup(key)?;
        self.panel.set(id, value)
    }

    fn prepare_load(&self) -> Result<HovmollerLoad, LoadError> {
        Ok(HovmollerLoad {
            fetcher: self.fetcher.clone(),
            selection: read_hovmoller_selection(&self.panel)?,
            range: read_time_range(&self.panel)?,
            colours: read_colour_properties(&self.panel)?,
        })
    }

    async fn finish_load(&mut self, loaded: HovmollerData) -> Result<(), LoadError> {
        let HovmollerData {
            selection,
            colours,
            series,
        } = loaded;
        self.registry.replace_all(series);

        self.binding
            .restyle_data(&HovmollerAdapter::compute_data_update(&self.registry))
            .await?;

        self.labels = HovmollerAdapter::compute_labels(&selection);
        self.binding
            .relayout_layout(&HovmollerAdapter::label_update(&self.labels))
            .await?;

        self.colours = colours;
        let (colour_update, _) =
            HovmollerAdapter::compute_axes_update(&self.settings, &self.colours, &self.registry, &self.labels);
        self.binding.restyle_data(&colour_update).await?;

        tracing::info!("Hovmoller plot updated for {:?}", selection);
        Ok(())
    }

    async fn apply_changes(&mut self) -> Result<(), LoadError> {
        let settings = read_hovmoller_figure(&self.panel)?;
        let colours = read_colour_properties(&self.panel)?;
        self.settings = settings;
        self.colours = colours;
        self.redraw_axes().await?;
        Ok(())
    }

    async fn resize(&mut self) -> Result<(), RenderError> {
        self.binding.notify_resize().await
    }

    fn save_preferences(&self) -> Result<(), PreferenceError> {
        self.preferences.save(&self.panel, &self.panel.persisted_ids())
    }

    fn clear_preferences(&self) -> Result<(), PreferenceError> {
        self.preferences.clear(&self.panel.persisted_ids())
    }

    fn figure(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self.binding.surface())
    }
}
