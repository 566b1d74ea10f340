// Time-series controller - owns the view's state, including the axis orientation
use crate::application::controls::{ControlPanel, ControlValue, View};
use crate::application::fetcher::DataFetcher;
use crate::application::plot::timeseries::{TimeseriesAdapter, TimeseriesLabels};
use crate::application::plot_view::{PendingLoad, PlotView};
use crate::application::preferences::PreferenceStore;
use crate::application::registry::TimeseriesRegistry;
use crate::application::renderer::{PlotSurface, RendererBinding};
use crate::application::selection_model::{
    read_axis_properties, read_time_range, read_timeseries_figure, read_timeseries_selection,
};
use crate::domain::figure::{AxisProperties, TimeseriesFigureSettings};
use crate::domain::selection::{TimeRange, TimeseriesSelection};
use crate::domain::series::Series;
use crate::error::{ControlError, LoadError, PreferenceError, RenderError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Selection and window read when the load started.
pub struct TimeseriesLoad {
    fetcher: DataFetcher,
    selection: TimeseriesSelection,
    range: TimeRange,
}

pub struct TimeseriesData {
    selection: TimeseriesSelection,
    series: [Series; 4],
}

#[async_trait]
impl PendingLoad for TimeseriesLoad {
    type Loaded = TimeseriesData;

    async fn fetch(self, now: DateTime<Utc>) -> Result<TimeseriesData, LoadError> {
        let series = self.fetcher.load_timeseries(&self.selection, &self.range, now).await?;
        Ok(TimeseriesData {
            selection: self.selection,
            series,
        })
    }
}

pub struct TimeseriesController<S> {
    panel: ControlPanel,
    preferences: PreferenceStore,
    fetcher: DataFetcher,
    registry: TimeseriesRegistry,
    settings: TimeseriesFigureSettings,
    axes: [AxisProperties; 4],
    /// What the axes currently display, carried across axis switches.
    labels: TimeseriesLabels,
    adapter: TimeseriesAdapter,
    binding: RendererBinding<S>,
}

impl<S: PlotSurface> TimeseriesController<S> {
    pub async fn initialise(
        surface: S,
        fetcher: DataFetcher,
        preferences: PreferenceStore,
        now: DateTime<Utc>,
    ) -> Result<Self, LoadError> {
        let mut panel = ControlPanel::new(View::Timeseries, now);
        let ids = panel.persisted_ids();
        if let Err(e) = preferences.restore(&mut panel, &ids) {
            tracing::warn!("Could not restore time-series preferences, using defaults: {}", e);
        }

        let adapter = TimeseriesAdapter::new();
        let mut controller = Self {
            settings: read_timeseries_figure(&panel)?,
            axes: read_axis_properties(&panel)?,
            panel,
            preferences,
            fetcher,
            registry: TimeseriesRegistry::new(),
            labels: TimeseriesLabels::default(),
            adapter,
            binding: RendererBinding::new(surface),
        };

        controller.binding.create(adapter.initial_figure()).await?;
        controller.redraw_axes().await?;
        controller.relabel().await?;
        controller.binding.relayout_layout(&adapter.legend_update()).await?;
        Ok(controller)
    }

    #[cfg(test)]
    pub fn registry(&self) -> &TimeseriesRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub fn labels(&self) -> &TimeseriesLabels {
        &self.labels
    }

    #[cfg(test)]
    pub fn independent_axis_x(&self) -> bool {
        self.adapter.independent_axis_x()
    }

    #[cfg(test)]
    pub fn surface(&self) -> &S {
        self.binding.surface()
    }

    async fn replot(&mut self) -> Result<(), RenderError> {
        let update = self.adapter.compute_data_update(&self.registry);
        self.binding.restyle_data(&update).await
    }

    async fn redraw_axes(&mut self) -> Result<(), RenderError> {
        let (data, layout) = self.adapter.compute_axes_update(&self.settings, &self.axes);
        self.binding.update_both(&data, &layout).await
    }

    async fn relabel(&mut self) -> Result<(), RenderError> {
        let update = self.adapter.label_update(&self.labels);
        self.binding.relayout_layout(&update).await
    }

    /// Flip which physical axis is independent. Data, axes, labels and the
    /// legend are redrawn in that order; the displayed labels move with
    /// their series.
    pub async fn switch_axes(&mut self) -> Result<(), RenderError> {
        self.adapter.switch_axes();
        self.replot().await?;
        self.redraw_axes().await?;
        self.relabel().await?;
        let legend = self.adapter.legend_update();
        self.binding.relayout_layout(&legend).await
    }
}

#[async_trait]
impl<S: PlotSurface + Serialize> PlotView for TimeseriesController<S> {
    type Load = TimeseriesLoad;

    fn view(&self) -> View {
        View::Timeseries
    }

    fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    fn set_control(&mut self, key: &str, value: ControlValue) -> Result<(), ControlError> {
        let id = self.panel.lookup(key)?;
        self.panel.set(id, value)
    }

    fn prepare_load(&self) -> Result<TimeseriesLoad, LoadError> {
        Ok(TimeseriesLoad {
            fetcher: self.fetcher.clone(),
            selection: read_timeseries_selection(&self.panel)?,
            range: read_time_range(&self.panel)?,
        })
    }

    async fn finish_load(&mut self, loaded: TimeseriesData) -> Result<(), LoadError> {
        let TimeseriesData { selection, series } = loaded;
        self.registry.replace_all(series);
        self.replot().await?;

        self.labels = TimeseriesAdapter::compute_labels(&selection);
        self.relabel().await?;

        let colours = TimeseriesAdapter::compute_colour_update(&self.axes);
        self.binding.restyle_data(&colours).await?;

        tracing::info!("Time-series plot updated for {:?}", selection);
        Ok(())
    }

    async fn apply_changes(&mut self) -> Result<(), LoadError> {
        let settings = read_timeseries_figure(&self.panel)?;
        let axes = read_axis_properties(&self.panel)?;
        self.settings = settings;
        self.axes = axes;
        self.redraw_axes().await?;
        self.relabel().await?;
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
