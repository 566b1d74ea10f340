// Headless plot surface - keeps the figure as a JSON document for the external renderer
use crate::application::renderer::{Figure, PlotHandle, PlotSurface, PlotUpdate};
use crate::error::RenderError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

/// Applies restyle/relayout/update the way the browser renderer does, so
/// the served document is what the page would show after the same calls.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FigureDocument {
    data: Vec<Value>,
    layout: Map<String, Value>,
    config: Map<String, Value>,
    /// Bumped after every applied operation so clients can skip redraws.
    revision: u64,
    #[serde(skip)]
    handle: Option<PlotHandle>,
    #[serde(skip)]
    observing_resize: bool,
}

impl FigureDocument {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn traces(&self) -> &[Value] {
        &self.data
    }

    #[cfg(test)]
    pub fn layout(&self) -> &Map<String, Value> {
        &self.layout
    }

    #[cfg(test)]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[cfg(test)]
    pub fn is_observing_resize(&self) -> bool {
        self.observing_resize
    }

    fn check(&self, handle: PlotHandle, operation: &'static str) -> Result<(), RenderError> {
        if self.handle == Some(handle) {
            Ok(())
        } else {
            Err(RenderError {
                operation,
                message: format!("unknown plot {:?}", handle),
            })
        }
    }

    fn apply_restyle(&mut self, update: &PlotUpdate) {
        for (path, value) in update.iter() {
            match value {
                Value::Array(per_trace) => {
                    for (trace, v) in self.data.iter_mut().zip(per_trace) {
                        set_path(trace, path, v.clone());
                    }
                }
                scalar => {
                    for trace in self.data.iter_mut() {
                        set_path(trace, path, scalar.clone());
                    }
                }
            }
        }
    }

    fn apply_relayout(&mut self, update: &PlotUpdate) {
        let mut layout = Value::Object(std::mem::take(&mut self.layout));
        for (path, value) in update.iter() {
            set_path(&mut layout, path, value.clone());
        }
        if let Value::Object(map) = layout {
            self.layout = map;
        }
    }
}

/// Set a dotted attribute path, creating containers on the way; `null` removes it.
fn set_path(target: &mut Value, path: &str, value: Value) {
    let mut node = target;
    let mut parts = path.split('.').peekable();
    while let Some(part) = parts.next() {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(map) = node else { return };
        if parts.peek().is_none() {
            if value.is_null() {
                map.remove(part);
            } else {
                map.insert(part.to_string(), value);
            }
            return;
        }
        node = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

#[async_trait]
impl PlotSurface for FigureDocument {
    async fn new_plot(&mut self, figure: Figure) -> Result<PlotHandle, RenderError> {
        let handle = PlotHandle(self.handle.map(|h| h.0 + 1).unwrap_or(1));
        self.data = figure.data;
        self.layout = figure.layout;
        self.config = figure.config;
        self.handle = Some(handle);
        self.observing_resize = false;
        self.revision += 1;
        Ok(handle)
    }

    async fn restyle(&mut self, handle: PlotHandle, update: &PlotUpdate) -> Result<(), RenderError> {
        self.check(handle, "restyle")?;
        self.apply_restyle(update);
        self.revision += 1;
        Ok(())
    }

    async fn relayout(&mut self, handle: PlotHandle, update: &PlotUpdate) -> Result<(), RenderError> {
        self.check(handle, "relayout")?;
        self.apply_relayout(update);
        self.revision += 1;
        Ok(())
    }

    async fn update(
        &mut self,
        handle: PlotHandle,
        data: &PlotUpdate,
        layout: &PlotUpdate,
    ) -> Result<(), RenderError> {
        self.check(handle, "update")?;
        self.apply_restyle(data);
        self.apply_relayout(layout);
        self.revision += 1;
        Ok(())
    }

    fn observe_resize(&mut self, handle: PlotHandle) {
        if self.handle == Some(handle) {
            self.observing_resize = true;
        }
    }

    async fn resize(&mut self, handle: PlotHandle) -> Result<(), RenderError> {
        self.check(handle, "resize")?;
        // the page redraws at the new size once the observer is attached
        if self.observing_resize {
            self.revision += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::renderer::RendererBinding;
    use serde_json::json;

    fn figure() -> Figure {
        Figure {
            data: vec![json!({"x": [], "name": ""}), json!({"x": [], "name": ""})],
            layout: json!({"xaxis": {"title": {"text": "old"}}})
                .as_object()
                .cloned()
                .unwrap(),
            config: Map::new(),
        }
    }

    #[tokio::test]
    async fn test_binding_attaches_resize_observer_on_create() {
        let mut binding = RendererBinding::new(FigureDocument::new());
        assert!(binding.restyle_data(&PlotUpdate::new()).await.is_err());
        assert!(!binding.surface().is_observing_resize());

        binding.create(figure()).await.unwrap();
        assert!(binding.surface().is_observing_resize());
        let before = binding.surface().revision();
        binding.notify_resize().await.unwrap();
        assert_eq!(binding.surface().revision(), before + 1);
    }

    #[tokio::test]
    async fn test_restyle_indexes_traces_and_broadcasts_scalars() {
        let mut binding = RendererBinding::new(FigureDocument::new());
        binding.create(figure()).await.unwrap();

        let update = PlotUpdate::new()
            .with("x", json!([[1, 2], [3]]))
            .with("marker.color", json!(["rgb(1,2,3)"]))
            .with("type", "scatter");
        binding.restyle_data(&update).await.unwrap();

        let traces = binding.surface().traces();
        assert_eq!(traces[0]["x"], json!([1, 2]));
        assert_eq!(traces[1]["x"], json!([3]));
        assert_eq!(traces[0]["marker"]["color"], json!("rgb(1,2,3)"));
        assert!(traces[1].get("marker").is_none());
        assert_eq!(traces[1]["type"], json!("scatter"));
    }

    #[tokio::test]
    async fn test_relayout_sets_nested_paths_and_null_removes() {
        let mut binding = RendererBinding::new(FigureDocument::new());
        binding.create(figure()).await.unwrap();

        let update = PlotUpdate::new()
            .with("yaxis.title.text", "Salinity [ PSU ]")
            .with("xaxis", Value::Null);
        binding.relayout_layout(&update).await.unwrap();

        let layout = binding.surface().layout();
        assert_eq!(layout["yaxis"]["title"]["text"], json!("Salinity [ PSU ]"));
        assert!(layout.get("xaxis").is_none());
    }

    #[tokio::test]
    async fn test_update_applies_both_and_bumps_revision_once() {
        let mut binding = RendererBinding::new(FigureDocument::new());
        binding.create(figure()).await.unwrap();
        let before = binding.surface().revision();

        binding
            .update_both(
                &PlotUpdate::new().with("name", json!(["a", "b"])),
                &PlotUpdate::new().with("plot_bgcolor", "rgb(0,0,0)"),
            )
            .await
            .unwrap();

        assert_eq!(binding.surface().revision(), before + 1);
        assert_eq!(binding.surface().traces()[1]["name"], json!("b"));
        assert_eq!(binding.surface().layout()["plot_bgcolor"], json!("rgb(0,0,0)"));
    }

    #[tokio::test]
    async fn test_stale_handle_is_rejected() {
        let mut document = FigureDocument::new();
        let first = document.new_plot(figure()).await.unwrap();
        let second = document.new_plot(figure()).await.unwrap();
        assert_ne!(first, second);
        assert!(document.restyle(first, &PlotUpdate::new()).await.is_err());
        assert!(document.restyle(second, &PlotUpdate::new()).await.is_ok());
    }
}
