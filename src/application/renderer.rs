// Renderer binding - the only path from the plot adapter to the charting surface
use crate::error::RenderError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

/// Complete declarative figure handed to the surface on creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Map<String, Value>,
    pub config: Map<String, Value>,
}

/// Attribute path (dotted for nested attributes) mapped to a value.
///
/// For data updates an array value addresses traces by index and a scalar
/// applies to every trace; `null` resets the attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PlotUpdate(Map<String, Value>);

impl PlotUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(path.into(), value.into());
        self
    }

    pub fn with(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(path, value);
        self
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.0.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotHandle(pub u64);

/// The external charting surface. Calls must not overlap; `&mut self`
/// makes every caller await one operation before starting the next.
#[async_trait]
pub trait PlotSurface: Send + Sync {
    async fn new_plot(&mut self, figure: Figure) -> Result<PlotHandle, RenderError>;

    async fn restyle(&mut self, handle: PlotHandle, update: &PlotUpdate) -> Result<(), RenderError>;

    async fn relayout(&mut self, handle: PlotHandle, update: &PlotUpdate) -> Result<(), RenderError>;

    async fn update(
        &mut self,
        handle: PlotHandle,
        data: &PlotUpdate,
        layout: &PlotUpdate,
    ) -> Result<(), RenderError>;

    /// Start delivering container resizes for `handle`.
    fn observe_resize(&mut self, handle: PlotHandle);

    async fn resize(&mut self, handle: PlotHandle) -> Result<(), RenderError>;
}

pub struct RendererBinding<S> {
    surface: S,
    handle: Option<PlotHandle>,
}

impl<S: PlotSurface> RendererBinding<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            handle: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn handle(&self, operation: &'static str) -> Result<PlotHandle, RenderError> {
        self.handle.ok_or_else(|| RenderError {
            operation,
            message: "plot has not been created".into(),
        })
    }

    /// Create the plot and attach the resize observer once it exists.
    pub async fn create(&mut self, figure: Figure) -> Result<PlotHandle, RenderError> {
        let handle = self.surface.new_plot(figure).await?;
        self.surface.observe_resize(handle);
        self.handle = Some(handle);
        tracing::debug!("Created plot {:?}", handle);
        Ok(handle)
    }

    pub async fn restyle_data(&mut self, update: &PlotUpdate) -> Result<(), RenderError> {
        let handle = self.handle("restyle")?;
        self.surface.restyle(handle, update).await
    }

    pub async fn relayout_layout(&mut self, update: &PlotUpdate) -> Result<(), RenderError> {
        let handle = self.handle("relayout")?;
        self.surface.relayout(handle, update).await
    }

    pub async fn update_both(&mut self, data: &PlotUpdate, layout: &PlotUpdate) -> Result<(), RenderError> {
        let handle = self.handle("update")?;
        self.surface.update(handle, data, layout).await
    }

    /// Forward a container resize to the surface.
    pub async fn notify_resize(&mut self) -> Result<(), RenderError> {
        let handle = self.handle("resize")?;
        self.surface.resize(handle).await
    }
}
