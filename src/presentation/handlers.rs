// HTTP request handlers
use crate::application::controls::{ControlPanel, ControlValue, selector_options};
use crate::application::plot_view::{PendingLoad, PlotView};
use crate::application::renderer::PlotSurface;
use crate::application::timeseries_controller::TimeseriesController;
use crate::error::{ControlError, LoadError, PreferenceError, RenderError};
use crate::presentation::app_state::SharedView;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Failure of a view action, carried to the client as `{"error": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Display) -> Self {
        Self {
            status,
            message: error.to_string(),
        }
    }

    fn busy() -> Self {
        Self::new(StatusCode::CONFLICT, "a load is already in progress")
    }
}

impl From<LoadError> for ApiError {
    fn from(e: LoadError) -> Self {
        let status = match &e {
            LoadError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LoadError::Transport(_) => StatusCode::BAD_GATEWAY,
            LoadError::Control(_) => StatusCode::BAD_REQUEST,
            LoadError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e)
    }
}

impl From<ControlError> for ApiError {
    fn from(e: ControlError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, e)
    }
}

impl From<RenderError> for ApiError {
    fn from(e: RenderError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, e)
    }
}

impl From<PreferenceError> for ApiError {
    fn from(e: PreferenceError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, e)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("Request failed ({}): {}", self.status, self.message);
        } else {
            tracing::warn!("Request rejected ({}): {}", self.status, self.message);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

fn controls_json(panel: &ControlPanel) -> Map<String, Value> {
    panel
        .snapshot()
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                ControlValue::Flag(flag) => Value::Bool(flag),
                ControlValue::Text(text) => Value::String(text),
            };
            (key, value)
        })
        .collect()
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn get_controls<V: PlotView>(State(state): State<SharedView<V>>) -> Json<Map<String, Value>> {
    let view = state.lock().await;
    Json(controls_json(view.panel()))
}

pub async fn get_options<V: PlotView>(
    State(state): State<SharedView<V>>,
) -> Json<BTreeMap<String, Vec<String>>> {
    let view = state.lock().await.view();
    Json(selector_options(view))
}

/// Set controls by key. Unknown keys reject the whole request before any
/// value changes.
pub async fn put_controls<V: PlotView>(
    State(state): State<SharedView<V>>,
    Json(values): Json<BTreeMap<String, ControlValue>>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let mut view = state.lock().await;
    for key in values.keys() {
        view.panel().lookup(key)?;
    }
    for (key, value) in values {
        view.set_control(&key, value)?;
    }
    Ok(Json(controls_json(view.panel())))
}

/// The view is only locked to snapshot the controls and to apply the
/// result; other actions on it proceed while the fetch is in flight.
pub async fn load_data<V: PlotView>(State(state): State<SharedView<V>>) -> Result<Json<Value>, ApiError> {
    let Some(_loading) = state.begin_load() else {
        return Err(ApiError::busy());
    };
    let pending = state.lock().await.prepare_load()?;
    let loaded = pending.fetch(Utc::now()).await?;

    let mut view = state.lock().await;
    view.finish_load(loaded).await?;
    Ok(Json(view.figure()?))
}

pub async fn apply_changes<V: PlotView>(State(state): State<SharedView<V>>) -> Result<Json<Value>, ApiError> {
    let mut view = state.lock().await;
    view.apply_changes().await?;
    Ok(Json(view.figure()?))
}

/// The page reports that the plot container changed size.
pub async fn resize<V: PlotView>(State(state): State<SharedView<V>>) -> Result<StatusCode, ApiError> {
    state.lock().await.resize().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn save_preferences<V: PlotView>(State(state): State<SharedView<V>>) -> Result<StatusCode, ApiError> {
    state.lock().await.save_preferences()?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_preferences<V: PlotView>(State(state): State<SharedView<V>>) -> Result<StatusCode, ApiError> {
    state.lock().await.clear_preferences()?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn figure<V: PlotView>(State(state): State<SharedView<V>>) -> Result<Json<Value>, ApiError> {
    let view = state.lock().await;
    Ok(Json(view.figure()?))
}

pub async fn switch_axes<S: PlotSurface + Serialize>(
    State(state): State<SharedView<TimeseriesController<S>>>,
) -> Result<Json<Value>, ApiError> {
    let mut view = state.lock().await;
    view.switch_axes().await?;
    Ok(Json(view.figure()?))
}

/// Routes every plot view offers, relative to the view's prefix.
pub fn view_routes<V: PlotView + 'static>() -> Router<SharedView<V>> {
    Router::new()
        .route("/controls", get(get_controls::<V>).put(put_controls::<V>))
        .route("/options", get(get_options::<V>))
        .route("/load", post(load_data::<V>))
        .route("/apply", post(apply_changes::<V>))
        .route("/resize", post(resize::<V>))
        .route(
            "/preferences",
            post(save_preferences::<V>).delete(clear_preferences::<V>),
        )
        .route("/figure", get(figure::<V>))
}

pub fn timeseries_routes<S: PlotSurface + Serialize + 'static>() -> Router<SharedView<TimeseriesController<S>>> {
    view_routes::<TimeseriesController<S>>().route("/switch-axes", post(switch_axes::<S>))
}
