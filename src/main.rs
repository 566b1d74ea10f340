// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod error;
mod infrastructure;
mod presentation;

use axum::{Router, routing::get};
use chrono::Utc;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::application::fetcher::DataFetcher;
use crate::application::hovmoller_controller::HovmollerController;
use crate::application::preferences::PreferenceStore;
use crate::application::timeseries_controller::TimeseriesController;
use crate::infrastructure::config::load_plotter_config;
use crate::infrastructure::figure_document::FigureDocument;
use crate::infrastructure::http_data_source::HttpDataSource;
use crate::infrastructure::preference_file::PreferenceFile;
use crate::presentation::app_state::ViewState;
use crate::presentation::handlers::{health_check, timeseries_routes, view_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_plotter_config()?;
    let limits = config.data.load_limits()?;

    // Data boundary and preference storage (infrastructure layer)
    let source = Arc::new(HttpDataSource::new(
        config.data.hovmoller_url.clone(),
        config.data.timeseries_url.clone(),
    ));
    let preferences = PreferenceStore::new(Arc::new(PreferenceFile::new(&config.preferences.path)));
    let fetcher = DataFetcher::new(source, limits);

    // One controller per view, each drawing into its own figure (application layer)
    let now = Utc::now();
    let hovmoller =
        HovmollerController::initialise(FigureDocument::new(), fetcher.clone(), preferences.clone(), now).await?;
    let timeseries = TimeseriesController::initialise(FigureDocument::new(), fetcher, preferences, now).await?;

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .nest(
            "/hovmoller",
            view_routes::<HovmollerController<FigureDocument>>().with_state(ViewState::new(hovmoller)),
        )
        .nest(
            "/timeseries",
            timeseries_routes::<FigureDocument>().with_state(ViewState::new(timeseries)),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server.listen;
    tracing::info!("Starting shipboard-plotter on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
