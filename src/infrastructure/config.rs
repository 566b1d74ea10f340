use crate::application::fetcher::LoadLimits;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

const CONFIG_FILE: &str = "config/plotter";
const ENV_PREFIX: &str = "PLOTTER";

#[derive(Debug, Deserialize, Clone)]
pub struct PlotterConfig {
    pub server: ServerSettings,
    pub data: DataSettings,
    pub preferences: PreferenceSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub listen: SocketAddr,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataSettings {
    pub hovmoller_url: String,
    pub timeseries_url: String,
    pub max_datapoints: i64,
    /// RFC 3339; loads never reach before this instant.
    pub cruise_start: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PreferenceSettings {
    pub path: PathBuf,
}

impl DataSettings {
    pub fn load_limits(&self) -> anyhow::Result<LoadLimits> {
        let cruise_start = DateTime::parse_from_rfc3339(&self.cruise_start)
            .with_context(|| format!("invalid data.cruise_start '{}'", self.cruise_start))?
            .with_timezone(&Utc);
        Ok(LoadLimits {
            max_datapoints: self.max_datapoints,
            cruise_start,
        })
    }
}

/// `config/plotter.toml` overridden by `PLOTTER__SECTION__KEY` variables.
pub fn load_plotter_config() -> anyhow::Result<PlotterConfig> {
    load_config_from(CONFIG_FILE)
}

pub fn load_config_from(name: &str) -> anyhow::Result<PlotterConfig> {
    let settings = config::Config::builder()
        .set_default("server.listen", "0.0.0.0:8080")?
        .set_default("data.max_datapoints", 10_000)?
        .set_default("data.cruise_start", "2020-06-25T17:00:00Z")?
        .set_default("preferences.path", "preferences.toml")?
        .add_source(config::File::with_name(name).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
