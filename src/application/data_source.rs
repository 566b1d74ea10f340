// Data boundary - request/response contracts and the trait the fetcher talks to
use crate::error::TransportError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HovmollerRequest {
    pub x_variable: String,
    pub y_variable: String,
    #[serde(rename = "data_PE")]
    pub data_pe: String,
    #[serde(rename = "data_PS")]
    pub data_ps: String,
    pub start_time: String,
    pub end_time: String,
    pub time_resolution: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesRequest {
    pub independent_variable: String,
    pub data_1: String,
    pub data_2: String,
    pub data_3: String,
    pub data_4: String,
    pub start_time: String,
    pub end_time: String,
    pub time_resolution: u32,
}

/// Raw columns per vessel. Missing and `null` columns both decode to `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HovmollerResponse {
    #[serde(rename = "PE_x_data", default)]
    pub pe_x: Option<Vec<Value>>,
    #[serde(rename = "PE_y_data", default)]
    pub pe_y: Option<Vec<Value>>,
    #[serde(rename = "PE_c_data", default)]
    pub pe_c: Option<Vec<Value>>,
    #[serde(rename = "PS_x_data", default)]
    pub ps_x: Option<Vec<Value>>,
    #[serde(rename = "PS_y_data", default)]
    pub ps_y: Option<Vec<Value>>,
    #[serde(rename = "PS_c_data", default)]
    pub ps_c: Option<Vec<Value>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeseriesResponse {
    #[serde(rename = "Pelican_independent_values", default)]
    pub pelican_independent: Option<Vec<Value>>,
    #[serde(rename = "PointSur_independent_values", default)]
    pub point_sur_independent: Option<Vec<Value>>,
    #[serde(rename = "data_values_1", alias = "data_1_values", default)]
    pub data_1: Option<Vec<Value>>,
    #[serde(rename = "data_values_2", alias = "data_2_values", default)]
    pub data_2: Option<Vec<Value>>,
    #[serde(rename = "data_values_3", alias = "data_3_values", default)]
    pub data_3: Option<Vec<Value>>,
    #[serde(rename = "data_values_4", alias = "data_4_values", default)]
    pub data_4: Option<Vec<Value>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch x/y/colour columns for both vessels
    async fn load_hovmoller(&self, request: &HovmollerRequest) -> Result<HovmollerResponse, TransportError>;

    /// Fetch the independent columns per vessel and up to four dependent columns
    async fn load_timeseries(&self, request: &TimeseriesRequest) -> Result<TimeseriesResponse, TransportError>;
}
