// Series data held by the dataset slots
use super::variable::{VariableId, VesselVariable};
use chrono::NaiveDateTime;
use serde_json::Value;

/// Timestamp format handed to the renderer for time-valued samples.
pub const SAMPLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One value on an axis: either a timestamp or a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Time(NaiveDateTime),
    Number(f64),
}

impl Sample {
    /// Renderer form: timestamps as text, non-finite numbers as `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Sample::Time(time) => Value::String(time.format(SAMPLE_TIME_FORMAT).to_string()),
            Sample::Number(value) => number_json(*value),
        }
    }
}

pub fn number_json(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

pub fn samples_json(samples: &[Option<Sample>]) -> Value {
    Value::Array(
        samples
            .iter()
            .map(|s| s.as_ref().map(Sample::to_json).unwrap_or(Value::Null))
            .collect(),
    )
}

pub fn numbers_json(values: &[Option<f64>]) -> Value {
    Value::Array(
        values
            .iter()
            .map(|v| v.map(number_json).unwrap_or(Value::Null))
            .collect(),
    )
}

/// A time-series slot: one dependent stream against its vessel's independent values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    pub source: Option<VesselVariable>,
    pub label: String,
    pub independent: Vec<Option<Sample>>,
    pub dependent: Vec<Option<f64>>,
}

/// A Hovmoller slot: one vessel's x/y positions coloured by `variable`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScatterSeries {
    pub variable: VariableId,
    pub label: String,
    pub x: Vec<Option<Sample>>,
    pub y: Vec<Option<Sample>>,
    pub colour: Vec<Option<f64>>,
}

/// Smallest non-null value, `+inf` when there is none.
pub fn null_aware_min<'a>(values: impl IntoIterator<Item = &'a Option<f64>>) -> f64 {
    values
        .into_iter()
        .flatten()
        .fold(f64::INFINITY, |m, &v| if v < m { v } else { m })
}

/// Largest non-null value, `-inf` when there is none.
pub fn null_aware_max<'a>(values: impl IntoIterator<Item = &'a Option<f64>>) -> f64 {
    values
        .into_iter()
        .flatten()
        .fold(f64::NEG_INFINITY, |m, &v| if v > m { v } else { m })
}
