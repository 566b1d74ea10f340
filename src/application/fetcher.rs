// Data fetcher - validates the requested volume, issues one request and types the response
use crate::application::data_source::{DataSource, HovmollerRequest, TimeseriesRequest};
use crate::domain::selection::{HovmollerSelection, TimeRange, TimeseriesSelection, format_control_time};
use crate::domain::series::{Sample, ScatterSeries, Series};
use crate::domain::variable::{VariableId, Vessel, VesselVariable};
use crate::error::{LoadError, TransportError, ValidationError};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_MAX_DATAPOINTS: i64 = 10_000;
/// 2020-06-25 17:00 UTC
pub const DEFAULT_CRUISE_START_SECS: i64 = 1_593_104_400;

const OFFSET_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%#z", "%Y-%m-%d %H:%M:%S%.f%#z"];
const NAIVE_TIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone)]
pub struct LoadLimits {
    pub max_datapoints: i64,
    /// Nothing is recorded before this instant.
    pub cruise_start: DateTime<Utc>,
}

impl Default for LoadLimits {
    fn default() -> Self {
        Self {
            max_datapoints: DEFAULT_MAX_DATAPOINTS,
            cruise_start: DateTime::from_timestamp(DEFAULT_CRUISE_START_SECS, 0).unwrap_or_default(),
        }
    }
}

/// Datapoints a request would return: columns times whole resolution steps
/// in the window clamped to [cruise start, now]. Negative when inverted.
pub fn estimate_datapoints(columns: usize, range: &TimeRange, limits: &LoadLimits, now: DateTime<Utc>) -> i64 {
    let start = range.start.max(limits.cruise_start);
    let end = range.end.min(now);
    let span_ms = (end - start).num_milliseconds() as f64;
    let steps = (span_ms / 60_000.0 / range.resolution.minutes() as f64).trunc() as i64;
    columns as i64 * steps
}

pub fn check_estimate(estimate: i64, maximum: i64) -> Result<(), ValidationError> {
    if estimate < 0 {
        return Err(ValidationError::InvertedRange { estimate });
    }
    if estimate == 0 {
        return Err(ValidationError::EmptyRange);
    }
    if estimate > maximum {
        return Err(ValidationError::TooManyPoints { estimate, maximum });
    }
    Ok(())
}

#[derive(Clone)]
pub struct DataFetcher {
    source: Arc<dyn DataSource>,
    limits: LoadLimits,
}

impl DataFetcher {
    pub fn new(source: Arc<dyn DataSource>, limits: LoadLimits) -> Self {
        Self { source, limits }
    }

    fn validate(&self, columns: usize, range: &TimeRange, now: DateTime<Utc>) -> Result<(), ValidationError> {
        let estimate = estimate_datapoints(columns, range, &self.limits, now);
        tracing::debug!(
            "Estimated {} datapoints ({} columns, {} min resolution)",
            estimate,
            columns,
            range.resolution.minutes()
        );
        check_estimate(estimate, self.limits.max_datapoints)
    }

    pub async fn load_hovmoller(
        &self,
        selection: &HovmollerSelection,
        range: &TimeRange,
        now: DateTime<Utc>,
    ) -> Result<[ScatterSeries; 2], LoadError> {
        if !selection.has_axes() {
            return Err(ValidationError::MissingAxis.into());
        }
        self.validate(selection.requested_columns(), range, now)?;

        let request = HovmollerRequest {
            x_variable: selection.x.name().to_string(),
            y_variable: selection.y.name().to_string(),
            data_pe: selection.colour_for(Vessel::Pelican).name().to_string(),
            data_ps: selection.colour_for(Vessel::PointSur).name().to_string(),
            start_time: format_control_time(&range.start),
            end_time: format_control_time(&range.end),
            time_resolution: range.resolution.minutes(),
        };
        tracing::debug!("Requesting Hovmoller data: {:?}", request);
        let response = self.source.load_hovmoller(&request).await?;
        if let Some(error) = response.error {
            return Err(TransportError::Remote(error).into());
        }

        let pelican = scatter_series(
            selection.colour_for(Vessel::Pelican),
            response.pe_x,
            response.pe_y,
            response.pe_c,
        )?;
        let point_sur = scatter_series(
            selection.colour_for(Vessel::PointSur),
            response.ps_x,
            response.ps_y,
            response.ps_c,
        )?;
        tracing::info!(
            "Loaded Hovmoller data: {} PE points, {} PS points",
            pelican.colour.len(),
            point_sur.colour.len()
        );
        Ok([pelican, point_sur])
    }

    pub async fn load_timeseries(
        &self,
        selection: &TimeseriesSelection,
        range: &TimeRange,
        now: DateTime<Utc>,
    ) -> Result<[Series; 4], LoadError> {
        if !selection.has_axes() {
            return Err(ValidationError::MissingAxis.into());
        }
        self.validate(selection.requested_columns(), range, now)?;

        let key = |slot: usize| {
            selection.dependents[slot]
                .map(|d| d.key())
                .unwrap_or_else(|| VariableId::None.name().to_string())
        };
        let request = TimeseriesRequest {
            independent_variable: selection.independent.name().to_string(),
            data_1: key(0),
            data_2: key(1),
            data_3: key(2),
            data_4: key(3),
            start_time: format_control_time(&range.start),
            end_time: format_control_time(&range.end),
            time_resolution: range.resolution.minutes(),
        };
        tracing::debug!("Requesting time-series data: {:?}", request);
        let response = self.source.load_timeseries(&request).await?;
        if let Some(error) = response.error {
            return Err(TransportError::Remote(error).into());
        }

        let pelican = samples(response.pelican_independent.as_deref())?;
        let point_sur = samples(response.point_sur_independent.as_deref())?;
        let columns = [response.data_1, response.data_2, response.data_3, response.data_4];

        let mut series: [Series; 4] = Default::default();
        for (slot, column) in columns.into_iter().enumerate() {
            if let Some(source) = selection.dependents[slot] {
                let independent = match source.vessel {
                    Vessel::Pelican => pelican.clone(),
                    Vessel::PointSur => point_sur.clone(),
                };
                series[slot] = dependent_series(source, independent, column)?;
            }
        }
        tracing::info!(
            "Loaded time-series data: {:?} points per slot",
            series.iter().map(|s| s.dependent.len()).collect::<Vec<_>>()
        );
        Ok(series)
    }
}

fn scatter_series(
    variable: VariableId,
    x: Option<Vec<Value>>,
    y: Option<Vec<Value>>,
    colour: Option<Vec<Value>>,
) -> Result<ScatterSeries, TransportError> {
    // an unselected vessel stays empty whatever the endpoint sent
    if variable.is_none() {
        return Ok(ScatterSeries::default());
    }
    Ok(ScatterSeries {
        variable,
        label: variable.name().to_string(),
        x: samples(x.as_deref())?,
        y: samples(y.as_deref())?,
        colour: numbers(colour.as_deref())?,
    })
}

fn dependent_series(
    source: VesselVariable,
    independent: Vec<Option<Sample>>,
    column: Option<Vec<Value>>,
) -> Result<Series, TransportError> {
    Ok(Series {
        source: Some(source),
        label: source.key(),
        independent,
        dependent: numbers(column.as_deref())?,
    })
}

fn samples(column: Option<&[Value]>) -> Result<Vec<Option<Sample>>, TransportError> {
    column.unwrap_or_default().iter().map(parse_sample).collect()
}

fn numbers(column: Option<&[Value]>) -> Result<Vec<Option<f64>>, TransportError> {
    column.unwrap_or_default().iter().map(parse_number).collect()
}

fn parse_time(text: &str) -> Option<NaiveDateTime> {
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Some(time.naive_utc());
    }
    for format in OFFSET_TIME_FORMATS {
        if let Ok(time) = DateTime::parse_from_str(text, format) {
            return Some(time.naive_utc());
        }
    }
    NAIVE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

/// Numbers, numeric strings and timestamp strings; `null` or blank is a missing sample.
pub fn parse_sample(value: &Value) -> Result<Option<Sample>, TransportError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => number
            .as_f64()
            .map(|v| Some(Sample::Number(v)))
            .ok_or_else(|| TransportError::Decode(format!("unrepresentable number {}", number))),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            if let Ok(v) = text.parse::<f64>() {
                return Ok(Some(Sample::Number(v)));
            }
            parse_time(text)
                .map(|t| Some(Sample::Time(t)))
                .ok_or_else(|| TransportError::Decode(format!("unrecognised value '{}'", text)))
        }
        other => Err(TransportError::Decode(format!("unexpected value {}", other))),
    }
}

/// Like [`parse_sample`], with timestamps taken as epoch milliseconds.
pub fn parse_number(value: &Value) -> Result<Option<f64>, TransportError> {
    Ok(parse_sample(value)?.map(|sample| match sample {
        Sample::Number(v) => v,
        Sample::Time(t) => t.and_utc().timestamp_millis() as f64,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::StubDataSource;
    use crate::domain::selection::Resolution;
    use chrono::{Duration, NaiveDate, TimeZone};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 8, 1, 0, 0, 0).unwrap()
    }

    fn hovmoller_selection() -> HovmollerSelection {
        HovmollerSelection {
            x: VariableId::Longitude,
            y: VariableId::Latitude,
            colour: [VariableId::Salinity, VariableId::None],
        }
    }

    fn timeseries_selection() -> TimeseriesSelection {
        TimeseriesSelection {
            independent: VariableId::Time,
            dependents: [
                Some(VesselVariable::new(Vessel::Pelican, VariableId::Salinity)),
                None,
                Some(VesselVariable::new(Vessel::PointSur, VariableId::Temperature)),
                None,
            ],
        }
    }

    fn fetcher(source: &Arc<StubDataSource>) -> DataFetcher {
        DataFetcher::new(source.clone(), LoadLimits::default())
    }

    #[test]
    fn test_default_cruise_start() {
        assert_eq!(
            LoadLimits::default().cruise_start,
            Utc.with_ymd_and_hms(2020, 6, 25, 17, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_estimate_clamps_to_cruise_start_and_now() {
        let limits = LoadLimits::default();
        let range = TimeRange::new(
            limits.cruise_start - Duration::days(3),
            limits.cruise_start + Duration::hours(1),
            Resolution::FiveMinutes,
        );
        assert_eq!(estimate_datapoints(3, &range, &limits, now()), 36);

        let future = TimeRange::new(now() - Duration::minutes(10), now() + Duration::days(1), Resolution::OneMinute);
        assert_eq!(estimate_datapoints(2, &future, &limits, now()), 20);
    }

    #[test]
    fn test_estimate_truncates_partial_steps() {
        let limits = LoadLimits::default();
        let range = TimeRange::new(now() - Duration::minutes(14), now(), Resolution::FifteenMinutes);
        assert_eq!(estimate_datapoints(4, &range, &limits, now()), 0);
    }

    #[tokio::test]
    async fn test_inverted_range_is_rejected_before_fetching() {
        let source = Arc::new(StubDataSource::default());
        let range = TimeRange::new(now(), now() - Duration::hours(1), Resolution::OneMinute);

        let err = fetcher(&source)
            .load_hovmoller(&hovmoller_selection(), &range, now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Validation(ValidationError::InvertedRange { estimate: -180 })
        ));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_dependent_variables_is_an_empty_range() {
        let source = Arc::new(StubDataSource::default());
        let mut selection = hovmoller_selection();
        selection.colour = [VariableId::None, VariableId::None];
        let range = TimeRange::trailing(now(), 2);

        let err = fetcher(&source)
            .load_hovmoller(&selection, &range, now())
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Validation(ValidationError::EmptyRange)));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_too_many_points_reports_the_estimate() {
        let source = Arc::new(StubDataSource::default());
        let mut selection = timeseries_selection();
        selection.dependents[1] = Some(VesselVariable::new(Vessel::Pelican, VariableId::WindSpeed));
        selection.dependents[3] = Some(VesselVariable::new(Vessel::PointSur, VariableId::WindSpeed));
        let range = TimeRange::new(now() - Duration::days(30), now(), Resolution::OneMinute);

        let err = fetcher(&source)
            .load_timeseries(&selection, &range, now())
            .await
            .unwrap_err();
        match err {
            LoadError::Validation(ValidationError::TooManyPoints { estimate, maximum }) => {
                assert_eq!(estimate, 4 * 30 * 24 * 60);
                assert_eq!(maximum, DEFAULT_MAX_DATAPOINTS);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_axis_is_rejected() {
        let source = Arc::new(StubDataSource::default());
        let mut selection = hovmoller_selection();
        selection.y = VariableId::None;
        let err = fetcher(&source)
            .load_hovmoller(&selection, &TimeRange::trailing(now(), 1), now())
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Validation(ValidationError::MissingAxis)));

        let mut selection = timeseries_selection();
        selection.independent = VariableId::None;
        let err = fetcher(&source)
            .load_timeseries(&selection, &TimeRange::trailing(now(), 1), now())
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Validation(ValidationError::MissingAxis)));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_hovmoller_normalization() {
        let source = Arc::new(StubDataSource::default());
        source.set_hovmoller(json!({
            "PE_x_data": ["-124.5012", -124.4, null],
            "PE_y_data": [44.1, "44.2", 44.3],
            "PE_c_data": ["33.1", null, 33.4],
            "PS_x_data": [1, 2, 3],
            "PS_y_data": [1, 2, 3],
            "PS_c_data": [9, 9, 9]
        }));

        let [pelican, point_sur] = fetcher(&source)
            .load_hovmoller(&hovmoller_selection(), &TimeRange::trailing(now(), 1), now())
            .await
            .unwrap();

        assert_eq!(pelican.label, "Salinity");
        assert_eq!(pelican.variable, VariableId::Salinity);
        assert_eq!(pelican.x, vec![Some(Sample::Number(-124.5012)), Some(Sample::Number(-124.4)), None]);
        assert_eq!(pelican.colour, vec![Some(33.1), None, Some(33.4)]);
        // PS colour is None: its columns are dropped
        assert_eq!(point_sur, ScatterSeries::default());

        let request = source.last_hovmoller_request().unwrap();
        assert_eq!(request.data_pe, "Salinity");
        assert_eq!(request.data_ps, "None");
        assert_eq!(request.end_time, "2020-08-01T00:00");
    }

    #[tokio::test]
    async fn test_timeseries_slots_follow_their_vessel() {
        let source = Arc::new(StubDataSource::default());
        source.set_timeseries(json!({
            "Pelican_independent_values": ["2020-06-25 17:00:00+00", "2020-06-25 17:01:00+00"],
            "PointSur_independent_values": ["2020-06-25 17:06", "2020-06-25 17:07", "2020-06-25 17:08"],
            "data_values_1": [30.5, 30.6],
            "data_values_2": [1, 2, 3],
            "data_values_3": [12.0, null, 12.2]
        }));

        let series = fetcher(&source)
            .load_timeseries(&timeseries_selection(), &TimeRange::trailing(now(), 1), now())
            .await
            .unwrap();

        let at = |h, m| {
            Some(Sample::Time(
                NaiveDate::from_ymd_opt(2020, 6, 25).unwrap().and_hms_opt(h, m, 0).unwrap(),
            ))
        };
        assert_eq!(series[0].label, "PE Salinity");
        assert_eq!(series[0].independent, vec![at(17, 0), at(17, 1)]);
        assert_eq!(series[2].label, "PS Temperature");
        assert_eq!(series[2].independent.len(), 3);
        assert_eq!(series[2].dependent, vec![Some(12.0), None, Some(12.2)]);
        // slot 2 was not selected, so the stray column is ignored
        assert_eq!(series[1], Series::default());
        assert_eq!(series[3], Series::default());

        let request = source.last_timeseries_request().unwrap();
        assert_eq!(request.data_1, "PE Salinity");
        assert_eq!(request.data_2, "None");
    }

    #[tokio::test]
    async fn test_remote_error_is_a_transport_error() {
        let source = Arc::new(StubDataSource::default());
        source.set_hovmoller(json!({"error": "unable to open database sunrise"}));
        let err = fetcher(&source)
            .load_hovmoller(&hovmoller_selection(), &TimeRange::trailing(now(), 1), now())
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Transport(TransportError::Remote(_))));
    }

    #[tokio::test]
    async fn test_undecodable_value_is_a_transport_error() {
        let source = Arc::new(StubDataSource::default());
        source.set_hovmoller(json!({"PE_x_data": [true], "PE_y_data": [], "PE_c_data": []}));
        let err = fetcher(&source)
            .load_hovmoller(&hovmoller_selection(), &TimeRange::trailing(now(), 1), now())
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Transport(TransportError::Decode(_))));
    }

    #[test]
    fn test_parse_number_accepts_timestamps() {
        assert_eq!(parse_number(&json!("1970-01-01 00:00:01")).unwrap(), Some(1000.0));
        assert_eq!(parse_number(&json!("  ")).unwrap(), None);
        assert!(parse_number(&json!("n/a")).is_err());
    }
}
