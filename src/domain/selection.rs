// Selection snapshots taken from the controls
use super::variable::{VariableId, Vessel, VesselVariable};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Format of the start/end time controls (minute precision, UTC).
pub const TIME_CONTROL_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Resolution {
    #[default]
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
}

impl Resolution {
    pub const ALL: [Resolution; 3] = [
        Resolution::OneMinute,
        Resolution::FiveMinutes,
        Resolution::FifteenMinutes,
    ];

    pub fn minutes(self) -> u32 {
        match self {
            Resolution::OneMinute => 1,
            Resolution::FiveMinutes => 5,
            Resolution::FifteenMinutes => 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub resolution: Resolution,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, resolution: Resolution) -> Self {
        Self {
            start,
            end,
            resolution,
        }
    }

    /// A window ending at `now` reaching `hours` back.
    pub fn trailing(now: DateTime<Utc>, hours: i64) -> Self {
        Self::new(now - chrono::Duration::hours(hours), now, Resolution::default())
    }
}

pub fn format_control_time(time: &DateTime<Utc>) -> String {
    time.format(TIME_CONTROL_FORMAT).to_string()
}

pub fn parse_control_time(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIME_CONTROL_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HovmollerSelection {
    pub x: VariableId,
    pub y: VariableId,
    pub colour: [VariableId; 2],
}

impl HovmollerSelection {
    pub fn colour_for(&self, vessel: Vessel) -> VariableId {
        self.colour[vessel.index()]
    }

    pub fn has_axes(&self) -> bool {
        !self.x.is_none() && !self.y.is_none()
    }

    /// Each vessel with a colour variable contributes its x, y and colour columns.
    pub fn requested_columns(&self) -> usize {
        self.colour.iter().filter(|c| !c.is_none()).count() * 3
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeseriesSelection {
    pub independent: VariableId,
    pub dependents: [Option<VesselVariable>; 4],
}

impl TimeseriesSelection {
    pub fn has_axes(&self) -> bool {
        !self.independent.is_none()
    }

    pub fn requested_columns(&self) -> usize {
        self.dependents.iter().flatten().count()
    }
}
