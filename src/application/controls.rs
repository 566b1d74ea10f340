// Typed registry of the UI controls each plot view exposes
use crate::domain::figure::RgbColour;
use crate::domain::selection::{Resolution, TimeRange, format_control_time};
use crate::domain::variable::{VESSEL_VARIABLES, VariableId, Vessel, VesselVariable};
use crate::error::ControlError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default trace colours for the four time-series slots.
const SERIES_COLOURS: [&str; 4] = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728"];
const DEFAULT_COLOURMAP: &str = "YlGnBu";
const DEFAULT_BACKGROUND: &str = "#ffffff";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Hovmoller,
    Timeseries,
}

impl View {
    /// Hours of data shown by default when the page opens.
    pub fn default_window_hours(self) -> i64 {
        match self {
            View::Hovmoller => 4,
            View::Timeseries => 2,
        }
    }
}

/// Every control either view can own. Dependent slots are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    StartTime,
    EndTime,
    Resolution(Resolution),
    BackgroundColour,
    XAxisVariable,
    YAxisVariable,
    XAxisGrid,
    XAxisReversed,
    YAxisGrid,
    YAxisReversed,
    ColourVariable(Vessel),
    ColourMap(Vessel),
    ColourMin(Vessel),
    ColourMax(Vessel),
    ReverseColourMap(Vessel),
    IndependentVariable,
    IndependentAxisGrid,
    IndependentAxisReversed,
    DependentVariable(usize),
    SeriesColour(usize),
    SeriesGrid(usize),
    SeriesReversed(usize),
}

impl ControlId {
    /// Stable key, used by the HTTP surface and as the preference key.
    pub fn key(&self) -> String {
        match *self {
            ControlId::StartTime => "start-time".into(),
            ControlId::EndTime => "end-time".into(),
            ControlId::Resolution(r) => format!("{}min-resolution", r.minutes()),
            ControlId::BackgroundColour => "figure-background-colour".into(),
            ControlId::XAxisVariable => "x-axis-variable-select".into(),
            ControlId::YAxisVariable => "y-axis-variable-select".into(),
            ControlId::XAxisGrid => "figure-x-axis-grid".into(),
            ControlId::XAxisReversed => "figure-x-axis-reversed".into(),
            ControlId::YAxisGrid => "figure-y-axis-grid".into(),
            ControlId::YAxisReversed => "figure-y-axis-reversed".into(),
            ControlId::ColourVariable(v) => format!("data-variable-{}-select", v.code()),
            ControlId::ColourMap(v) => format!("data-{}-colour-map", v.code()),
            ControlId::ColourMin(v) => format!("data-{}-min", v.code()),
            ControlId::ColourMax(v) => format!("data-{}-max", v.code()),
            ControlId::ReverseColourMap(v) => format!("data-{}-reverse-colour-map", v.code()),
            ControlId::IndependentVariable => "independent-variable-select".into(),
            ControlId::IndependentAxisGrid => "figure-independent-axis-grid".into(),
            ControlId::IndependentAxisReversed => "figure-independent-axis-reversed".into(),
            ControlId::DependentVariable(i) => format!("dependent-variable-{}-select", i + 1),
            ControlId::SeriesColour(i) => format!("data-{}-colour", i + 1),
            ControlId::SeriesGrid(i) => format!("data-{}-grid", i + 1),
            ControlId::SeriesReversed(i) => format!("data-{}-reversed", i + 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlValue {
    Flag(bool),
    Text(String),
}

impl ControlValue {
    fn text(value: &str) -> Self {
        ControlValue::Text(value.to_string())
    }

    fn kind(&self) -> &'static str {
        match self {
            ControlValue::Flag(_) => "boolean",
            ControlValue::Text(_) => "string",
        }
    }
}

/// Choices offered by each variable selector of a view, in display order.
pub fn selector_options(view: View) -> BTreeMap<String, Vec<String>> {
    let none = || VariableId::None.name().to_string();
    let axis: Vec<String> = std::iter::once(none())
        .chain(VESSEL_VARIABLES.iter().map(|v| v.name().to_string()))
        .collect();

    let mut options = BTreeMap::new();
    match view {
        View::Hovmoller => {
            let colour: Vec<String> = std::iter::once(none())
                .chain(
                    VESSEL_VARIABLES
                        .iter()
                        .filter(|v| v.is_colour_variable())
                        .map(|v| v.name().to_string()),
                )
                .collect();
            options.insert(ControlId::XAxisVariable.key(), axis.clone());
            options.insert(ControlId::YAxisVariable.key(), axis);
            for vessel in Vessel::ALL {
                options.insert(ControlId::ColourVariable(vessel).key(), colour.clone());
            }
        }
        View::Timeseries => {
            let dependent: Vec<String> = std::iter::once(none())
                .chain(Vessel::ALL.iter().flat_map(|&vessel| {
                    VESSEL_VARIABLES
                        .iter()
                        .map(move |&variable| VesselVariable::new(vessel, variable).key())
                }))
                .collect();
            options.insert(ControlId::IndependentVariable.key(), axis);
            for slot in 0..SERIES_COLOURS.len() {
                options.insert(ControlId::DependentVariable(slot).key(), dependent.clone());
            }
        }
    }
    options
}

struct ControlEntry {
    id: ControlId,
    value: ControlValue,
    persisted: bool,
}

/// Current value of every control of one view. The set of controls is
/// fixed when the panel is built; values are typed by their defaults.
pub struct ControlPanel {
    view: View,
    entries: Vec<ControlEntry>,
}

impl ControlPanel {
    pub fn new(view: View, now: DateTime<Utc>) -> Self {
        let window = TimeRange::trailing(now, view.default_window_hours());
        let mut panel = Self {
            view,
            entries: Vec::new(),
        };

        panel.add(ControlId::StartTime, ControlValue::Text(format_control_time(&window.start)), false);
        panel.add(ControlId::EndTime, ControlValue::Text(format_control_time(&window.end)), false);
        panel.add(ControlId::BackgroundColour, ControlValue::text(DEFAULT_BACKGROUND), true);

        match view {
            View::Hovmoller => {
                panel.add(ControlId::XAxisVariable, ControlValue::text("None"), true);
                panel.add(ControlId::YAxisVariable, ControlValue::text("None"), true);
                panel.add(ControlId::XAxisGrid, ControlValue::Flag(true), true);
                panel.add(ControlId::XAxisReversed, ControlValue::Flag(false), true);
                panel.add(ControlId::YAxisGrid, ControlValue::Flag(true), true);
                panel.add(ControlId::YAxisReversed, ControlValue::Flag(false), true);
                for vessel in Vessel::ALL {
                    panel.add(ControlId::ColourVariable(vessel), ControlValue::text("None"), true);
                    panel.add(ControlId::ColourMap(vessel), ControlValue::text(DEFAULT_COLOURMAP), true);
                    panel.add(ControlId::ColourMin(vessel), ControlValue::text(""), true);
                    panel.add(ControlId::ColourMax(vessel), ControlValue::text(""), true);
                    panel.add(ControlId::ReverseColourMap(vessel), ControlValue::Flag(false), true);
                }
            }
            View::Timeseries => {
                panel.add(ControlId::IndependentVariable, ControlValue::text("Time"), true);
                panel.add(ControlId::IndependentAxisGrid, ControlValue::Flag(true), true);
                panel.add(ControlId::IndependentAxisReversed, ControlValue::Flag(false), true);
                for (slot, colour) in SERIES_COLOURS.iter().enumerate() {
                    panel.add(ControlId::DependentVariable(slot), ControlValue::text("None"), true);
                    panel.add(ControlId::SeriesColour(slot), ControlValue::text(colour), true);
                    panel.add(ControlId::SeriesGrid(slot), ControlValue::Flag(false), true);
                    panel.add(ControlId::SeriesReversed(slot), ControlValue::Flag(false), true);
                }
            }
        }

        for resolution in Resolution::ALL {
            let checked = resolution == Resolution::default();
            panel.add(ControlId::Resolution(resolution), ControlValue::Flag(checked), true);
        }

        panel
    }

    fn add(&mut self, id: ControlId, value: ControlValue, persisted: bool) {
        self.entries.push(ControlEntry {
            id,
            value,
            persisted,
        });
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Resolve a key to one of this panel's controls.
    pub fn lookup(&self, key: &str) -> Result<ControlId, ControlError> {
        self.entries
            .iter()
            .map(|e| e.id)
            .find(|id| id.key() == key)
            .ok_or_else(|| ControlError::UnknownControl(key.to_string()))
    }

    fn entry(&self, id: ControlId) -> Result<&ControlEntry, ControlError> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| ControlError::UnknownControl(id.key()))
    }

    pub fn value(&self, id: ControlId) -> Result<&ControlValue, ControlError> {
        self.entry(id).map(|e| &e.value)
    }

    pub fn text(&self, id: ControlId) -> Result<&str, ControlError> {
        match self.value(id)? {
            ControlValue::Text(text) => Ok(text),
            ControlValue::Flag(_) => Err(ControlError::WrongKind {
                id: id.key(),
                expected: "string",
            }),
        }
    }

    pub fn flag(&self, id: ControlId) -> Result<bool, ControlError> {
        match self.value(id)? {
            ControlValue::Flag(flag) => Ok(*flag),
            ControlValue::Text(_) => Err(ControlError::WrongKind {
                id: id.key(),
                expected: "boolean",
            }),
        }
    }

    pub fn set(&mut self, id: ControlId, value: ControlValue) -> Result<(), ControlError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| ControlError::UnknownControl(id.key()))?;
        if std::mem::discriminant(&entry.value) != std::mem::discriminant(&value) {
            return Err(ControlError::WrongKind {
                id: id.key(),
                expected: entry.value.kind(),
            });
        }
        if let (ControlId::BackgroundColour | ControlId::SeriesColour(_), ControlValue::Text(text)) = (id, &value) {
            RgbColour::parse_hex(text)?;
        }
        let checked = match (id, &value) {
            (ControlId::Resolution(r), ControlValue::Flag(true)) => Some(r),
            _ => None,
        };
        entry.value = value;

        // resolution flags behave as a radio group
        if let Some(checked) = checked {
            for other in self.entries.iter_mut() {
                if let ControlId::Resolution(r) = other.id {
                    if r != checked {
                        other.value = ControlValue::Flag(false);
                    }
                }
            }
        }
        Ok(())
    }

    /// The checked resolution, falling back to the default when none is.
    pub fn resolution(&self) -> Resolution {
        Resolution::ALL
            .into_iter()
            .find(|&r| matches!(self.flag(ControlId::Resolution(r)), Ok(true)))
            .unwrap_or_default()
    }

    /// Controls whose values survive across sessions.
    pub fn persisted_ids(&self) -> Vec<ControlId> {
        self.entries
            .iter()
            .filter(|e| e.persisted)
            .map(|e| e.id)
            .collect()
    }

    pub fn snapshot(&self) -> Vec<(String, ControlValue)> {
        self.entries
            .iter()
            .map(|e| (e.id.key(), e.value.clone()))
            .collect()
    }
}
