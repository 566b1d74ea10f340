// Time-series adapter: four series on stacked axes sharing one independent axis
use super::{autorange, base_config, into_map};
use crate::application::registry::TimeseriesRegistry;
use crate::application::renderer::{Figure, PlotUpdate};
use crate::domain::figure::{AxisProperties, TimeseriesFigureSettings};
use crate::domain::selection::TimeseriesSelection;
use crate::domain::series::{numbers_json, samples_json};
use serde_json::{Map, Value, json};

const LEGEND_BACKGROUND: &str = "rgba(255,255,255,0.5)";

/// Where one dependent axis sits; the side pair depends on the orientation.
struct DependentPlacement {
    free: bool,
    overlays: bool,
    position: f64,
    second_side: bool,
}

const PLACEMENTS: [DependentPlacement; 4] = [
    DependentPlacement { free: false, overlays: false, position: 0.0, second_side: false },
    DependentPlacement { free: false, overlays: true, position: 1.0, second_side: true },
    DependentPlacement { free: true, overlays: true, position: 0.05, second_side: false },
    DependentPlacement { free: true, overlays: true, position: 0.95, second_side: true },
];

/// Axis titles currently on display, by role rather than by physical axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeseriesLabels {
    pub independent: String,
    pub dependents: [String; 4],
}

/// Names of the physical axes for one orientation.
struct Orientation {
    independent: &'static str,
    dependent: &'static str,
    anchor: &'static str,
    overlay: &'static str,
    sides: [&'static str; 2],
}

impl Orientation {
    fn of(independent_axis_x: bool) -> Self {
        if independent_axis_x {
            Orientation {
                independent: "x",
                dependent: "y",
                anchor: "x",
                overlay: "y",
                sides: ["left", "right"],
            }
        } else {
            Orientation {
                independent: "y",
                dependent: "x",
                anchor: "y",
                overlay: "x",
                sides: ["bottom", "top"],
            }
        }
    }

    /// Layout key of the n-th (zero-based) axis in a direction: `xaxis`, `xaxis2`, ...
    fn layout_key(direction: &str, n: usize) -> String {
        if n == 0 {
            format!("{}axis", direction)
        } else {
            format!("{}axis{}", direction, n + 1)
        }
    }

    /// Trace reference of the n-th axis: `x`, `x2`, ...
    fn trace_ref(direction: &str, n: usize) -> String {
        if n == 0 {
            direction.to_string()
        } else {
            format!("{}{}", direction, n + 1)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeseriesAdapter {
    independent_axis_x: bool,
}

impl Default for TimeseriesAdapter {
    fn default() -> Self {
        Self {
            independent_axis_x: true,
        }
    }
}

impl TimeseriesAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn independent_axis_x(&self) -> bool {
        self.independent_axis_x
    }

    pub fn switch_axes(&mut self) {
        self.independent_axis_x = !self.independent_axis_x;
        tracing::debug!(
            "Independent axis is now {}",
            if self.independent_axis_x { "x" } else { "y" }
        );
    }

    pub fn initial_figure(&self) -> Figure {
        let data = (0..4)
            .map(|n| {
                json!({
                    "x": [],
                    "y": [],
                    "name": "",
                    "type": "scatter",
                    "xaxis": "x",
                    "yaxis": Orientation::trace_ref("y", n)
                })
            })
            .collect();
        let mut layout = into_map(json!({
            "title": {"text": "", "font": {"color": "white"}},
            "margin": {"l": 70, "r": 70, "b": 70, "t": 50, "pad": 4},
            "xaxis": {"domain": [0.1, 0.9]}
        }));
        let orientation = Orientation::of(true);
        for (n, placement) in PLACEMENTS.iter().enumerate() {
            layout.insert(
                Orientation::layout_key("y", n),
                Value::Object(placement_object(&orientation, placement)),
            );
        }
        layout.insert("legend".into(), legend(true));
        Figure {
            data,
            layout,
            config: base_config("timeseries"),
        }
    }

    /// Series arrays under the current mapping; x and y swap wholesale with the axes.
    pub fn compute_data_update(&self, registry: &TimeseriesRegistry) -> PlotUpdate {
        let slots = registry.slots();
        let independent: Vec<Value> = slots.iter().map(|s| samples_json(&s.independent)).collect();
        let dependent: Vec<Value> = slots.iter().map(|s| numbers_json(&s.dependent)).collect();
        let names: Vec<Value> = slots.iter().map(|s| Value::String(s.label.clone())).collect();

        let orientation = Orientation::of(self.independent_axis_x);
        let independent_refs: Vec<Value> = (0..4).map(|_| json!(orientation.independent)).collect();
        let dependent_refs: Vec<Value> = (0..4)
            .map(|n| json!(Orientation::trace_ref(orientation.dependent, n)))
            .collect();

        let (x, y, x_refs, y_refs) = if self.independent_axis_x {
            (independent, dependent, independent_refs, dependent_refs)
        } else {
            (dependent, independent, dependent_refs, independent_refs)
        };
        PlotUpdate::new()
            .with("x", x)
            .with("y", y)
            .with("name", names)
            .with("xaxis", x_refs)
            .with("yaxis", y_refs)
    }

    /// Series colours alone, for the recolour step of a load.
    pub fn compute_colour_update(properties: &[AxisProperties; 4]) -> PlotUpdate {
        let colours: Vec<Value> = properties.iter().map(|p| json!(p.colour.to_string())).collect();
        PlotUpdate::new()
            .with("marker.color", colours.clone())
            .with("line.color", colours)
    }

    /// Series colours plus every axis object. Axis objects are replaced
    /// whole, so titles must be reapplied afterwards; axes unused in the
    /// current orientation are removed.
    pub fn compute_axes_update(
        &self,
        settings: &TimeseriesFigureSettings,
        properties: &[AxisProperties; 4],
    ) -> (PlotUpdate, PlotUpdate) {
        let data = Self::compute_colour_update(properties);
        let orientation = Orientation::of(self.independent_axis_x);

        let mut layout = PlotUpdate::new().with("plot_bgcolor", settings.background.to_string());
        layout.set(
            Orientation::layout_key(orientation.independent, 0),
            json!({
                "color": "black",
                "domain": [0.1, 0.9],
                "showgrid": settings.independent_axis.grid,
                "gridwidth": 2,
                "showline": true,
                "automargin": true,
                "autorange": autorange(settings.independent_axis.reversed)
            }),
        );
        for n in 1..4 {
            layout.set(Orientation::layout_key(orientation.independent, n), Value::Null);
        }

        for (n, (placement, props)) in PLACEMENTS.iter().zip(properties).enumerate() {
            let mut axis = placement_object(&orientation, placement);
            axis.insert("color".into(), json!(props.colour.to_string()));
            axis.insert("showgrid".into(), json!(props.style.grid));
            axis.insert("gridwidth".into(), json!(2));
            axis.insert("showline".into(), json!(true));
            axis.insert("automargin".into(), json!(true));
            axis.insert("autorange".into(), autorange(props.style.reversed));
            layout.set(Orientation::layout_key(orientation.dependent, n), Value::Object(axis));
        }

        (data, layout)
    }

    /// Independent label from the catalog; each dependent labelled with its
    /// vessel code and catalog label. Unset slots get an empty label.
    pub fn compute_labels(selection: &TimeseriesSelection) -> TimeseriesLabels {
        TimeseriesLabels {
            independent: selection.independent.label().to_string(),
            dependents: selection.dependents.map(|d| {
                d.map(|d| format!("{} {}", d.vessel.code(), d.variable.label()))
                    .unwrap_or_default()
            }),
        }
    }

    pub fn label_update(&self, labels: &TimeseriesLabels) -> PlotUpdate {
        let orientation = Orientation::of(self.independent_axis_x);
        let mut update = PlotUpdate::new().with(
            format!("{}.title.text", Orientation::layout_key(orientation.independent, 0)),
            labels.independent.as_str(),
        );
        for (n, label) in labels.dependents.iter().enumerate() {
            update.set(
                format!("{}.title.text", Orientation::layout_key(orientation.dependent, n)),
                label.as_str(),
            );
        }
        update
    }

    pub fn legend_update(&self) -> PlotUpdate {
        PlotUpdate::new().with("legend", legend(self.independent_axis_x))
    }
}

fn placement_object(orientation: &Orientation, placement: &DependentPlacement) -> Map<String, Value> {
    let mut axis = Map::new();
    let anchor = if placement.free { "free" } else { orientation.anchor };
    axis.insert("anchor".into(), json!(anchor));
    if placement.overlays {
        axis.insert("overlaying".into(), json!(orientation.overlay));
    }
    axis.insert("position".into(), json!(placement.position));
    axis.insert(
        "side".into(),
        json!(orientation.sides[usize::from(placement.second_side)]),
    );
    axis
}

fn legend(independent_axis_x: bool) -> Value {
    let (x, y) = if independent_axis_x { (0.1, 1.0) } else { (0.0, 0.9) };
    json!({
        "x": x,
        "y": y,
        "xanchor": "left",
        "yanchor": "top",
        "bgcolor": LEGEND_BACKGROUND
    })
}
