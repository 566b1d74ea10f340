// Hovmoller adapter: two scatter traces, one per vessel, coloured by a third variable
use super::colour::resolve_colour_ranges;
use super::{autorange, base_config, into_map};
use crate::application::registry::HovmollerRegistry;
use crate::application::renderer::{Figure, PlotUpdate};
use crate::domain::figure::{ColourProperties, HovmollerFigureSettings};
use crate::domain::selection::HovmollerSelection;
use crate::domain::series::{numbers_json, samples_json};
use crate::domain::variable::Vessel;
use serde_json::{Value, json};

const HOVER_TEMPLATE: &str = "%{xaxis.title.text}: %{x}<br>\
%{yaxis.title.text}: %{y}<br>\
%{fullData.name}: %{marker.color}<extra></extra>";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HovmollerLabels {
    pub x: String,
    pub y: String,
    /// Colourbar titles, vessel A then B.
    pub colour: [String; 2],
}

pub struct HovmollerAdapter;

impl HovmollerAdapter {
    pub fn initial_figure() -> Figure {
        let trace = || {
            json!({
                "x": [],
                "y": [],
                "name": "",
                "type": "scatter",
                "mode": "markers",
                "marker": {"color": [], "colorscale": "YlGnBu"},
                "showlegend": false,
                "hovertemplate": HOVER_TEMPLATE
            })
        };
        Figure {
            data: vec![trace(), trace()],
            layout: into_map(json!({
                "title": {"text": "", "font": {"color": "white"}},
                "margin": {"l": 70, "r": 70, "b": 70, "t": 50, "pad": 4}
            })),
            config: base_config("hovmoller"),
        }
    }

    /// Per-trace x/y/colour arrays straight from the slots.
    pub fn compute_data_update(registry: &HovmollerRegistry) -> PlotUpdate {
        let [a, b] = registry.slots();
        PlotUpdate::new()
            .with("x", json!([samples_json(&a.x), samples_json(&b.x)]))
            .with("y", json!([samples_json(&a.y), samples_json(&b.y)]))
            .with("marker.color", json!([numbers_json(&a.colour), numbers_json(&b.colour)]))
            .with("name", json!([a.label, b.label]))
    }

    /// Colour scales (data) and axis styling (layout). Auto bounds are
    /// derived from the registry on every call.
    pub fn compute_axes_update(
        settings: &HovmollerFigureSettings,
        colours: &[ColourProperties; 2],
        registry: &HovmollerRegistry,
        labels: &HovmollerLabels,
    ) -> (PlotUpdate, PlotUpdate) {
        let ranges = resolve_colour_ranges(colours, registry);
        let colourbars: Vec<Value> = Vessel::ALL
            .iter()
            .map(|&vessel| colourbar(vessel, &labels.colour[vessel.index()]))
            .collect();

        let data = PlotUpdate::new()
            .with("marker.colorscale", json!([colours[0].colourmap, colours[1].colourmap]))
            .with("marker.cmin", json!([ranges[0].min, ranges[1].min]))
            .with("marker.cmax", json!([ranges[0].max, ranges[1].max]))
            .with("marker.reversescale", json!([colours[0].reversed, colours[1].reversed]))
            .with(
                "marker.showscale",
                json!([!colourbars[0].is_null(), !colourbars[1].is_null()]),
            )
            .with("marker.colorbar", Value::Array(colourbars));

        let layout = PlotUpdate::new()
            .with("plot_bgcolor", settings.background.to_string())
            .with("xaxis.showgrid", settings.x_axis.grid)
            .with("xaxis.autorange", autorange(settings.x_axis.reversed))
            .with("yaxis.showgrid", settings.y_axis.grid)
            .with("yaxis.autorange", autorange(settings.y_axis.reversed));

        (data, layout)
    }

    pub fn compute_labels(selection: &HovmollerSelection) -> HovmollerLabels {
        HovmollerLabels {
            x: selection.x.label().to_string(),
            y: selection.y.label().to_string(),
            colour: Vessel::ALL.map(|v| selection.colour_for(v).label().to_string()),
        }
    }

    pub fn label_update(labels: &HovmollerLabels) -> PlotUpdate {
        PlotUpdate::new()
            .with("xaxis.title.text", labels.x.as_str())
            .with("yaxis.title.text", labels.y.as_str())
    }
}

/// Vessel A's bar sits in the top half, vessel B's in the bottom half.
fn colourbar(vessel: Vessel, title: &str) -> Value {
    if title.is_empty() {
        return Value::Null;
    }
    let (y, anchor) = match vessel {
        Vessel::Pelican => (1, "top"),
        Vessel::PointSur => (0, "bottom"),
    };
    json!({
        "title": {"text": title, "side": "right"},
        "len": 0.5,
        "y": y,
        "yanchor": anchor
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::figure::{AxisStyle, Bound, RgbColour};
    use crate::domain::series::{Sample, ScatterSeries};
    use crate::domain::variable::VariableId;

    fn settings() -> HovmollerFigureSettings {
        HovmollerFigureSettings {
            background: RgbColour { r: 10, g: 20, b: 30 },
            x_axis: AxisStyle { grid: true, reversed: false },
            y_axis: AxisStyle { grid: false, reversed: true },
        }
    }

    fn colours(min: Bound) -> [ColourProperties; 2] {
        let props = ColourProperties {
            colourmap: "Viridis".into(),
            reversed: false,
            min,
            max: Bound::Auto,
        };
        [props.clone(), props]
    }

    fn loaded_registry() -> HovmollerRegistry {
        let mut registry = HovmollerRegistry::new();
        registry.replace_all([
            ScatterSeries {
                variable: VariableId::Salinity,
                label: "Salinity".into(),
                x: vec![Some(Sample::Number(-124.0)), Some(Sample::Number(-124.1))],
                y: vec![Some(Sample::Number(44.0)), None],
                colour: vec![Some(33.0), Some(34.0)],
            },
            ScatterSeries::default(),
        ]);
        registry
    }

    #[test]
    fn test_data_update_keeps_slot_order() {
        let update = HovmollerAdapter::compute_data_update(&loaded_registry());
        assert_eq!(update.get("x").unwrap(), &json!([[-124.0, -124.1], []]));
        assert_eq!(update.get("y").unwrap(), &json!([[44.0, null], []]));
        assert_eq!(update.get("marker.color").unwrap(), &json!([[33.0, 34.0], []]));
        assert_eq!(update.get("name").unwrap(), &json!(["Salinity", ""]));
    }

    #[test]
    fn test_axes_update_layout() {
        let (_, layout) = HovmollerAdapter::compute_axes_update(
            &settings(),
            &colours(Bound::Auto),
            &loaded_registry(),
            &HovmollerLabels::default(),
        );
        assert_eq!(layout.get("plot_bgcolor").unwrap(), &json!("rgb(10,20,30)"));
        assert_eq!(layout.get("xaxis.autorange").unwrap(), &json!(true));
        assert_eq!(layout.get("yaxis.autorange").unwrap(), &json!("reversed"));
        assert_eq!(layout.get("yaxis.showgrid").unwrap(), &json!(false));
    }

    #[test]
    fn test_axes_update_colour_scales() {
        let selection = HovmollerSelection {
            x: VariableId::Longitude,
            y: VariableId::Latitude,
            colour: [VariableId::Salinity, VariableId::None],
        };
        let labels = HovmollerAdapter::compute_labels(&selection);
        let (data, _) = HovmollerAdapter::compute_axes_update(
            &settings(),
            &colours(Bound::Auto),
            &loaded_registry(),
            &labels,
        );
        // different variables in the two slots: PE gets its own range, PS has none
        assert_eq!(data.get("marker.cmin").unwrap(), &json!([33.0, null]));
        assert_eq!(data.get("marker.cmax").unwrap(), &json!([34.0, null]));
        assert_eq!(data.get("marker.showscale").unwrap(), &json!([true, false]));
        let bars = data.get("marker.colorbar").unwrap();
        assert_eq!(bars[0]["title"]["text"], json!("Salinity [ PSU ]"));
        assert_eq!(bars[0]["yanchor"], json!("top"));
        assert!(bars[1].is_null());

        let (data, _) = HovmollerAdapter::compute_axes_update(
            &settings(),
            &colours(Bound::Fixed(30.0)),
            &loaded_registry(),
            &labels,
        );
        assert_eq!(data.get("marker.cmin").unwrap(), &json!([30.0, 30.0]));
    }

    #[test]
    fn test_labels_for_unset_axes_are_empty() {
        let labels = HovmollerAdapter::compute_labels(&HovmollerSelection::default());
        assert_eq!(labels, HovmollerLabels::default());
        let update = HovmollerAdapter::label_update(&labels);
        assert_eq!(update.get("xaxis.title.text").unwrap(), &json!(""));
    }
}
