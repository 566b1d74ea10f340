// Plot adapter - turns selections, slots and settings into renderer updates
pub mod colour;
pub mod hovmoller;
pub mod timeseries;

use serde_json::{Map, Value, json};

/// The renderer's autorange value for a normal or reversed axis.
fn autorange(reversed: bool) -> Value {
    if reversed { json!("reversed") } else { json!(true) }
}

fn base_config(filename: &str) -> Map<String, Value> {
    let config = json!({
        "editable": true,
        "modeBarButtonsToRemove": ["lasso2d", "select2d"],
        "toImageButtonOptions": {"filename": filename},
        "scrollZoom": true,
        "displaylogo": false
    });
    into_map(config)
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
