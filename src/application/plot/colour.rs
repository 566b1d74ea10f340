// Colour-scale bounds for the Hovmoller slots
use crate::application::registry::HovmollerRegistry;
use crate::domain::figure::{Bound, ColourProperties};
use crate::domain::series::{null_aware_max, null_aware_min};

/// Resolved bounds for one slot. `None` means there is no data to derive an
/// auto bound from and the renderer should pick its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColourRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn resolve(bound: Bound, auto: impl FnOnce() -> f64) -> Option<f64> {
    match bound {
        Bound::Fixed(value) => Some(value),
        Bound::Auto => finite(auto()),
    }
}

/// Both slots share one range over their union when they show the same
/// variable and no bound is set on either; otherwise each slot stands alone.
/// Always computed from the registry as it is now.
pub fn resolve_colour_ranges(
    properties: &[ColourProperties; 2],
    registry: &HovmollerRegistry,
) -> [ColourRange; 2] {
    let [a, b] = registry.slots();
    let shared = a.variable == b.variable && properties.iter().all(ColourProperties::is_fully_auto);

    if shared {
        let union = || a.colour.iter().chain(b.colour.iter());
        let range = ColourRange {
            min: finite(null_aware_min(union())),
            max: finite(null_aware_max(union())),
        };
        return [range, range];
    }

    let independent = |props: &ColourProperties, values: &[Option<f64>]| ColourRange {
        min: resolve(props.min, || null_aware_min(values)),
        max: resolve(props.max, || null_aware_max(values)),
    };
    [
        independent(&properties[0], &a.colour),
        independent(&properties[1], &b.colour),
    ]
}
