// Presentation settings read from the controls
use crate::error::ControlError;
use std::fmt;

/// A `#rrggbb` colour as picked in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColour {
    pub const WHITE: RgbColour = RgbColour {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn parse_hex(value: &str) -> Result<Self, ControlError> {
        let hex = value.strip_prefix('#').unwrap_or(value);
        let invalid = || ControlError::InvalidColour(value.to_string());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

/// Renders in the renderer's `rgb(r,g,b)` form.
impl fmt::Display for RgbColour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Grid and direction flags for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisStyle {
    pub grid: bool,
    pub reversed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HovmollerFigureSettings {
    pub background: RgbColour,
    pub x_axis: AxisStyle,
    pub y_axis: AxisStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeseriesFigureSettings {
    pub background: RgbColour,
    pub independent_axis: AxisStyle,
}

/// Per dependent axis: trace colour plus axis style.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisProperties {
    pub colour: RgbColour,
    pub style: AxisStyle,
}

/// Colour-scale bound: explicit, or derived from the loaded data.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Bound {
    #[default]
    Auto,
    Fixed(f64),
}

impl Bound {
    /// Empty or non-numeric input means auto.
    pub fn parse(value: &str) -> Self {
        match value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Bound::Fixed(v),
            _ => Bound::Auto,
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Bound::Auto)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColourProperties {
    pub colourmap: String,
    pub reversed: bool,
    pub min: Bound,
    pub max: Bound,
}

impl ColourProperties {
    pub fn is_fully_auto(&self) -> bool {
        self.min.is_auto() && self.max.is_auto()
    }
}
