// Variable catalog and vessel identities
use std::fmt;

/// Every quantity the plotters know how to request, plus the `None` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VariableId {
    #[default]
    None,
    Time,
    InertialPeriods,
    Latitude,
    Longitude,
    Salinity,
    Temperature,
    Chlorophyll,
    USlabModel,
    VSlabModel,
    AirTemperature,
    AirPressure,
    RelativeHumidity,
    WindSpeed,
    WindDirection,
    WindU,
    WindV,
}

/// Variables both vessels stream, in selector order.
pub const VESSEL_VARIABLES: [VariableId; 13] = [
    VariableId::Time,
    VariableId::InertialPeriods,
    VariableId::Latitude,
    VariableId::Longitude,
    VariableId::Salinity,
    VariableId::Temperature,
    VariableId::AirTemperature,
    VariableId::AirPressure,
    VariableId::RelativeHumidity,
    VariableId::WindSpeed,
    VariableId::WindDirection,
    VariableId::WindU,
    VariableId::WindV,
];

const ALL_VARIABLES: [VariableId; 17] = [
    VariableId::None,
    VariableId::Time,
    VariableId::InertialPeriods,
    VariableId::Latitude,
    VariableId::Longitude,
    VariableId::Salinity,
    VariableId::Temperature,
    VariableId::Chlorophyll,
    VariableId::USlabModel,
    VariableId::VSlabModel,
    VariableId::AirTemperature,
    VariableId::AirPressure,
    VariableId::RelativeHumidity,
    VariableId::WindSpeed,
    VariableId::WindDirection,
    VariableId::WindU,
    VariableId::WindV,
];

impl VariableId {
    /// Name used in selectors and on the wire.
    pub fn name(self) -> &'static str {
        match self {
            VariableId::None => "None",
            VariableId::Time => "Time",
            VariableId::InertialPeriods => "Inertial Periods",
            VariableId::Latitude => "Latitude",
            VariableId::Longitude => "Longitude",
            VariableId::Salinity => "Salinity",
            VariableId::Temperature => "Temperature",
            VariableId::Chlorophyll => "Chlorophyll",
            VariableId::USlabModel => "U - Slab Model",
            VariableId::VSlabModel => "V - Slab Model",
            VariableId::AirTemperature => "Air Temperature",
            VariableId::AirPressure => "Air Pressure",
            VariableId::RelativeHumidity => "Relative Humidity",
            VariableId::WindSpeed => "Wind Speed",
            VariableId::WindDirection => "Wind Direction",
            VariableId::WindU => "Wind u",
            VariableId::WindV => "Wind v",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ALL_VARIABLES.iter().copied().find(|v| v.name() == name)
    }

    /// Axis/colourbar label with units. Empty for `None`.
    pub fn label(self) -> &'static str {
        match self {
            VariableId::None => "",
            VariableId::Time => "Time",
            VariableId::InertialPeriods => "Time [ Inertial Periods ]",
            VariableId::Latitude => "Latitude [ \u{00B0}N ]",
            VariableId::Longitude => "Longitude [ \u{00B0}E ]",
            VariableId::Salinity => "Salinity [ PSU ]",
            VariableId::Temperature => "Temperature [ \u{00B0}C ]",
            VariableId::Chlorophyll => "Chlorophyll [ \u{03BC}g/L ]",
            VariableId::USlabModel => "U [ m<sup>2</sup>/s ]",
            VariableId::VSlabModel => "V [ m<sup>2</sup>/s ]",
            VariableId::AirTemperature => "Air Temperature [ \u{00B0}C ]",
            VariableId::AirPressure => "Air Pressure [ mbar ]",
            VariableId::RelativeHumidity => "Relative Humidity [ % ]",
            VariableId::WindSpeed => "Wind Speed [ m/s ]",
            VariableId::WindDirection => "Wind Direction [ \u{00B0} ]",
            VariableId::WindU => "Wind u [ m/s ]",
            VariableId::WindV => "Wind v [ m/s ]",
        }
    }

    pub fn is_none(self) -> bool {
        self == VariableId::None
    }

    /// Time cannot drive a colour scale.
    pub fn is_colour_variable(self) -> bool {
        self != VariableId::Time
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vessel {
    Pelican,
    PointSur,
}

impl Vessel {
    pub const ALL: [Vessel; 2] = [Vessel::Pelican, Vessel::PointSur];

    pub fn code(self) -> &'static str {
        match self {
            Vessel::Pelican => "PE",
            Vessel::PointSur => "PS",
        }
    }

    /// Slot index in the Hovmoller registry.
    pub fn index(self) -> usize {
        match self {
            Vessel::Pelican => 0,
            Vessel::PointSur => 1,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Vessel::ALL.into_iter().find(|v| v.code() == code)
    }
}

/// A time-series dependent choice: which vessel streams which variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VesselVariable {
    pub vessel: Vessel,
    pub variable: VariableId,
}

impl VesselVariable {
    pub fn new(vessel: Vessel, variable: VariableId) -> Self {
        Self { vessel, variable }
    }

    /// Parse the selector form `"PE Salinity"`. `"None"` and anything
    /// unrecognised yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let (code, name) = value.split_once(' ')?;
        let vessel = Vessel::from_code(code)?;
        let variable = VariableId::from_name(name)?;
        if variable.is_none() {
            return None;
        }
        Some(Self { vessel, variable })
    }

    /// Selector/wire form, also used as the series name.
    pub fn key(&self) -> String {
        format!("{} {}", self.vessel.code(), self.variable.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_names_are_not_in_the_catalog() {
        assert_eq!(VariableId::from_name("Sea State"), None);
        assert_eq!(VariableId::from_name(""), None);
        assert_eq!(VariableId::from_name("None").map(VariableId::label), Some(""));
        assert_eq!(VariableId::Salinity.label(), "Salinity [ PSU ]");
    }

    #[test]
    fn test_every_variable_round_trips_through_its_name() {
        for variable in ALL_VARIABLES {
            assert_eq!(VariableId::from_name(variable.name()), Some(variable));
        }
        assert_eq!(VariableId::None.label(), "");
    }

    #[test]
    fn test_parse_vessel_variable() {
        assert_eq!(
            VesselVariable::parse("PS Wind Speed"),
            Some(VesselVariable::new(Vessel::PointSur, VariableId::WindSpeed))
        );
        assert_eq!(VesselVariable::parse("None"), None);
        assert_eq!(VesselVariable::parse("PE None"), None);
        assert_eq!(VesselVariable::parse("XX Salinity"), None);

        let choice = VesselVariable::new(Vessel::Pelican, VariableId::Temperature);
        assert_eq!(choice.key(), "PE Temperature");
        assert_eq!(VesselVariable::parse(&choice.key()), Some(choice));
    }
}
