// Selection model - snapshots of the controls taken at the start of each action
use crate::application::controls::{ControlId, ControlPanel};
use crate::domain::figure::{
    AxisProperties, AxisStyle, Bound, ColourProperties, HovmollerFigureSettings, RgbColour,
    TimeseriesFigureSettings,
};
use crate::domain::selection::{HovmollerSelection, TimeRange, TimeseriesSelection, parse_control_time};
use crate::domain::variable::{VariableId, Vessel, VesselVariable};
use crate::error::ControlError;

fn variable(panel: &ControlPanel, id: ControlId) -> Result<VariableId, ControlError> {
    let name = panel.text(id)?;
    Ok(VariableId::from_name(name).unwrap_or_else(|| {
        tracing::warn!("Control {} holds unknown variable '{}', treating as None", id.key(), name);
        VariableId::None
    }))
}

fn time(panel: &ControlPanel, id: ControlId) -> Result<chrono::DateTime<chrono::Utc>, ControlError> {
    let text = panel.text(id)?;
    parse_control_time(text).ok_or_else(|| ControlError::InvalidTime(text.to_string()))
}

fn axis_style(panel: &ControlPanel, grid: ControlId, reversed: ControlId) -> Result<AxisStyle, ControlError> {
    Ok(AxisStyle {
        grid: panel.flag(grid)?,
        reversed: panel.flag(reversed)?,
    })
}

/// The requested window. Ordering of start and end is left for the fetcher to judge.
pub fn read_time_range(panel: &ControlPanel) -> Result<TimeRange, ControlError> {
    Ok(TimeRange::new(
        time(panel, ControlId::StartTime)?,
        time(panel, ControlId::EndTime)?,
        panel.resolution(),
    ))
}

pub fn read_hovmoller_selection(panel: &ControlPanel) -> Result<HovmollerSelection, ControlError> {
    let mut colour = [VariableId::None; 2];
    for vessel in Vessel::ALL {
        colour[vessel.index()] = variable(panel, ControlId::ColourVariable(vessel))?;
    }
    Ok(HovmollerSelection {
        x: variable(panel, ControlId::XAxisVariable)?,
        y: variable(panel, ControlId::YAxisVariable)?,
        colour,
    })
}

pub fn read_timeseries_selection(panel: &ControlPanel) -> Result<TimeseriesSelection, ControlError> {
    let mut dependents = [None; 4];
    for (slot, dependent) in dependents.iter_mut().enumerate() {
        *dependent = VesselVariable::parse(panel.text(ControlId::DependentVariable(slot))?);
    }
    Ok(TimeseriesSelection {
        independent: variable(panel, ControlId::IndependentVariable)?,
        dependents,
    })
}

pub fn read_hovmoller_figure(panel: &ControlPanel) -> Result<HovmollerFigureSettings, ControlError> {
    Ok(HovmollerFigureSettings {
        background: RgbColour::parse_hex(panel.text(ControlId::BackgroundColour)?)?,
        x_axis: axis_style(panel, ControlId::XAxisGrid, ControlId::XAxisReversed)?,
        y_axis: axis_style(panel, ControlId::YAxisGrid, ControlId::YAxisReversed)?,
    })
}

pub fn read_colour_properties(panel: &ControlPanel) -> Result<[ColourProperties; 2], ControlError> {
    let read = |vessel: Vessel| -> Result<ColourProperties, ControlError> {
        Ok(ColourProperties {
            colourmap: panel.text(ControlId::ColourMap(vessel))?.to_string(),
            reversed: panel.flag(ControlId::ReverseColourMap(vessel))?,
            min: Bound::parse(panel.text(ControlId::ColourMin(vessel))?),
            max: Bound::parse(panel.text(ControlId::ColourMax(vessel))?),
        })
    };
    Ok([read(Vessel::Pelican)?, read(Vessel::PointSur)?])
}

pub fn read_timeseries_figure(panel: &ControlPanel) -> Result<TimeseriesFigureSettings, ControlError> {
    Ok(TimeseriesFigureSettings {
        background: RgbColour::parse_hex(panel.text(ControlId::BackgroundColour)?)?,
        independent_axis: axis_style(
            panel,
            ControlId::IndependentAxisGrid,
            ControlId::IndependentAxisReversed,
        )?,
    })
}

pub fn read_axis_properties(panel: &ControlPanel) -> Result<[AxisProperties; 4], ControlError> {
    let read = |slot: usize| -> Result<AxisProperties, ControlError> {
        Ok(AxisProperties {
            colour: RgbColour::parse_hex(panel.text(ControlId::SeriesColour(slot))?)?,
            style: axis_style(panel, ControlId::SeriesGrid(slot), ControlId::SeriesReversed(slot))?,
        })
    };
    Ok([read(0)?, read(1)?, read(2)?, read(3)?])
}
