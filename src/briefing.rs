//! Headline figures shown next to the rocket.

use std::fmt;

use anyhow::Result;

use crate::geometry::ShapeModel;
use crate::parameters::ParameterMap;

#[derive(Debug, Clone, PartialEq)]
pub struct RocketSummary {
    pub length_cm: f64,
    pub diameter_cm: f64,
    pub dry_mass_g: f64,
}

impl RocketSummary {
    pub fn from_shape(shape: &ShapeModel) -> Self {
        RocketSummary {
            length_cm: shape.length_m() * 100.0,
            diameter_cm: shape.max_radius_m() * 2.0 * 100.0,
            dry_mass_g: shape.dry_mass_kg() * 1000.0,
        }
    }
}

impl fmt::Display for RocketSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Length:   {:.1} cm", self.length_cm)?;
        writeln!(f, "Diameter: {:.1} cm", self.diameter_cm)?;
        write!(f, "Weight:   {:.2} g", self.dry_mass_g)
    }
}

/// Results of the flight simulation, passed through as given.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightSummary {
    pub flight_time_s: f64,
    pub max_altitude_m: f64,
    pub max_velocity_m_s: f64,
    pub launch_rod_velocity_m_s: Option<f64>,
}

impl FlightSummary {
    /// Reads the `flight` section of a rocket description.
    pub fn from_params(params: &ParameterMap) -> Result<Self> {
        let launch_rod_velocity_m_s = if params.has("launch_rod_velocity") {
            Some(params.get_f64("launch_rod_velocity")?)
        } else {
            None
        };

        Ok(FlightSummary {
            flight_time_s: params.get_f64("flight_time")?,
            max_altitude_m: params.get_f64("max_altitude")?,
            max_velocity_m_s: params.get_f64("max_velocity")?,
            launch_rod_velocity_m_s,
        })
    }
}

impl fmt::Display for FlightSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Flight Time:  {:.1} s", self.flight_time_s)?;
        writeln!(f, "Max Altitude: {:.1} m", self.max_altitude_m)?;
        write!(f, "Max Velocity: {:.1} m/s", self.max_velocity_m_s)?;
        if let Some(v) = self.launch_rod_velocity_m_s {
            write!(f, "\nRod Clear:    {v:.1} m/s")?;
        }
        Ok(())
    }
}
