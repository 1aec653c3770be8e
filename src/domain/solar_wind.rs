// Solar wind domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw solar wind parameters as reported by an upstream source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarWindData {
    /// IMF north-south component (nT)
    pub bz: f64,
    /// Total IMF strength (nT)
    pub bt: f64,
    /// Solar wind speed (km/s)
    pub speed: f64,
    /// Proton density (p/cm³)
    pub density: f64,
    /// Disturbance storm time index (nT)
    pub dst: f64,
}

impl SolarWindData {
    pub fn is_finite(&self) -> bool {
        [self.bz, self.bt, self.speed, self.density, self.dst]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// One timestamped point of the live chart feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    pub time: DateTime<Utc>,
    pub bz: f64,
    pub speed: f64,
    pub density: f64,
}

impl Reading {
    pub fn new(time: DateTime<Utc>, bz: f64, speed: f64, density: f64) -> Self {
        Self {
            time,
            bz,
            speed,
            density,
        }
    }

    pub fn from_solar_wind(time: DateTime<Utc>, data: &SolarWindData) -> Self {
        Self::new(time, data.bz, data.speed, data.density)
    }
}

/// Hourly point for the simulated solar wind parameter chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarWindParameterPoint {
    /// Hour label, e.g. "07:00"
    pub time: String,
    pub bz: f64,
    pub speed: f64,
    pub density: f64,
}
