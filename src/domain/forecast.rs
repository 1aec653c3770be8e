// Kp-index forecast domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::solar_wind::SolarWindData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Geoeffectiveness {
    Low,
    Moderate,
    High,
    Severe,
    Extreme,
}

/// Forecast as returned by the external model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpForecast {
    pub kp_index: f64,
    pub geoeffectiveness: Geoeffectiveness,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aurora_visibility_forecast: Option<String>,
}

/// A forecast stamped with the time it was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpPrediction {
    #[serde(flatten)]
    pub forecast: KpForecast,
    pub timestamp: DateTime<Utc>,
}

/// Hourly point of the Kp trend chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpTrendPoint {
    /// Hour label, e.g. "07:00"
    pub date: String,
    pub kp_index: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum SubmissionError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("Model Data URI is required.")]
    MissingModelUri,
}

/// User-submitted forecast request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    #[serde(flatten)]
    pub solar_wind: SolarWindData,
    pub model_data_uri: String,
}

impl ForecastRequest {
    const LIMITS: [(&'static str, f64, f64); 5] = [
        ("bz", -100.0, 100.0),
        ("bt", 0.0, 100.0),
        ("speed", 100.0, 2000.0),
        ("density", 0.1, 100.0),
        ("dst", -1000.0, 500.0),
    ];

    pub fn validate(&self) -> Result<(), SubmissionError> {
        let sw = &self.solar_wind;
        let values = [sw.bz, sw.bt, sw.speed, sw.density, sw.dst];

        for ((field, min, max), value) in Self::LIMITS.into_iter().zip(values) {
            // NaN fails both comparisons, so test the accepted range directly
            if !(value >= min && value <= max) {
                return Err(SubmissionError::OutOfRange {
                    field,
                    min,
                    max,
                    value,
                });
            }
        }

        if self.model_data_uri.trim().is_empty() {
            return Err(SubmissionError::MissingModelUri);
        }
        Ok(())
    }
}
