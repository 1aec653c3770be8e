// Satellite imagery catalogue entries
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SatelliteImage {
    pub id: String,
    pub src: String,
    pub alt: String,
    pub timestamp: DateTime<Utc>,
    /// Instrument, e.g. "NASA SDO AIA 193"
    pub source: String,
    /// Short subject tag, e.g. "sun corona"
    pub hint: String,
}
