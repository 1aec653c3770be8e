// Historical geomagnetic storms used as context for a forecast
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalSolarEvent {
    pub name: String,
    pub year: String,
    /// Not every historical storm has a known Kp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_kp: Option<f64>,
    pub description: String,
    pub impact_summary: String,
}

fn event(name: &str, year: &str, kp: f64, description: &str, impact: &str) -> HistoricalSolarEvent {
    HistoricalSolarEvent {
        name: name.to_string(),
        year: year.to_string(),
        estimated_kp: Some(kp),
        description: description.to_string(),
        impact_summary: impact.to_string(),
    }
}

/// Notable storms, oldest first.
pub fn notable_storms() -> Vec<HistoricalSolarEvent> {
    vec![
        event(
            "Carrington Event",
            "1859",
            9.0,
            "Largest recorded geomagnetic storm. Caused widespread telegraph disruptions, auroras seen worldwide.",
            "Telegraph systems failed, some operators received shocks. Auroras visible in Caribbean.",
        ),
        event(
            "Quebec Blackout",
            "1989",
            9.0,
            "Major geomagnetic storm that caused a 9-hour power outage for 6 million people in Quebec, Canada.",
            "Power grid collapse, satellite disruptions, radio interference.",
        ),
        event(
            "Halloween Solar Storms",
            "2003",
            9.0,
            "Series of powerful solar flares and CMEs. Caused power outages in Sweden, damaged transformers in South Africa.",
            "Power outages, satellite damage, GPS disruptions, airline rerouting.",
        ),
        event(
            "St. Patrick's Day Storm",
            "2015",
            8.0,
            "Strong G4 geomagnetic storm, one of the strongest of solar cycle 24. Auroras visible at lower latitudes.",
            "Radio blackouts, aurora displays.",
        ),
    ]
}

/// How a forecast Kp relates to a past event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StormComparison {
    Stronger,
    Weaker,
    Comparable,
}

impl StormComparison {
    pub fn between(forecast_kp: f64, event_kp: f64) -> Self {
        if forecast_kp > event_kp {
            StormComparison::Stronger
        } else if forecast_kp < event_kp {
            StormComparison::Weaker
        } else {
            StormComparison::Comparable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StormContext {
    #[serde(flatten)]
    pub event: HistoricalSolarEvent,
    /// Present only when both a forecast Kp and the event's Kp are known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<StormComparison>,
}

impl StormContext {
    pub fn new(event: HistoricalSolarEvent, forecast_kp: Option<f64>) -> Self {
        let comparison = forecast_kp
            .zip(event.estimated_kp)
            .map(|(forecast, past)| StormComparison::between(forecast, past));
        Self { event, comparison }
    }
}
