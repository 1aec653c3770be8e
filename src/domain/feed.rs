// Live feed state published to the presentation layer
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::time_series::TimeSeriesBuffer;

/// Outcome of the most recent polling cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

/// Where the polling loop currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollerPhase {
    #[default]
    Idle,
    Fetching,
    Waiting,
    Stopped,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedSnapshot {
    pub readings: TimeSeriesBuffer,
    pub fetch_state: FetchState,
    pub phase: PollerPhase,
    /// Completion time of the last successful fetch
    pub last_updated: Option<DateTime<Utc>>,
}

impl FeedSnapshot {
    pub fn empty(readings: TimeSeriesBuffer) -> Self {
        Self {
            readings,
            ..Self::default()
        }
    }
}
