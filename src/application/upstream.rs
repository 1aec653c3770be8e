// Response envelope shared by the external data and forecast actions
use serde::{Deserialize, Serialize};

/// `{ data?: T, error?: string }` as returned by the upstream actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamResponse<T> {
    #[serde(default = "none", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn none<T>() -> Option<T> {
    None
}

/// Why an envelope carried no usable payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeFailure {
    Reported(String),
    Empty,
}

impl<T> UpstreamResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
        }
    }

    /// An `error` field wins over `data` when both are present.
    pub fn into_result(self) -> Result<T, EnvelopeFailure> {
        match (self.data, self.error) {
            (_, Some(message)) => Err(EnvelopeFailure::Reported(message)),
            (Some(data), None) => Ok(data),
            (None, None) => Err(EnvelopeFailure::Empty),
        }
    }
}
