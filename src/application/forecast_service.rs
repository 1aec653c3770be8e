// Forecast service - Forwards user-submitted readings to the external model
use crate::application::upstream::{EnvelopeFailure, UpstreamResponse};
use crate::domain::forecast::{ForecastRequest, KpForecast, KpPrediction, SubmissionError};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

#[async_trait]
pub trait KpForecaster: Send + Sync {
    async fn forecast(&self, request: &ForecastRequest) -> anyhow::Result<UpstreamResponse<KpForecast>>;
}

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error(transparent)]
    Validation(#[from] SubmissionError),
    #[error("{0}")]
    Upstream(String),
    #[error("forecast service unavailable: {0}")]
    Transport(String),
}

#[derive(Clone)]
pub struct ForecastService {
    forecaster: Arc<dyn KpForecaster>,
}

impl ForecastService {
    pub fn new(forecaster: Arc<dyn KpForecaster>) -> Self {
        Self { forecaster }
    }

    pub async fn predict(&self, request: ForecastRequest) -> Result<KpPrediction, ForecastError> {
        request.validate()?;

        let response = self
            .forecaster
            .forecast(&request)
            .await
            .map_err(|e| ForecastError::Transport(format!("{:#}", e)))?;

        let forecast = response.into_result().map_err(|failure| match failure {
            EnvelopeFailure::Reported(message) => ForecastError::Upstream(message),
            EnvelopeFailure::Empty => {
                ForecastError::Upstream("forecast service returned no prediction".to_string())
            }
        })?;

        tracing::info!(
            kp_index = forecast.kp_index,
            geoeffectiveness = ?forecast.geoeffectiveness,
            "Kp-index prediction received"
        );

        Ok(KpPrediction {
            forecast,
            timestamp: Utc::now(),
        })
    }
}
