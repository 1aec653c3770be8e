// HTTP adapters for the external solar wind and forecast actions
use crate::application::forecast_service::KpForecaster;
use crate::application::solar_wind_source::SolarWindSource;
use crate::application::upstream::UpstreamResponse;
use crate::domain::forecast::{ForecastRequest, KpForecast};
use crate::domain::solar_wind::SolarWindData;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Read a `{data?, error?}` envelope. Upstream failures that still carry an
/// envelope body are returned as `Ok` so their message reaches the caller.
async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<UpstreamResponse<T>> {
    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read upstream response")?;

    let parsed = serde_json::from_str::<UpstreamResponse<T>>(&body);
    if !status.is_success() {
        return match parsed {
            Ok(envelope) if envelope.error.is_some() => Ok(envelope),
            _ => anyhow::bail!("upstream request failed with status {}: {}", status, body),
        };
    }

    parsed.context("Failed to parse upstream response")
}

#[derive(Debug, Clone)]
pub struct HttpSolarWindSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSolarWindSource {
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            url,
        })
    }
}

#[async_trait]
impl SolarWindSource for HttpSolarWindSource {
    async fn fetch_latest(&self) -> Result<UpstreamResponse<SolarWindData>> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to solar wind source")?;

        read_envelope(response).await
    }
}

#[derive(Debug, Clone)]
pub struct HttpKpForecaster {
    client: reqwest::Client,
    url: String,
}

impl HttpKpForecaster {
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            url,
        })
    }
}

#[async_trait]
impl KpForecaster for HttpKpForecaster {
    async fn forecast(&self, request: &ForecastRequest) -> Result<UpstreamResponse<KpForecast>> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .context("Failed to send request to forecast service")?;

        read_envelope(response).await
    }
}

/// Used when no forecast endpoint is configured.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredForecaster;

#[async_trait]
impl KpForecaster for UnconfiguredForecaster {
    async fn forecast(&self, _request: &ForecastRequest) -> Result<UpstreamResponse<KpForecast>> {
        Ok(UpstreamResponse::err(
            "Kp-index forecasting is not configured (set forecast.url).",
        ))
    }
}
