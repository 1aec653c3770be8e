// Data fetcher - Single request/response boundary for the live feed
use crate::application::solar_wind_source::SolarWindSource;
use crate::application::upstream::EnvelopeFailure;
use crate::domain::solar_wind::{Reading, SolarWindData};
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;

/// Every way a fetch can fail, flattened to a displayable message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("{0}")]
    Upstream(String),
    #[error("failed to reach solar wind source: {0}")]
    Source(String),
    #[error("invalid solar wind data: {0}")]
    Invalid(String),
    #[error("solar wind source returned no data")]
    Empty,
}

#[derive(Clone)]
pub struct DataFetcher {
    source: Arc<dyn SolarWindSource>,
}

impl DataFetcher {
    pub fn new(source: Arc<dyn SolarWindSource>) -> Self {
        Self { source }
    }

    /// Fetch one reading, stamped with the completion time. Never retries.
    pub async fn fetch(&self) -> Result<Reading, FetchError> {
        let data = self.fetch_latest_data().await?;
        Ok(Reading::from_solar_wind(Utc::now(), &data))
    }

    /// Full upstream payload, including `bt` and `dst`.
    ///
    /// A panicking source is reported as `FetchError::Source` so the caller's
    /// loop keeps running.
    pub async fn fetch_latest_data(&self) -> Result<SolarWindData, FetchError> {
        let response = match AssertUnwindSafe(self.source.fetch_latest()).catch_unwind().await {
            Ok(result) => result.map_err(|e| FetchError::Source(format!("{:#}", e)))?,
            Err(_) => {
                tracing::error!("Solar wind source panicked during fetch");
                return Err(FetchError::Source("solar wind source panicked".to_string()));
            }
        };

        let data = response.into_result().map_err(|failure| match failure {
            EnvelopeFailure::Reported(message) => FetchError::Upstream(message),
            EnvelopeFailure::Empty => FetchError::Empty,
        })?;

        if !data.is_finite() {
            return Err(FetchError::Invalid(format!("non-finite value in {:?}", data)));
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::upstream::UpstreamResponse;
    use anyhow::anyhow;
    use async_trait::async_trait;

    struct FixedSource(fn() -> anyhow::Result<UpstreamResponse<SolarWindData>>);

    #[async_trait]
    impl SolarWindSource for FixedSource {
        async fn fetch_latest(&self) -> anyhow::Result<UpstreamResponse<SolarWindData>> {
            (self.0)()
        }
    }

    fn sample() -> SolarWindData {
        SolarWindData {
            bz: -7.1,
            bt: 12.0,
            speed: 520.0,
            density: 6.4,
            dst: -35.0,
        }
    }

    fn fetcher(f: fn() -> anyhow::Result<UpstreamResponse<SolarWindData>>) -> DataFetcher {
        DataFetcher::new(Arc::new(FixedSource(f)))
    }

    #[tokio::test]
    async fn test_success_builds_reading() {
        let reading = fetcher(|| Ok(UpstreamResponse::ok(sample()))).fetch().await.unwrap();
        assert_eq!(reading.bz, -7.1);
        assert_eq!(reading.speed, 520.0);
        assert_eq!(reading.density, 6.4);
    }

    #[tokio::test]
    async fn test_upstream_error_payload_keeps_message() {
        let err = fetcher(|| Ok(UpstreamResponse::err("Failed to fetch real-time data")))
            .fetch()
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Upstream("Failed to fetch real-time data".into()));
        assert_eq!(err.to_string(), "Failed to fetch real-time data");
    }

    #[tokio::test]
    async fn test_transport_failure_is_normalized() {
        let err = fetcher(|| Err(anyhow!("connection refused")))
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Source(ref m) if m.contains("connection refused")));
    }

    #[tokio::test]
    async fn test_empty_and_invalid_payloads() {
        let err = fetcher(|| {
            Ok(UpstreamResponse {
                data: None,
                error: None,
            })
        })
        .fetch()
        .await
        .unwrap_err();
        assert_eq!(err, FetchError::Empty);

        let err = fetcher(|| {
            let mut data = sample();
            data.bz = f64::INFINITY;
            Ok(UpstreamResponse::ok(data))
        })
        .fetch()
        .await
        .unwrap_err();
        assert!(matches!(err, FetchError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_latest_data_keeps_every_field() {
        let data = fetcher(|| Ok(UpstreamResponse::ok(sample())))
            .fetch_latest_data()
            .await
            .unwrap();
        assert_eq!(data, sample());
    }

    #[tokio::test]
    async fn test_panicking_source_becomes_fetch_error() {
        let err = fetcher(|| panic!("decoder blew up")).fetch().await.unwrap_err();
        assert_eq!(err, FetchError::Source("solar wind source panicked".into()));
    }
}
