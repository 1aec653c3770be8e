// Source trait for live solar wind data
use crate::application::upstream::UpstreamResponse;
use crate::domain::solar_wind::SolarWindData;
use async_trait::async_trait;

#[async_trait]
pub trait SolarWindSource: Send + Sync {
    /// Fetch the latest solar wind parameters.
    ///
    /// `Err` is reserved for transport and decoding failures; an upstream
    /// that answered with an error payload returns `Ok` with `error` set.
    async fn fetch_latest(&self) -> anyhow::Result<UpstreamResponse<SolarWindData>>;
}
