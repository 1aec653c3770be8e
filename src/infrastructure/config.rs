use crate::application::polling_controller::FETCH_INTERVAL;
use crate::domain::time_series::MAX_DATA_POINTS;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FeedConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub polling: PollingSettings,
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub forecast: ForecastSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingSettings {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_max_data_points")]
    pub max_data_points: usize,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Simulated,
    Http,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    #[serde(default)]
    pub kind: SourceKind,
    pub url: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Chance in [0, 1] that the simulated source answers with an error
    #[serde(default)]
    pub failure_rate: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastSettings {
    pub url: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_interval_ms() -> u64 {
    FETCH_INTERVAL.as_millis() as u64
}

fn default_max_data_points() -> usize {
    MAX_DATA_POINTS
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_data_points: default_max_data_points(),
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            url: None,
            timeout_ms: default_timeout_ms(),
            failure_rate: 0.0,
        }
    }
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl PollingSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl FeedConfig {
    /// Capacity of the live window; zero is rejected by `validate`.
    pub fn max_data_points(&self) -> anyhow::Result<NonZeroUsize> {
        NonZeroUsize::new(self.polling.max_data_points)
            .ok_or_else(|| anyhow::anyhow!("polling.max_data_points must be greater than zero"))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.max_data_points()?;
        if self.polling.interval_ms == 0 {
            anyhow::bail!("polling.interval_ms must be greater than zero");
        }
        if self.source.kind == SourceKind::Http && self.source.url.is_none() {
            anyhow::bail!("source.url is required when source.kind = \"http\"");
        }
        if !(0.0..=1.0).contains(&self.source.failure_rate) {
            anyhow::bail!("source.failure_rate must be within [0, 1]");
        }
        Ok(())
    }
}

/// Load `config/feed.{toml,yaml,json}` (optional) overlaid with `FEED__*`
/// environment variables, e.g. `FEED__POLLING__INTERVAL_MS=5000`.
pub fn load_feed_config() -> anyhow::Result<FeedConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/feed").required(false))
        .add_source(
            config::Environment::with_prefix("FEED")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let feed: FeedConfig = settings.try_deserialize()?;
    feed.validate()?;
    Ok(feed)
}
