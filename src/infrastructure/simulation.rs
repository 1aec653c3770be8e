// Simulated data - Random values within realistic solar wind ranges
use crate::application::history_service::HistoryRepository;
use crate::application::imagery_catalogue::ImageryCatalogue;
use crate::application::solar_wind_source::SolarWindSource;
use crate::application::upstream::UpstreamResponse;
use crate::domain::forecast::KpTrendPoint;
use crate::domain::imagery::SatelliteImage;
use crate::domain::solar_wind::{SolarWindData, SolarWindParameterPoint};
use crate::domain::storm::{notable_storms, HistoricalSolarEvent};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use rand::Rng;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn hour_label(time: DateTime<Utc>) -> String {
    format!("{:02}:00", time.hour())
}

/// Hour marks from `hours - 1` hours ago up to `now`, oldest first.
fn hourly_marks(hours: u32, now: DateTime<Utc>) -> impl Iterator<Item = DateTime<Utc>> {
    (0..hours)
        .rev()
        .map(move |i| now - Duration::hours(i64::from(i)))
}

pub fn random_solar_wind<R: Rng + ?Sized>(rng: &mut R) -> SolarWindData {
    SolarWindData {
        bz: round1(rng.gen_range(-10.0..10.0)),
        bt: round1(rng.gen_range(0.0..30.0)),
        speed: rng.gen_range(300.0_f64..800.0).round(),
        density: round1(rng.gen_range(1.0..15.0)),
        dst: rng.gen_range(-200.0_f64..20.0).round(),
    }
}

pub fn kp_trend<R: Rng + ?Sized>(hours: u32, now: DateTime<Utc>, rng: &mut R) -> Vec<KpTrendPoint> {
    hourly_marks(hours, now)
        .map(|time| KpTrendPoint {
            date: hour_label(time),
            kp_index: round1(rng.gen_range(1.0..8.0)),
        })
        .collect()
}

/// Daily Kp for the last `days` days labelled `M/D`, oldest first.
pub fn kp_daily<R: Rng + ?Sized>(days: u32, now: DateTime<Utc>, rng: &mut R) -> Vec<KpTrendPoint> {
    (0..days)
        .rev()
        .map(|i| now - Duration::days(i64::from(i)))
        .map(|day| KpTrendPoint {
            date: format!("{}/{}", day.month(), day.day()),
            kp_index: round1(rng.gen_range(1.0..9.0)),
        })
        .collect()
}

pub fn solar_wind_series<R: Rng + ?Sized>(
    hours: u32,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<SolarWindParameterPoint> {
    hourly_marks(hours, now)
        .map(|time| {
            let sample = random_solar_wind(rng);
            SolarWindParameterPoint {
                time: hour_label(time),
                bz: sample.bz,
                speed: sample.speed,
                density: sample.density,
            }
        })
        .collect()
}

/// Stand-in for the real-time solar wind action.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSolarWindSource {
    failure_rate: f64,
}

impl SimulatedSolarWindSource {
    pub fn new(failure_rate: f64) -> Self {
        Self {
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl SolarWindSource for SimulatedSolarWindSource {
    async fn fetch_latest(&self) -> anyhow::Result<UpstreamResponse<SolarWindData>> {
        let mut rng = rand::thread_rng();
        if self.failure_rate > 0.0 && rng.gen_bool(self.failure_rate) {
            return Ok(UpstreamResponse::err("Failed to fetch real-time data."));
        }
        Ok(UpstreamResponse::ok(random_solar_wind(&mut rng)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedHistory;

impl HistoryRepository for SimulatedHistory {
    fn kp_trend(&self, hours: u32) -> Vec<KpTrendPoint> {
        kp_trend(hours, Utc::now(), &mut rand::thread_rng())
    }

    fn solar_wind_series(&self, hours: u32) -> Vec<SolarWindParameterPoint> {
        solar_wind_series(hours, Utc::now(), &mut rand::thread_rng())
    }

    fn kp_daily(&self, days: u32) -> Vec<KpTrendPoint> {
        kp_daily(days, Utc::now(), &mut rand::thread_rng())
    }

    fn storm_events(&self) -> Vec<HistoricalSolarEvent> {
        notable_storms()
    }
}

/// Placeholder imagery until instrument feeds are wired in.
#[derive(Debug, Clone, Default)]
pub struct SimulatedImagery;

impl ImageryCatalogue for SimulatedImagery {
    fn latest_images(&self) -> Vec<SatelliteImage> {
        const PLACEHOLDER: &str = "https://placehold.co/600x400.png";
        [
            ("sdo-aia-193", "SDO AIA 193 Angstrom", (10, 0), "NASA SDO AIA 193", "sun corona"),
            ("goes-suvi-fe-094", "GOES SUVI Fe 094", (10, 5), "NOAA GOES SUVI Fe 094", "solar flare"),
            (
                "soho-lasco-c2",
                "SOHO LASCO C2 Coronal Mass Ejection",
                (9, 50),
                "ESA/NASA SOHO LASCO C2",
                "solar wind",
            ),
            ("ovation-aurora", "OVATION Aurora Forecast", (10, 10), "NOAA SWPC OVATION", "aurora earth"),
        ]
        .into_iter()
        .filter_map(|(id, alt, (hour, minute), source, hint)| {
            let timestamp = Utc.with_ymd_and_hms(2024, 7, 27, hour, minute, 0).single()?;
            Some(SatelliteImage {
                id: id.to_string(),
                src: PLACEHOLDER.to_string(),
                alt: alt.to_string(),
                timestamp,
                source: source.to_string(),
                hint: hint.to_string(),
            })
        })
        .collect()
    }
}
