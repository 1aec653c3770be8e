// Imagery catalogue - Latest satellite image per instrument
use crate::domain::imagery::SatelliteImage;

pub trait ImageryCatalogue: Send + Sync {
    fn latest_images(&self) -> Vec<SatelliteImage>;
}
