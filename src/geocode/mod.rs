//! Location → coordinates resolution behind a rate-limited cache.

mod cache;
mod nominatim;

pub use cache::{CoordinateCache, PrefetchStats};
pub use nominatim::NominatimClient;

use async_trait::async_trait;
use serde::Serialize;

use crate::api::FetchError;

/// A geocoded location. Latitude and longitude are range-checked on creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
    pub address: String,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64, address: impl Into<String>) -> Result<Self, GeocodeError> {
        let address = address.into();
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(GeocodeError::InvalidCoordinates {
                location: address,
                reason: format!("({lat}, {lon}) is outside the valid range"),
            });
        }
        Ok(Self { lat, lon, address })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("no coordinates found for {0:?}")]
    NotFound(String),
    #[error("invalid coordinates for {location:?}: {reason}")]
    InvalidCoordinates { location: String, reason: String },
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// A single-location geocoding backend.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, location: &str) -> Result<Coordinates, GeocodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_are_range_checked() {
        assert!(Coordinates::new(48.85, 2.35, "Paris, France").is_ok());
        assert!(Coordinates::new(-90.0, 180.0, "corner").is_ok());
        assert!(matches!(
            Coordinates::new(91.0, 0.0, "nowhere"),
            Err(GeocodeError::InvalidCoordinates { .. })
        ));
        assert!(Coordinates::new(0.0, -180.5, "nowhere").is_err());
        assert!(Coordinates::new(f64::NAN, 0.0, "nowhere").is_err());
    }
}
