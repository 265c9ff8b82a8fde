use std::time::Duration;

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use url::Url;

use super::{Coordinates, GeocodeError, Geocoder};
use crate::api::{build_http_client, get_json};

/// One hit of the Nominatim search API. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

impl Place {
    fn into_coordinates(self, location: &str) -> Result<Coordinates, GeocodeError> {
        let parse = |value: &str, axis: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|e| GeocodeError::InvalidCoordinates {
                    location: location.to_string(),
                    reason: format!("{axis} {value:?}: {e}"),
                })
        };
        Coordinates::new(parse(&self.lat, "lat")?, parse(&self.lon, "lon")?, location)
    }
}

/// Geocoder backed by the OpenStreetMap Nominatim search endpoint.
pub struct NominatimClient {
    http: ClientWithMiddleware,
    endpoint: Url,
}

impl NominatimClient {
    /// Nominatim's usage policy requires an identifying `User-Agent`.
    pub fn new(endpoint: &str, user_agent: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            http: build_http_client(timeout, user_agent)?,
            endpoint: Url::parse(endpoint)?,
        })
    }

    fn search_url(&self, location: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", location)
            .append_pair("limit", "1");
        url
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn geocode(&self, location: &str) -> Result<Coordinates, GeocodeError> {
        let places: Vec<Place> = get_json(&self.http, self.search_url(location).as_str()).await?;
        places
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NotFound(location.to_string()))?
            .into_coordinates(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_encodes_location() {
        let client = NominatimClient::new(
            "https://nominatim.openstreetmap.org/search",
            "test-agent",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            client.search_url("São Paulo, Brazil").as_str(),
            "https://nominatim.openstreetmap.org/search?format=json&q=S%C3%A3o+Paulo%2C+Brazil&limit=1"
        );
    }

    #[test]
    fn string_coordinates_are_parsed() {
        let place = Place {
            lat: "48.8566".into(),
            lon: " 2.3522 ".into(),
        };
        let coords = place.into_coordinates("Paris, France").unwrap();
        assert_eq!((coords.lat, coords.lon), (48.8566, 2.3522));
        assert_eq!(coords.address, "Paris, France");
    }

    #[test]
    fn malformed_coordinates_are_rejected() {
        let place = Place {
            lat: "north".into(),
            lon: "2.0".into(),
        };
        assert!(matches!(
            place.into_coordinates("x"),
            Err(GeocodeError::InvalidCoordinates { .. })
        ));
    }
}
