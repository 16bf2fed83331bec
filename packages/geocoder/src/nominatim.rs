//! Nominatim / OpenStreetMap geocoder client.
//!
//! Nominatim's public instance has strict usage rules: **1 request per
//! second** maximum and a descriptive `User-Agent` on every request.
//! Interactive search stays under the limit through the debounce in
//! [`crate::session::SearchSession`].
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/> and
//! <https://nominatim.org/release-docs/develop/api/Reverse/>

use async_trait::async_trait;
use marketplace_address_models::Coordinates;

use crate::{GeocodeError, GeocodedPlace, Geocoder};

/// Default `User-Agent` when `MARKETPLACE_GEOCODER_USER_AGENT` is unset.
pub const DEFAULT_USER_AGENT: &str = concat!("service-marketplace/", env!("CARGO_PKG_VERSION"));

/// Connection settings for a Nominatim instance.
#[derive(Debug, Clone)]
pub struct NominatimSettings {
    /// Search endpoint (e.g., `"https://nominatim.openstreetmap.org/search"`).
    pub base_url: String,
    /// Reverse endpoint (e.g., `"https://nominatim.openstreetmap.org/reverse"`).
    pub reverse_url: String,
    /// Comma-separated ISO country codes to restrict searches to.
    pub country_codes: String,
    /// `accept-language` sent with every request.
    pub language: String,
    /// Maximum number of search results.
    pub result_limit: u32,
}

/// A [`Geocoder`] backed by a Nominatim instance.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    settings: NominatimSettings,
}

impl NominatimGeocoder {
    /// Creates a geocoder sharing an existing HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client, settings: NominatimSettings) -> Self {
        Self { client, settings }
    }

    /// Builds an HTTP client with the `User-Agent` Nominatim requires.
    ///
    /// Uses `MARKETPLACE_GEOCODER_USER_AGENT` when set, otherwise
    /// [`DEFAULT_USER_AGENT`].
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the client cannot be built.
    pub fn build_client() -> Result<reqwest::Client, GeocodeError> {
        let user_agent = std::env::var("MARKETPLACE_GEOCODER_USER_AGENT")
            .ok()
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        Ok(reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(std::time::Duration::from_secs(10))
            .build()?)
    }

    /// The settings this geocoder was created with.
    #[must_use]
    pub const fn settings(&self) -> &NominatimSettings {
        &self.settings
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<GeocodedPlace>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let limit = self.settings.result_limit.to_string();
        let resp = self
            .client
            .get(&self.settings.base_url)
            .query(&[
                ("q", query),
                ("countrycodes", self.settings.country_codes.as_str()),
                ("accept-language", self.settings.language.as_str()),
                ("format", "jsonv2"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        check_status(&resp)?;

        let body: serde_json::Value = resp.json().await?;
        let places = parse_search_response(&body)?;
        log::debug!("Nominatim search {query:?} returned {} result(s)", places.len());
        Ok(places)
    }

    async fn reverse(
        &self,
        coordinates: Coordinates,
    ) -> Result<Option<GeocodedPlace>, GeocodeError> {
        if !coordinates.is_valid() {
            return Err(GeocodeError::InvalidCoordinates {
                latitude: coordinates.latitude,
                longitude: coordinates.longitude,
            });
        }

        let lat = coordinates.latitude.to_string();
        let lon = coordinates.longitude.to_string();
        let resp = self
            .client
            .get(&self.settings.reverse_url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("accept-language", self.settings.language.as_str()),
                ("format", "jsonv2"),
            ])
            .send()
            .await?;

        check_status(&resp)?;

        let body: serde_json::Value = resp.json().await?;
        parse_reverse_response(&body)
    }
}

fn check_status(resp: &reqwest::Response) -> Result<(), GeocodeError> {
    let status = resp.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }
    if !status.is_success() {
        return Err(GeocodeError::Status {
            status: status.as_u16(),
        });
    }
    Ok(())
}

/// Parses a Nominatim search response (a JSON array of places).
fn parse_search_response(body: &serde_json::Value) -> Result<Vec<GeocodedPlace>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    results.iter().map(parse_place).collect()
}

/// Parses a Nominatim reverse response (a single place object).
///
/// Nominatim answers `{"error": "Unable to geocode"}` for points with no
/// address (e.g., the open ocean); that is not a failure.
fn parse_reverse_response(body: &serde_json::Value) -> Result<Option<GeocodedPlace>, GeocodeError> {
    if let Some(error) = body.get("error") {
        log::debug!("Nominatim reverse found nothing: {error}");
        return Ok(None);
    }

    parse_place(body).map(Some)
}

fn parse_place(place: &serde_json::Value) -> Result<GeocodedPlace, GeocodeError> {
    let latitude = parse_coordinate(place, "lat")?;
    let longitude = parse_coordinate(place, "lon")?;

    let display_name = place["display_name"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing display_name in Nominatim response".to_string(),
        })?;

    Ok(GeocodedPlace {
        display_name,
        coordinates: Coordinates::new(latitude, longitude),
    })
}

/// Nominatim encodes coordinates as JSON strings.
fn parse_coordinate(place: &serde_json::Value, field: &str) -> Result<f64, GeocodeError> {
    place[field]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: format!("Missing {field} in Nominatim response"),
        })
}
