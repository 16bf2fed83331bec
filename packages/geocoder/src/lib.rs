#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding for the service marketplace location picker.
//!
//! Resolves free-text searches and map points to addresses using
//! Nominatim / OpenStreetMap, configured via TOML files in `services/`.
//! Every address that comes back is decomposed into street, city and
//! state with [`marketplace_address::decompose_with`] so that profile and
//! booking forms can be pre-filled.
//!
//! The pieces:
//!
//! 1. [`Geocoder`]: the provider seam, implemented by
//!    [`nominatim::NominatimGeocoder`].
//! 2. [`session::SearchSession`]: debounced search-as-you-type where only
//!    the latest query may publish results.
//! 3. [`picker::LocationPicker`]: search selection, map clicks and device
//!    geolocation, each producing a [`PickedLocation`].

pub mod nominatim;
pub mod picker;
pub mod service_registry;
pub mod session;

use async_trait::async_trait;
use marketplace_address_models::{Coordinates, ParsedAddress};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single result returned by a geocoding provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodedPlace {
    /// The provider's one-line, comma-separated address.
    pub display_name: String,
    /// Location of the result.
    pub coordinates: Coordinates,
}

/// A location chosen by the user, with its address decomposed for form
/// pre-fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickedLocation {
    /// Where the user picked.
    pub coordinates: Coordinates,
    /// The raw address from the provider, if one was found.
    pub display_name: Option<String>,
    /// Best-effort street/city/state. Empty fields need manual entry.
    pub address: ParsedAddress,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The provider answered with a non-success status.
    #[error("Geocoder returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Coordinates outside WGS84 bounds were given for reverse geocoding.
    #[error("Invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates {
        /// Rejected latitude.
        latitude: f64,
        /// Rejected longitude.
        longitude: f64,
    },

    /// A geocoding service id that is not in the registry.
    #[error("Unknown geocoding service: {id}")]
    UnknownService {
        /// The requested id.
        id: String,
    },

    /// No enabled geocoding service is configured.
    #[error("No geocoding service is enabled")]
    NoServiceEnabled,
}

/// A forward and reverse geocoding provider.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Searches for places matching a free-text query.
    ///
    /// Returns an empty list for blank queries.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the provider request fails.
    async fn search(&self, query: &str) -> Result<Vec<GeocodedPlace>, GeocodeError>;

    /// Finds the address at a point.
    ///
    /// Returns `Ok(None)` when the provider has no address there.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::InvalidCoordinates`] for out-of-range
    /// coordinates, or another [`GeocodeError`] if the request fails.
    async fn reverse(&self, coordinates: Coordinates)
    -> Result<Option<GeocodedPlace>, GeocodeError>;
}
