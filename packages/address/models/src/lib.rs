#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared address types for the service marketplace.
//!
//! This crate contains only data types and simple conversions. It has no
//! heavyweight dependencies (no HTTP, no parsing heuristics).

use serde::{Deserialize, Serialize};

/// A best-effort decomposition of a free-text geocoder address.
///
/// Every field is always present. An empty string means the field could
/// not be resolved and the user should fill it in manually; it is never a
/// sentinel such as `"N/A"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedAddress {
    /// Street and number (first segment of the raw address).
    pub street: String,
    /// City name.
    pub city: String,
    /// Two-letter state code (e.g. `"GO"`).
    pub state: String,
}

impl ParsedAddress {
    /// Builds a result where only the street is known.
    #[must_use]
    pub fn street_only(street: impl Into<String>) -> Self {
        Self {
            street: street.into(),
            city: String::new(),
            state: String::new(),
        }
    }

    /// Whether both city and state were resolved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.city.is_empty() && !self.state.is_empty()
    }
}

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees, `-90..=90`.
    pub latitude: f64,
    /// Longitude in degrees, `-180..=180`.
    pub longitude: f64,
}

impl Coordinates {
    /// Creates a coordinate pair without validating it.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and within WGS84 bounds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}
