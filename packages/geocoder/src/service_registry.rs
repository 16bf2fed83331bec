//! Compile-time registry of geocoding service configurations.
//!
//! Each geocoding provider is defined in a TOML file under `services/`.
//! The registry embeds these at compile time and exposes them via
//! [`all_services`] and [`enabled_services`].

use serde::Deserialize;

use crate::GeocodeError;
use crate::nominatim::{NominatimGeocoder, NominatimSettings};

/// A geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service may be used by the location picker.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Selection order. Lower values are preferred.
    pub priority: u32,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Nominatim / `OpenStreetMap` geocoder.
    Nominatim {
        /// Search endpoint URL.
        base_url: String,
        /// Reverse endpoint URL.
        reverse_url: String,
        /// Comma-separated ISO country codes.
        #[serde(default = "default_country_codes")]
        country_codes: String,
        /// `accept-language` for results.
        #[serde(default = "default_language")]
        language: String,
        /// Minimum delay between requests in milliseconds.
        rate_limit_ms: u64,
        /// Maximum results per search.
        #[serde(default = "default_result_limit")]
        result_limit: u32,
    },
}

const fn default_true() -> bool {
    true
}

fn default_country_codes() -> String {
    "br".to_string()
}

fn default_language() -> String {
    "pt-BR".to_string()
}

const fn default_result_limit() -> u32 {
    5
}

impl GeocodingService {
    /// Returns the provider's search URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::Nominatim { base_url, .. } => base_url,
        }
    }

    /// Returns the provider's minimum delay between requests.
    #[must_use]
    pub const fn rate_limit_ms(&self) -> u64 {
        match &self.provider {
            ProviderConfig::Nominatim { rate_limit_ms, .. } => *rate_limit_ms,
        }
    }

    /// Builds a geocoder for this service using a shared HTTP client.
    #[must_use]
    pub fn build_geocoder(&self, client: reqwest::Client) -> NominatimGeocoder {
        match &self.provider {
            ProviderConfig::Nominatim {
                base_url,
                reverse_url,
                country_codes,
                language,
                result_limit,
                ..
            } => NominatimGeocoder::new(
                client,
                NominatimSettings {
                    base_url: base_url.clone(),
                    reverse_url: reverse_url.clone(),
                    country_codes: country_codes.clone(),
                    language: language.clone(),
                    result_limit: *result_limit,
                },
            ),
        }
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("nominatim", include_str!("../services/nominatim.toml")),
    (
        "nominatim_self_hosted",
        include_str!("../services/nominatim_self_hosted.toml"),
    ),
];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 2;

/// Returns all geocoding service configurations (enabled and disabled).
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<GeocodingService> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse geocoding service '{name}': {e}"))
        })
        .collect()
}

/// Returns only enabled services, sorted by priority (ascending).
#[must_use]
pub fn enabled_services() -> Vec<GeocodingService> {
    let mut services: Vec<GeocodingService> =
        all_services().into_iter().filter(|s| s.enabled).collect();
    services.sort_by_key(|s| s.priority);
    services
}

/// Builds a geocoder for the preferred service.
///
/// With `id` set, that service is used whether or not it is enabled;
/// otherwise the highest-priority enabled service is chosen.
///
/// # Errors
///
/// Returns [`GeocodeError::UnknownService`] for an unrecognized `id`,
/// [`GeocodeError::NoServiceEnabled`] if no service is enabled, or
/// [`GeocodeError::Http`] if the HTTP client cannot be built.
pub fn default_geocoder(id: Option<&str>) -> Result<NominatimGeocoder, GeocodeError> {
    let service = match id {
        Some(id) => all_services()
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| GeocodeError::UnknownService { id: id.to_string() })?,
        None => enabled_services()
            .into_iter()
            .next()
            .ok_or(GeocodeError::NoServiceEnabled)?,
    };

    log::info!("Using geocoding service '{}' ({})", service.id, service.name);

    let client = NominatimGeocoder::build_client()?;
    Ok(service.build_geocoder(client))
}
