//! Location picker flows for profile and booking forms.
//!
//! A location can be picked three ways, and each ends in a
//! [`PickedLocation`] whose address pre-fills the form:
//!
//! - choosing a search result ([`PickedLocation::from_search_result`]),
//! - clicking or dragging a pin on the map ([`LocationPicker::pick_on_map`]),
//! - using the device's position ([`LocationPicker::use_device_location`]).
//!
//! Map points are reverse geocoded, and their addresses tend to contain
//! block labels ("Quadra 12") that search results do not, so they are
//! decomposed with [`MAP_CLICK_EXTRA_DENYLIST`].

use std::sync::Arc;

use marketplace_address::{MAP_CLICK_EXTRA_DENYLIST, ParsedAddress, decompose, decompose_with};
use marketplace_address_models::Coordinates;

use crate::{GeocodeError, GeocodedPlace, Geocoder, PickedLocation};

impl PickedLocation {
    /// Decomposes a search result the user selected.
    #[must_use]
    pub fn from_search_result(place: &GeocodedPlace) -> Self {
        Self {
            coordinates: place.coordinates,
            display_name: Some(place.display_name.clone()),
            address: decompose(&place.display_name),
        }
    }

    /// Decomposes the reverse-geocoded address of a map point.
    ///
    /// When nothing was found the address is left empty so the form asks
    /// for manual entry.
    #[must_use]
    pub fn from_map_point(coordinates: Coordinates, place: Option<&GeocodedPlace>) -> Self {
        place.map_or_else(
            || Self {
                coordinates,
                display_name: None,
                address: ParsedAddress::default(),
            },
            |place| Self {
                coordinates,
                display_name: Some(place.display_name.clone()),
                address: decompose_with(&place.display_name, MAP_CLICK_EXTRA_DENYLIST),
            },
        )
    }
}

/// Resolves user location choices through a [`Geocoder`].
pub struct LocationPicker<G: Geocoder + ?Sized> {
    geocoder: Arc<G>,
}

impl<G: Geocoder + ?Sized> Clone for LocationPicker<G> {
    fn clone(&self) -> Self {
        Self {
            geocoder: Arc::clone(&self.geocoder),
        }
    }
}

impl<G: Geocoder + ?Sized> LocationPicker<G> {
    /// Creates a picker over a shared geocoder.
    #[must_use]
    pub fn new(geocoder: Arc<G>) -> Self {
        Self { geocoder }
    }

    /// The geocoder behind this picker.
    #[must_use]
    pub const fn geocoder(&self) -> &Arc<G> {
        &self.geocoder
    }

    /// Searches and decomposes every result.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the search fails.
    pub async fn search(&self, query: &str) -> Result<Vec<PickedLocation>, GeocodeError> {
        let places = self.geocoder.search(query).await?;
        Ok(places.iter().map(PickedLocation::from_search_result).collect())
    }

    /// Resolves a point clicked or dragged to on the map.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the coordinates are invalid or reverse
    /// geocoding fails.
    pub async fn pick_on_map(&self, coordinates: Coordinates) -> Result<PickedLocation, GeocodeError> {
        let place = self.geocoder.reverse(coordinates).await?;
        if place.is_none() {
            log::info!("No address found at {coordinates}");
        }
        Ok(PickedLocation::from_map_point(coordinates, place.as_ref()))
    }

    /// Resolves the position reported by the device's geolocation.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the coordinates are invalid or reverse
    /// geocoding fails.
    pub async fn use_device_location(
        &self,
        coordinates: Coordinates,
    ) -> Result<PickedLocation, GeocodeError> {
        log::debug!("Resolving device location {coordinates}");
        self.pick_on_map(coordinates).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedGeocoder {
        places: Vec<GeocodedPlace>,
        reverse: Option<GeocodedPlace>,
    }

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn search(&self, _query: &str) -> Result<Vec<GeocodedPlace>, GeocodeError> {
            Ok(self.places.clone())
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
            Ok(self.reverse.clone())
        }
    }

    fn place(display_name: &str) -> GeocodedPlace {
        GeocodedPlace {
            display_name: display_name.to_string(),
            coordinates: Coordinates::new(-16.6869, -49.2648),
        }
    }

    fn picker(reverse: Option<GeocodedPlace>) -> LocationPicker<FixedGeocoder> {
        LocationPicker::new(Arc::new(FixedGeocoder {
            places: vec![
                place("Rua 10, Setor Central, Goiânia, Microrregião de Goiânia, Goiás, Brasil"),
                place("Local desconhecido"),
            ],
            reverse,
        }))
    }

    #[tokio::test]
    async fn search_decomposes_each_result() {
        let results = picker(None).search("rua 10").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].address.street, "Rua 10");
        assert_eq!(results[0].address.city, "Goiânia");
        assert_eq!(results[0].address.state, "GO");
        assert!(results[0].address.is_complete());
        assert_eq!(results[1].address, ParsedAddress::street_only("Local desconhecido"));
        assert!(!results[1].address.is_complete());
    }

    #[tokio::test]
    async fn map_click_uses_quadra_denylist() {
        let reverse = place("Rua 3, Centro, Quadra 12, Goiás, Brasil");
        let picked = picker(Some(reverse.clone()))
            .pick_on_map(reverse.coordinates)
            .await
            .unwrap();
        assert_eq!(picked.address.city, "Centro");

        let selected = PickedLocation::from_search_result(&reverse);
        assert_eq!(selected.address.city, "Quadra 12");
    }

    #[tokio::test]
    async fn map_click_without_address_prompts_manual_entry() {
        let coordinates = Coordinates::new(-20.0, -30.0);
        let picked = picker(None).pick_on_map(coordinates).await.unwrap();
        assert_eq!(picked.coordinates, coordinates);
        assert!(picked.display_name.is_none());
        assert_eq!(picked.address, ParsedAddress::default());
        assert!(!picked.address.is_complete());
    }

    #[tokio::test]
    async fn device_location_resolves_like_map_click() {
        let reverse = place("Avenida Goiás, Setor Central, Goiânia, Goiás, Brasil");
        let picked = picker(Some(reverse.clone()))
            .use_device_location(reverse.coordinates)
            .await
            .unwrap();
        assert_eq!(picked.address.street, "Avenida Goiás");
        assert_eq!(picked.address.city, "Goiânia");
        assert_eq!(picked.address.state, "GO");
    }

    #[tokio::test]
    async fn invalid_device_location_is_rejected() {
        let result = picker(None)
            .use_device_location(Coordinates::new(-100.0, 0.0))
            .await;
        assert!(matches!(result, Err(GeocodeError::InvalidCoordinates { .. })));
    }
}
