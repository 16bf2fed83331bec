#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address decomposition for the service marketplace location picker.
//!
//! Turns a free-text geocoder address (e.g. a Nominatim `display_name`)
//! into the street, city and two-letter state code used to pre-fill
//! registration and booking forms. The result is best-effort: fields
//! that cannot be resolved are left empty for the user to fill in.

pub mod decompose;
pub mod states;

pub use decompose::{MAP_CLICK_EXTRA_DENYLIST, decompose, decompose_with};
pub use marketplace_address_models::ParsedAddress;
