//! Forward-geocoding outbound adapters.
//!
//! Provides a reqwest implementation of the `Geocoder` port against the
//! Mapbox places API.

mod dto;
mod mapbox;

pub use mapbox::{DEFAULT_MAPBOX_ENDPOINT, MapboxGeocoder};
