//! Driven port for forward geocoding.
//!
//! Resolves free-text locations to a single best-match point. Adapters own
//! transport concerns such as timeouts; the domain only distinguishes "no
//! match" from everything else when deciding what to report.

use async_trait::async_trait;

use crate::domain::Geometry;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while resolving a location.
    pub enum GeocoderError {
        /// Network transport failed before receiving a response.
        Transport { message: String } => "geocoder transport failed: {message}",
        /// Lookup exceeded its deadline.
        Timeout { message: String } => "geocoder timeout: {message}",
        /// Provider rate-limited the request.
        RateLimited { message: String } => "geocoder rate limited request: {message}",
        /// Provider refused the request (bad credential, malformed query).
        Rejected { message: String } => "geocoder rejected request: {message}",
        /// Response body could not be decoded.
        Decode { message: String } => "geocoder response decode failed: {message}",
        /// Provider answered but found nothing.
        NoMatch { query: String } => "no geocoding match for '{query}'",
    }
}

/// Port for resolving locations to coordinates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `query` to the provider's best match.
    async fn forward_geocode(&self, query: &str) -> Result<Geometry, GeocoderError>;
}

/// Offline geocoder for development and tests.
///
/// Derives a stable pseudo-location from the query text so repeated lookups
/// agree. Blank queries have no match.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureGeocoder;

#[async_trait]
impl Geocoder for FixtureGeocoder {
    async fn forward_geocode(&self, query: &str) -> Result<Geometry, GeocoderError> {
        let normalized = query.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(GeocoderError::no_match(query));
        }
        // FNV-1a
        let hash = normalized
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64, |acc, byte| {
                (acc ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
            });
        let longitude = (hash % 36_000) as f64 / 100.0 - 180.0;
        let latitude = ((hash >> 32) % 18_000) as f64 / 100.0 - 90.0;
        Geometry::point(longitude, latitude).map_err(|err| GeocoderError::decode(err.to_string()))
    }
}
