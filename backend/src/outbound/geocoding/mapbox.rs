//! Reqwest-backed Mapbox geocoder adapter.
//!
//! This adapter owns transport details only: URL construction, timeout and
//! HTTP error mapping, and JSON decoding of the best match.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::FeatureCollectionDto;
use crate::domain::Geometry;
use crate::domain::ports::{Geocoder, GeocoderError};

/// Public Mapbox places endpoint.
pub const DEFAULT_MAPBOX_ENDPOINT: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";
const USER_AGENT: &str = "wanderlust-backend/0.1";

/// Geocoder that asks Mapbox for the single best match of a query.
pub struct MapboxGeocoder {
    client: Client,
    endpoint: Url,
    access_token: String,
}

impl MapboxGeocoder {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            access_token: access_token.into(),
        })
    }

    fn request_url(&self, query: &str) -> Result<Url, GeocoderError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| GeocoderError::rejected("geocoding endpoint cannot be a base URL"))?
            .pop_if_empty()
            .push(&format!("{query}.json"));
        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token)
            .append_pair("limit", "1");
        Ok(url)
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    async fn forward_geocode(&self, query: &str) -> Result<Geometry, GeocoderError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(GeocoderError::no_match(query));
        }
        let url = self.request_url(trimmed)?;
        debug!(query = trimmed, "forward geocoding");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_best_match(body.as_ref())?.ok_or_else(|| GeocoderError::no_match(trimmed))
    }
}

fn parse_best_match(body: &[u8]) -> Result<Option<Geometry>, GeocoderError> {
    let decoded: FeatureCollectionDto = serde_json::from_slice(body).map_err(|error| {
        GeocoderError::decode(format!("invalid geocoding JSON payload: {error}"))
    })?;
    decoded.into_best_match().map_err(GeocoderError::decode)
}

fn map_transport_error(error: reqwest::Error) -> GeocoderError {
    // Drop the URL so the access token never reaches logs.
    let error = error.without_url();
    if error.is_timeout() {
        GeocoderError::timeout(error.to_string())
    } else {
        GeocoderError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GeocoderError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => GeocoderError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            GeocoderError::timeout(message)
        }
        _ if status.is_client_error() => GeocoderError::rejected(message),
        _ => GeocoderError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
