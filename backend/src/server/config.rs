//! Server settings loaded via OrthoConfig and the assembled server
//! configuration.

use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use wanderlust::domain::ports::{Geocoder, MediaStore};
use wanderlust::inbound::http::session_config::SessionSettings;
use wanderlust::outbound::geocoding::DEFAULT_MAPBOX_ENDPOINT;
use wanderlust::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_GEOCODING_TIMEOUT_SECS: u64 = 10;

/// Values read from `WANDERLUST_*` environment variables, configuration
/// files, and command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "WANDERLUST")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL. The in-memory store is used when absent.
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    /// Mapbox access token for forward geocoding.
    pub mapbox_token: Option<String>,
    /// Override for the Mapbox places endpoint.
    pub geocoding_endpoint: Option<String>,
    pub geocoding_timeout_secs: Option<u64>,
    /// Cloudinary cloud that receives listing images.
    pub media_cloud_name: Option<String>,
}

/// Settings that are present but unusable.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: AddrParseError,
    },
    #[error("invalid geocoding endpoint '{value}': {source}")]
    GeocodingEndpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl AppSettings {
    /// Return the listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = non_blank(self.bind_addr.as_ref()).unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_ref())
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    pub fn mapbox_token(&self) -> Option<&str> {
        non_blank(self.mapbox_token.as_ref())
    }

    /// Return the geocoding endpoint, defaulting to the public Mapbox API.
    pub fn geocoding_endpoint(&self) -> Result<Url, SettingsError> {
        let value =
            non_blank(self.geocoding_endpoint.as_ref()).unwrap_or(DEFAULT_MAPBOX_ENDPOINT);
        Url::parse(value).map_err(|source| SettingsError::GeocodingEndpoint {
            value: value.to_owned(),
            source,
        })
    }

    pub fn geocoding_timeout(&self) -> Duration {
        Duration::from_secs(
            self.geocoding_timeout_secs
                .unwrap_or(DEFAULT_GEOCODING_TIMEOUT_SECS),
        )
    }

    pub fn media_cloud_name(&self) -> Option<&str> {
        non_blank(self.media_cloud_name.as_ref())
    }
}

/// Everything the server needs once settings have been resolved into
/// adapters.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) geocoder: Arc<dyn Geocoder>,
    pub(crate) media: Arc<dyn MediaStore>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(
        session: SessionSettings,
        bind_addr: SocketAddr,
        geocoder: Arc<dyn Geocoder>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            session,
            bind_addr,
            db_pool: None,
            geocoder,
            media,
        }
    }

    /// Attach a database connection pool.
    ///
    /// When provided, repositories are backed by PostgreSQL instead of the
    /// in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
