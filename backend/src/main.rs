//! Wanderlust entry-point: loads settings, wires adapters, and serves HTTP.

mod server;

use std::ffi::OsString;

use ortho_config::OrthoConfig;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{AppSettings, create_server, prepare_config};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args: Vec<OsString> = std::env::args_os().collect();
    let settings = AppSettings::load_from_iter(args).map_err(|e| {
        error!(error = %e, "failed to load settings");
        std::io::Error::other(format!("failed to load settings: {e}"))
    })?;

    let config = prepare_config(&settings).await.inspect_err(|e| {
        error!(error = %e, "startup failed");
    })?;
    let (server, health_state) = create_server(config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
