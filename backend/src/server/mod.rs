//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, ServerConfig};

use state_builders::build_http_state;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultEnv;
use tracing::{info, warn};

use wanderlust::Trace;
#[cfg(debug_assertions)]
use wanderlust::doc::ApiDoc;
#[cfg(debug_assertions)]
use wanderlust::domain::ports::FixtureGeocoder;
use wanderlust::domain::ports::{Geocoder, MediaStore, PassthroughMediaStore};
use wanderlust::inbound::http::error::{json_error_handler, page_not_found};
use wanderlust::inbound::http::health::{HealthState, live, ready};
use wanderlust::inbound::http::redirect::root;
use wanderlust::inbound::http::session_config::{
    BuildMode, SessionSettings, session_settings_from_env,
};
use wanderlust::inbound::http::state::HttpState;
use wanderlust::inbound::http::{listings, reviews, users};
use wanderlust::outbound::geocoding::MapboxGeocoder;
use wanderlust::outbound::media::CloudinaryMediaStore;
use wanderlust::outbound::persistence::{DbPool, PoolConfig, run_migrations};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
fn fallback_geocoder() -> std::io::Result<Arc<dyn Geocoder>> {
    warn!("WANDERLUST_MAPBOX_TOKEN not set; using fixture geocoder");
    Ok(Arc::new(FixtureGeocoder))
}

#[cfg(not(debug_assertions))]
fn fallback_geocoder() -> std::io::Result<Arc<dyn Geocoder>> {
    Err(std::io::Error::other(
        "WANDERLUST_MAPBOX_TOKEN is required in release builds",
    ))
}

fn build_geocoder(settings: &AppSettings) -> std::io::Result<Arc<dyn Geocoder>> {
    let Some(token) = settings.mapbox_token() else {
        return fallback_geocoder();
    };
    let endpoint = settings
        .geocoding_endpoint()
        .map_err(std::io::Error::other)?;
    let geocoder = MapboxGeocoder::new(endpoint, token, settings.geocoding_timeout())
        .map_err(|e| std::io::Error::other(format!("geocoder client setup failed: {e}")))?;
    Ok(Arc::new(geocoder))
}

fn build_media_store(settings: &AppSettings) -> Arc<dyn MediaStore> {
    match settings.media_cloud_name() {
        Some(cloud) => Arc::new(CloudinaryMediaStore::new(cloud)),
        None => {
            warn!("WANDERLUST_MEDIA_CLOUD_NAME not set; accepting any image locator");
            Arc::new(PassthroughMediaStore)
        }
    }
}

/// Resolve settings into adapters, applying migrations when a database is
/// configured.
///
/// # Errors
/// Returns [`std::io::Error`] when session settings are invalid, a required
/// adapter cannot be built, or the database cannot be migrated.
pub async fn prepare_config(settings: &AppSettings) -> std::io::Result<ServerConfig> {
    let env = DefaultEnv::new();
    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let config = ServerConfig::new(
        session,
        bind_addr,
        build_geocoder(settings)?,
        build_media_store(settings),
    );

    let Some(url) = settings.database_url() else {
        return Ok(config);
    };
    run_migrations(url)
        .await
        .map_err(|e| std::io::Error::other(format!("database migration failed: {e}")))?;
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.db_max_connections()))
        .await
        .map_err(|e| std::io::Error::other(format!("database pool setup failed: {e}")))?;
    Ok(config.with_db_pool(pool))
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: SessionSettings,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(session.middleware())
        .wrap(Trace)
        .service(root)
        .service(ready)
        .service(live)
        .configure(listings::configure)
        .configure(reviews::configure)
        .configure(users::configure);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.default_service(web::to(page_not_found))
}

/// Construct an Actix HTTP server from a prepared configuration.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener, plus the
/// health state it reports through.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<(Server, web::Data<HealthState>)> {
    let (http_state, storage) = build_http_state(&config);
    let health_state = web::Data::new(HealthState::new(storage));
    let http_state = web::Data::new(http_state);
    let session = config.session.clone();
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            session: session.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    info!(addr = %config.bind_addr, storage, "listening");
    health_state.mark_ready();
    Ok((server, health_state))
}

#[cfg(test)]
mod tests {
    //! Wiring tests for the assembled application.

    use super::*;
    use actix_web::cookie::{Key, SameSite};
    use actix_web::http::StatusCode;
    use actix_web::http::header::LOCATION;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::Value;
    use wanderlust::domain::ports::FixtureGeocoder;

    use super::state_builders::STORAGE_MEMORY;

    fn memory_config() -> ServerConfig {
        ServerConfig::new(
            SessionSettings {
                key: Key::generate(),
                cookie_secure: false,
                same_site: SameSite::Lax,
            },
            "127.0.0.1:0".parse().expect("addr"),
            Arc::new(FixtureGeocoder),
            Arc::new(PassthroughMediaStore),
        )
    }

    fn deps(is_ready: bool) -> AppDependencies {
        let config = memory_config();
        let (http_state, storage) = build_http_state(&config);
        let health_state = web::Data::new(HealthState::new(storage));
        if is_ready {
            health_state.mark_ready();
        }
        AppDependencies {
            health_state,
            http_state: web::Data::new(http_state),
            session: config.session,
        }
    }

    #[actix_web::test]
    async fn root_redirects_to_the_index() {
        let app = test::init_service(build_app(deps(true))).await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/listings")
        );
    }

    #[rstest]
    #[case(true, StatusCode::OK)]
    #[case(false, StatusCode::SERVICE_UNAVAILABLE)]
    #[actix_web::test]
    async fn readiness_reports_memory_storage(#[case] is_ready: bool, #[case] status: StatusCode) {
        let app = test::init_service(build_app(deps(is_ready))).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/health/ready").to_request())
                .await;
        assert_eq!(res.status(), status);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["storage"], STORAGE_MEMORY);
    }

    #[actix_web::test]
    async fn unknown_paths_get_a_json_not_found() {
        let app = test::init_service(build_app(deps(true))).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/nowhere/at/all").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.headers().contains_key("trace-id"));
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "not_found");
    }

    #[actix_web::test]
    async fn index_is_served_with_the_session_cookie() {
        let app = test::init_service(build_app(deps(true))).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/listings").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert!(body["listings"].as_array().is_some_and(Vec::is_empty));
    }

    #[cfg(debug_assertions)]
    #[actix_web::test]
    async fn openapi_document_is_served_in_debug_builds() {
        let app = test::init_service(build_app(deps(true))).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api-docs/openapi.json")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert!(body["paths"].get("/listings").is_some());
    }
}
