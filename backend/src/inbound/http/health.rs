//! Liveness and readiness probes.
//!
//! The server marks itself ready once storage is reachable and migrations
//! have run, and unhealthy when it starts draining.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use utoipa::ToSchema;

/// Shared probe flags. Starts live but not ready.
#[derive(Debug)]
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    storage: &'static str,
}

impl HealthState {
    /// `storage` names the backing store reported by the readiness probe.
    pub fn new(storage: &'static str) -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            storage,
        }
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness so orchestrators stop routing traffic during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

/// Probe response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProbeBody {
    #[schema(value_type = String, example = "ok")]
    pub status: &'static str,
    /// Backing store in use: `postgres` or `memory`.
    #[schema(value_type = String, example = "postgres")]
    pub storage: &'static str,
}

fn probe(ok: bool, failing: &'static str, storage: &'static str) -> HttpResponse {
    let mut response = if ok {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(ProbeBody {
            status: if ok { "ok" } else { failing },
            storage,
        })
}

/// Readiness probe.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Ready to handle traffic", body = ProbeBody),
        (status = 503, description = "Still starting", body = ProbeBody)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    probe(state.is_ready(), "starting", state.storage)
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Process is alive", body = ProbeBody),
        (status = 503, description = "Draining", body = ProbeBody)
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    probe(state.is_alive(), "draining", state.storage)
}
