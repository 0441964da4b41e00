//! Builders for HTTP state over PostgreSQL or in-memory repositories.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::warn;

use wanderlust::domain::ports::{
    Geocoder, ListingRepository, MediaStore, ReviewRepository, UserRepository,
};
use wanderlust::domain::{ListingService, UserAccountService};
use wanderlust::inbound::http::state::HttpState;
use wanderlust::outbound::memory::InMemoryStore;
use wanderlust::outbound::persistence::{
    DieselListingRepository, DieselReviewRepository, DieselUserRepository,
};

use super::ServerConfig;

/// Name reported by the readiness probe for the PostgreSQL backend.
pub const STORAGE_POSTGRES: &str = "postgres";
/// Name reported by the readiness probe for the process-local store.
pub const STORAGE_MEMORY: &str = "memory";

fn wire<L, R, U>(
    listings: Arc<L>,
    reviews: Arc<R>,
    users: Arc<U>,
    geocoder: Arc<dyn Geocoder>,
    media: Arc<dyn MediaStore>,
) -> HttpState
where
    L: ListingRepository + 'static,
    R: ReviewRepository + 'static,
    U: UserRepository + 'static,
{
    let service = Arc::new(ListingService::new(
        listings,
        reviews,
        geocoder,
        media,
        Arc::new(DefaultClock),
    ));
    HttpState::from_service(service, Arc::new(UserAccountService::new(users)))
}

/// Build handler state and name the storage backend it uses.
///
/// Falls back to an empty in-memory store when no database pool is
/// configured; its contents vanish on restart.
pub fn build_http_state(config: &ServerConfig) -> (HttpState, &'static str) {
    let geocoder = config.geocoder.clone();
    let media = config.media.clone();
    match &config.db_pool {
        Some(pool) => (
            wire(
                Arc::new(DieselListingRepository::new(pool.clone())),
                Arc::new(DieselReviewRepository::new(pool.clone())),
                Arc::new(DieselUserRepository::new(pool.clone())),
                geocoder,
                media,
            ),
            STORAGE_POSTGRES,
        ),
        None => {
            warn!("no database configured; listings are kept in memory");
            let store = Arc::new(InMemoryStore::new());
            (
                wire(store.clone(), store.clone(), store, geocoder, media),
                STORAGE_MEMORY,
            )
        }
    }
}
