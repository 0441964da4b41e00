//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on driving
//! ports, so they can be exercised with in-memory or mocked services.

use std::sync::Arc;

use crate::domain::ports::{AccountService, ListingCommand, ListingQuery, ReviewCommand};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub listings: Arc<dyn ListingQuery>,
    pub listing_commands: Arc<dyn ListingCommand>,
    pub reviews: Arc<dyn ReviewCommand>,
    pub accounts: Arc<dyn AccountService>,
}

impl HttpState {
    /// Bundle ports backed by a single service implementing all listing
    /// use-cases.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use wanderlust::domain::ports::{FixtureGeocoder, PassthroughMediaStore};
    /// use wanderlust::domain::{ListingService, UserAccountService};
    /// use wanderlust::inbound::http::state::HttpState;
    /// use wanderlust::outbound::memory::InMemoryStore;
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let service = Arc::new(ListingService::new(
    ///     store.clone(),
    ///     store.clone(),
    ///     Arc::new(FixtureGeocoder),
    ///     Arc::new(PassthroughMediaStore),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let state = HttpState::from_service(service, Arc::new(UserAccountService::new(store)));
    /// let _listings = state.listings.clone();
    /// ```
    pub fn from_service<S>(service: Arc<S>, accounts: Arc<dyn AccountService>) -> Self
    where
        S: ListingQuery + ListingCommand + ReviewCommand + 'static,
    {
        Self {
            listings: service.clone(),
            listing_commands: service.clone(),
            reviews: service,
            accounts,
        }
    }
}
