//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`ListingQuery`, `ListingCommand`, `ReviewCommand`,
//! `AccountService`) are called by inbound adapters. Driven ports
//! (repositories, `Geocoder`, `MediaStore`) are implemented by outbound
//! adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod geocoder;
mod listing_command;
mod listing_query;
mod listing_repository;
mod media_store;
mod review_command;
mod review_repository;
mod user_repository;

pub use account_service::AccountService;
#[cfg(test)]
pub use account_service::MockAccountService;
#[cfg(test)]
pub use geocoder::MockGeocoder;
pub use geocoder::{FixtureGeocoder, Geocoder, GeocoderError};
#[cfg(test)]
pub use listing_command::MockListingCommand;
pub use listing_command::{ListingCommand, ListingSubmission};
#[cfg(test)]
pub use listing_query::MockListingQuery;
pub use listing_query::{EditForm, ListingQuery};
#[cfg(test)]
pub use listing_repository::MockListingRepository;
pub use listing_repository::{ListingRepository, ListingRepositoryError};
#[cfg(test)]
pub use media_store::MockMediaStore;
pub use media_store::{MediaStore, MediaStoreError, PassthroughMediaStore};
#[cfg(test)]
pub use review_command::MockReviewCommand;
pub use review_command::ReviewCommand;
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::{ReviewRepository, ReviewRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserCredentials, UserPersistenceError, UserRepository};
