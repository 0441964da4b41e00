//! HTTP inbound adapter: actix-web handlers for listings, reviews, accounts,
//! and health probes.

pub mod error;
pub mod health;
pub mod listings;
pub mod listings_dto;
pub mod redirect;
pub mod reviews;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;
