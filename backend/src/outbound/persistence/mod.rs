//! PostgreSQL persistence adapters built on Diesel.
//!
//! Repositories translate between the internal row structs in `models.rs`
//! and domain types; no listing rules live here. Connections come from a
//! `bb8` pool driven by `diesel-async`.
//!
//! ```ignore
//! use wanderlust::outbound::persistence::{
//!     DbPool, DieselListingRepository, PoolConfig, run_migrations,
//! };
//!
//! let url = "postgres://localhost/wanderlust";
//! run_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let listings = DieselListingRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_listing_repository;
mod diesel_review_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_listing_repository::DieselListingRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError, run_migrations};
