//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories on Diesel
//! - **memory**: process-local repositories for development and tests
//! - **geocoding**: Mapbox forward geocoding over reqwest
//! - **media**: Cloudinary upload binding
//!
//! Adapters translate between domain types and infrastructure formats and
//! hold no listing rules.

pub mod geocoding;
pub mod media;
pub mod memory;
pub mod persistence;
