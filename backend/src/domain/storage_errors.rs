//! Translation of driven-port failures into domain errors.

use tracing::{error, warn};

use super::Error;
use super::ports::{
    GeocoderError, ListingRepositoryError, MediaStoreError, ReviewRepositoryError,
    UserPersistenceError,
};

pub(crate) fn map_listing_error(err: ListingRepositoryError) -> Error {
    match err {
        ListingRepositoryError::Connection { message } => {
            warn!(%message, "listing storage unavailable");
            Error::service_unavailable(format!("listing repository unavailable: {message}"))
        }
        ListingRepositoryError::Query { message } => {
            error!(%message, "listing storage query failed");
            Error::internal(format!("listing repository error: {message}"))
        }
    }
}

pub(crate) fn map_review_error(err: ReviewRepositoryError) -> Error {
    match err {
        ReviewRepositoryError::Connection { message } => {
            warn!(%message, "review storage unavailable");
            Error::service_unavailable(format!("review repository unavailable: {message}"))
        }
        ReviewRepositoryError::Query { message } => {
            error!(%message, "review storage query failed");
            Error::internal(format!("review repository error: {message}"))
        }
    }
}

pub(crate) fn map_user_error(err: UserPersistenceError) -> Error {
    match err {
        UserPersistenceError::Connection { message } => {
            warn!(%message, "user storage unavailable");
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            error!(%message, "user storage query failed");
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { .. } => {
            Error::invalid_request("A user with the given username is already registered")
        }
    }
}

pub(crate) fn map_geocoder_error(err: GeocoderError) -> Error {
    warn!(kind = err.kind(), error = %err, "geocoding failed");
    match err {
        GeocoderError::NoMatch { query } => {
            Error::enrichment_failed(format!("no location found for '{query}'"))
        }
        other => Error::enrichment_failed(format!("location lookup failed: {other}")),
    }
}

pub(crate) fn map_media_error(err: MediaStoreError) -> Error {
    warn!(kind = err.kind(), error = %err, "media attachment failed");
    match err {
        MediaStoreError::Rejected { message } => {
            Error::invalid_request(format!("\"image\" {message}"))
        }
        MediaStoreError::Unavailable { message } => {
            Error::enrichment_failed(format!("media store unavailable: {message}"))
        }
    }
}
