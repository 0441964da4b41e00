//! Driven port binding uploaded files to listings.

use async_trait::async_trait;

use crate::domain::{MediaRef, UploadHandle};

use super::define_port_error;

define_port_error! {
    /// Errors raised while attaching media.
    pub enum MediaStoreError {
        /// The handle does not point at an acceptable stored object.
        Rejected { message: String } => "media rejected: {message}",
        /// The media backend could not be reached.
        Unavailable { message: String } => "media store unavailable: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Turn an upload handle into the reference stored on a listing.
    async fn attach(&self, upload: &UploadHandle) -> Result<MediaRef, MediaStoreError>;
}

/// Accepts any non-empty locator as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughMediaStore;

#[async_trait]
impl MediaStore for PassthroughMediaStore {
    async fn attach(&self, upload: &UploadHandle) -> Result<MediaRef, MediaStoreError> {
        MediaRef::new(upload.locator.clone(), upload.filename.clone())
            .map_err(|err| MediaStoreError::rejected(err.to_string()))
    }
}
