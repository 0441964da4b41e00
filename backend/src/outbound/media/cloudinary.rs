//! Cloudinary-backed `MediaStore`.
//!
//! Uploads reach Cloudinary before the request is handled, so attaching only
//! checks that the locator names an asset delivered from the configured cloud
//! and keeps its public id as the filename.

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use crate::domain::ports::{MediaStore, MediaStoreError};
use crate::domain::{MediaRef, UploadHandle};

/// Delivery host for Cloudinary assets.
pub const CLOUDINARY_HOST: &str = "res.cloudinary.com";

/// Accepts upload handles that point at the configured Cloudinary cloud.
#[derive(Debug, Clone)]
pub struct CloudinaryMediaStore {
    cloud_name: String,
}

impl CloudinaryMediaStore {
    pub fn new(cloud_name: impl Into<String>) -> Self {
        Self {
            cloud_name: cloud_name.into(),
        }
    }

    fn check_locator(&self, locator: &str) -> Result<Url, MediaStoreError> {
        let url = Url::parse(locator.trim())
            .map_err(|err| MediaStoreError::rejected(format!("locator is not a URL: {err}")))?;
        if url.scheme() != "https" || url.host_str() != Some(CLOUDINARY_HOST) {
            return Err(MediaStoreError::rejected(
                "must be delivered over https from Cloudinary",
            ));
        }
        let mut segments = url.path_segments().into_iter().flatten();
        if segments.next() != Some(self.cloud_name.as_str()) {
            return Err(MediaStoreError::rejected(format!(
                "must belong to the '{}' cloud",
                self.cloud_name
            )));
        }
        if !segments.any(|segment| segment == "upload") {
            return Err(MediaStoreError::rejected("must be an uploaded asset"));
        }
        Ok(url)
    }
}

#[async_trait]
impl MediaStore for CloudinaryMediaStore {
    async fn attach(&self, upload: &UploadHandle) -> Result<MediaRef, MediaStoreError> {
        let url = self.check_locator(&upload.locator)?;
        let filename = upload.filename.trim();
        if filename.is_empty() {
            return Err(MediaStoreError::rejected("filename is required"));
        }
        debug!(filename, "attaching Cloudinary asset");
        MediaRef::new(url.to_string(), filename)
            .map_err(|err| MediaStoreError::rejected(err.to_string()))
    }
}
