//! Listing and review request/response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{EditForm, ListingSubmission};
use crate::domain::{
    Listing, ListingDetails, ListingId, ListingInput, MediaRef, Review, ReviewDetails,
    ReviewInput, UploadHandle, User,
};
use crate::inbound::http::schemas::{ListingInputSchema, ReviewInputSchema};
use crate::inbound::http::session::Flash;

/// Search query accepted by the index and search routes.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring matched against title, location, country,
    /// and category. Blank means no filter.
    pub q: Option<String>,
}

/// File already stored by the media host, as handed over by the upload step.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UploadRequest {
    #[schema(example = "https://res.cloudinary.com/demo/image/upload/v1/wanderlust/a.png")]
    pub locator: String,
    #[schema(example = "wanderlust/a")]
    pub filename: String,
}

/// Body for `POST /listings` and `PUT /listings/{id}`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ListingRequest {
    #[schema(value_type = ListingInputSchema)]
    pub listing: ListingInput,
    /// Optional image; on update the current image is kept when absent.
    pub image: Option<UploadRequest>,
}

impl From<ListingRequest> for ListingSubmission {
    fn from(value: ListingRequest) -> Self {
        Self {
            input: value.listing,
            upload: value.image.map(|image| UploadHandle {
                locator: image.locator,
                filename: image.filename,
            }),
        }
    }
}

/// Body for `POST /listings/{id}/reviews`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ReviewRequest {
    #[schema(value_type = ReviewInputSchema)]
    pub review: ReviewInput,
}

impl From<ReviewRequest> for ReviewInput {
    fn from(value: ReviewRequest) -> Self {
        value.review
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImageResponse {
    pub url: String,
    pub filename: String,
}

impl From<&MediaRef> for ImageResponse {
    fn from(media: &MediaRef) -> Self {
        Self {
            url: media.url().to_owned(),
            filename: media.filename().to_owned(),
        }
    }
}

/// GeoJSON point, longitude first.
#[derive(Debug, Serialize, ToSchema)]
pub struct PointResponse {
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "Point")]
    pub kind: &'static str,
    #[schema(example = json!([73.7554, 15.5439]))]
    pub coordinates: [f64; 2],
}

/// A stored listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub country: String,
    pub category: Option<String>,
    pub image: Option<ImageResponse>,
    pub geometry: PointResponse,
    pub owner: String,
    /// Review ids in the order they were added.
    pub reviews: Vec<String>,
    pub created_at: String,
}

impl From<&Listing> for ListingResponse {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id.to_string(),
            title: listing.title.clone(),
            description: listing.description.clone(),
            price: listing.price.value(),
            location: listing.location.clone(),
            country: listing.country.clone(),
            category: listing.category.clone(),
            image: listing.image.as_ref().map(ImageResponse::from),
            geometry: PointResponse {
                kind: "Point",
                coordinates: listing.geometry.coordinates(),
            },
            owner: listing.owner.to_string(),
            reviews: listing.reviews.iter().map(ToString::to_string).collect(),
            created_at: listing.created_at.to_rfc3339(),
        }
    }
}

/// Public view of an account. Email addresses are never exposed.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
        }
    }
}

/// A review with its author expanded.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub listing: String,
    pub rating: u8,
    pub comment: String,
    pub author_id: String,
    /// Absent when the author account no longer exists.
    pub author: Option<UserSummary>,
    pub created_at: String,
}

impl ReviewResponse {
    fn new(review: &Review, author: Option<&User>) -> Self {
        Self {
            id: review.id.to_string(),
            listing: review.listing.to_string(),
            rating: review.rating.value(),
            comment: review.comment.clone(),
            author_id: review.author.to_string(),
            author: author.map(UserSummary::from),
            created_at: review.created_at.to_rfc3339(),
        }
    }
}

impl From<&ReviewDetails> for ReviewResponse {
    fn from(details: &ReviewDetails) -> Self {
        Self::new(&details.review, details.author.as_ref())
    }
}

/// Body of `GET /listings` and its filtered variants.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListingIndexResponse {
    pub listings: Vec<ListingResponse>,
    /// Flash messages queued by the previous request.
    pub flash: Flash,
}

/// Body of `GET /listings/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListingShowResponse {
    pub listing: ListingResponse,
    /// Absent when the owner account no longer exists.
    pub owner: Option<UserSummary>,
    pub reviews: Vec<ReviewResponse>,
    pub flash: Flash,
}

impl ListingShowResponse {
    pub fn new(details: &ListingDetails, flash: Flash) -> Self {
        Self {
            listing: ListingResponse::from(&details.listing),
            owner: details.owner.as_ref().map(UserSummary::from),
            reviews: details.reviews.iter().map(ReviewResponse::from).collect(),
            flash,
        }
    }
}

/// Where a form posts to.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FormResponse {
    #[schema(example = "/listings")]
    pub action: String,
    #[schema(example = "POST")]
    pub method: String,
    pub flash: Flash,
}

impl FormResponse {
    pub fn new(action: impl Into<String>, method: &str, flash: Flash) -> Self {
        Self {
            action: action.into(),
            method: method.to_owned(),
            flash,
        }
    }
}

/// Body of `GET /listings/{id}/edit`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditFormResponse {
    #[serde(flatten)]
    pub form: FormResponse,
    pub listing: ListingResponse,
    /// Reduced-width rendition of the current image.
    pub preview_url: Option<String>,
}

impl EditFormResponse {
    pub fn new(id: &ListingId, edit: &EditForm, flash: Flash) -> Self {
        Self {
            form: FormResponse::new(format!("/listings/{id}"), "PUT", flash),
            listing: ListingResponse::from(&edit.listing),
            preview_url: edit.preview_url.clone(),
        }
    }
}
