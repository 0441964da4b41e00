//! Listing aggregate and its owned value objects.
//!
//! A listing exclusively owns its [`Geometry`] and optional [`MediaRef`]; it
//! refers to its owner and reviews by identifier only.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ListingId, Review, ReviewId, User, UserId};

/// Validation errors raised by listing value constructors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ListingValidationError {
    #[error("price must be a finite number, got {value}")]
    PriceNotFinite { value: f64 },
    #[error("price must not be negative, got {value}")]
    NegativePrice { value: f64 },
    #[error("longitude must be within [-180, 180], got {value}")]
    LongitudeOutOfRange { value: f64 },
    #[error("latitude must be within [-90, 90], got {value}")]
    LatitudeOutOfRange { value: f64 },
    #[error("media url must not be empty")]
    EmptyMediaUrl,
}

/// Nightly price of a listing.
///
/// ## Invariants
/// - finite and not negative.
///
/// # Examples
/// ```
/// use wanderlust::domain::Price;
///
/// assert!(Price::new(1200.0).is_ok());
/// assert!(Price::new(-1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> Result<Self, ListingValidationError> {
        if !value.is_finite() {
            return Err(ListingValidationError::PriceNotFinite { value });
        }
        if value < 0.0 {
            return Err(ListingValidationError::NegativePrice { value });
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Price {
    type Error = ListingValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.0
    }
}

/// Kind tag carried by [`Geometry`]; only points are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
}

/// GeoJSON-style point geometry in `[longitude, latitude]` order.
///
/// # Examples
/// ```
/// use wanderlust::domain::Geometry;
///
/// let geometry = Geometry::point(73.8278, 15.4909).unwrap();
/// assert_eq!(geometry.coordinates(), [73.8278, 15.4909]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeometryDto", into = "GeometryDto")]
pub struct Geometry {
    longitude: f64,
    latitude: f64,
}

impl Geometry {
    /// Build a point, rejecting coordinates outside WGS84 bounds.
    pub fn point(longitude: f64, latitude: f64) -> Result<Self, ListingValidationError> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ListingValidationError::LongitudeOutOfRange { value: longitude });
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ListingValidationError::LatitudeOutOfRange { value: latitude });
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    pub fn kind(&self) -> GeometryKind {
        GeometryKind::Point
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Coordinates as `[longitude, latitude]`.
    pub fn coordinates(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

#[derive(Serialize, Deserialize)]
struct GeometryDto {
    #[serde(rename = "type")]
    kind: GeometryKind,
    coordinates: [f64; 2],
}

impl TryFrom<GeometryDto> for Geometry {
    type Error = ListingValidationError;

    fn try_from(value: GeometryDto) -> Result<Self, Self::Error> {
        let [longitude, latitude] = value.coordinates;
        Self::point(longitude, latitude)
    }
}

impl From<Geometry> for GeometryDto {
    fn from(value: Geometry) -> Self {
        Self {
            kind: value.kind(),
            coordinates: value.coordinates(),
        }
    }
}

/// Handle for a file that arrived with the request and already sits in media
/// storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadHandle {
    pub locator: String,
    pub filename: String,
}

/// Media reference bound to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    url: String,
    filename: String,
}

const UPLOAD_SEGMENT: &str = "/upload";
const PREVIEW_SEGMENT: &str = "/upload/w_250";

impl MediaRef {
    pub fn new(
        url: impl Into<String>,
        filename: impl Into<String>,
    ) -> Result<Self, ListingValidationError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(ListingValidationError::EmptyMediaUrl);
        }
        Ok(Self {
            url,
            filename: filename.into(),
        })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn filename(&self) -> &str {
        self.filename.as_str()
    }

    /// Reduced-width rendition used by the edit form.
    ///
    /// # Examples
    /// ```
    /// use wanderlust::domain::MediaRef;
    ///
    /// let media = MediaRef::new(
    ///     "https://res.cloudinary.com/demo/image/upload/v1/wanderlust/a.png",
    ///     "wanderlust/a",
    /// )
    /// .unwrap();
    /// assert_eq!(
    ///     media.preview_url(),
    ///     "https://res.cloudinary.com/demo/image/upload/w_250/v1/wanderlust/a.png"
    /// );
    /// ```
    pub fn preview_url(&self) -> String {
        self.url.replacen(UPLOAD_SEGMENT, PREVIEW_SEGMENT, 1)
    }
}

/// Validated listing fields as submitted by a caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub price: Price,
    pub location: String,
    pub country: String,
    pub category: Option<String>,
}

/// Persisted listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub location: String,
    pub country: String,
    pub category: Option<String>,
    pub image: Option<MediaRef>,
    pub geometry: Geometry,
    pub owner: UserId,
    pub reviews: Vec<ReviewId>,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Assemble a brand new listing owned by `owner` with no reviews.
    pub fn create(
        draft: ListingDraft,
        geometry: Geometry,
        image: Option<MediaRef>,
        owner: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        let ListingDraft {
            title,
            description,
            price,
            location,
            country,
            category,
        } = draft;
        Self {
            id: ListingId::random(),
            title,
            description,
            price,
            location,
            country,
            category,
            image,
            geometry,
            owner,
            reviews: Vec::new(),
            created_at,
        }
    }

    pub fn is_owned_by(&self, principal: &UserId) -> bool {
        &self.owner == principal
    }

    /// Apply `changes` in place. Owner, geometry, and reviews stay as they are.
    pub fn apply(&mut self, changes: &ListingChanges) {
        let fields = &changes.fields;
        self.title.clone_from(&fields.title);
        self.description.clone_from(&fields.description);
        self.price = fields.price;
        self.location.clone_from(&fields.location);
        self.country.clone_from(&fields.country);
        self.category.clone_from(&fields.category);
        if let Some(image) = &changes.image {
            self.image = Some(image.clone());
        }
    }
}

/// Field changes written by an update.
///
/// `image: None` leaves the stored image untouched; `Some` replaces it whole.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingChanges {
    pub fields: ListingDraft,
    pub image: Option<MediaRef>,
}

/// Filter applied when listing the collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListingFilter {
    #[default]
    All,
    /// Exact category match.
    Category(String),
    /// Case-insensitive substring across title, location, country, category.
    Search(String),
}

impl ListingFilter {
    /// Build a search filter; blank queries mean no filter.
    ///
    /// # Examples
    /// ```
    /// use wanderlust::domain::ListingFilter;
    ///
    /// assert_eq!(ListingFilter::search("   "), ListingFilter::All);
    /// assert_eq!(ListingFilter::search(" Goa "), ListingFilter::Search("Goa".into()));
    /// ```
    pub fn search(query: &str) -> Self {
        let query = query.trim();
        if query.is_empty() {
            Self::All
        } else {
            Self::Search(query.to_owned())
        }
    }

    /// Whether `listing` passes the filter.
    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => listing.category.as_deref() == Some(category.as_str()),
            Self::Search(query) => {
                let needle = query.to_lowercase();
                [
                    Some(listing.title.as_str()),
                    Some(listing.location.as_str()),
                    Some(listing.country.as_str()),
                    listing.category.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|haystack| haystack.to_lowercase().contains(&needle))
            }
        }
    }
}

impl fmt::Display for ListingFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Category(category) => write!(f, "category={category}"),
            Self::Search(query) => write!(f, "q={query}"),
        }
    }
}

/// Review expanded with its author.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDetails {
    pub review: Review,
    /// `None` when the author account no longer exists.
    pub author: Option<User>,
}

/// Listing expanded with its owner and reviews, in reference order.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDetails {
    pub listing: Listing,
    pub owner: Option<User>,
    pub reviews: Vec<ReviewDetails>,
}
