//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay free of `utoipa`. The wrappers here mirror their shape
//! and register under the domain type's name so handlers can reference them
//! in `#[utoipa::path]` annotations.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// Geocoding or media attachment failed upstream.
    #[schema(rename = "enrichment_failed")]
    EnrichmentFailed,
    /// A backing store is temporarily unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "\"title\" is required")]
    message: String,
    /// Correlation identifier matching the `trace-id` response header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Per-field validation errors or other structured context.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::ListingInput`].
///
/// Every field is optional on the wire so a single response can report all
/// missing fields at once.
#[derive(ToSchema)]
#[schema(as = crate::domain::ListingInput)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ListingInputSchema {
    #[schema(example = "Cozy Beachfront Cottage")]
    title: Option<String>,
    #[schema(example = "Escape to this charming cottage.")]
    description: Option<String>,
    /// Non-negative number, or a string holding one.
    #[schema(value_type = Option<f64>, example = 1500)]
    price: Option<serde_json::Value>,
    #[schema(example = "Malibu")]
    location: Option<String>,
    #[schema(example = "United States")]
    country: Option<String>,
    /// Free-form category label; also accepted as `types`.
    #[schema(example = "beach")]
    category: Option<String>,
}

/// OpenAPI schema for [`crate::domain::ReviewInput`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ReviewInput)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ReviewInputSchema {
    /// Integer from 1 to 5.
    #[schema(value_type = Option<i64>, minimum = 1, maximum = 5, example = 4)]
    rating: Option<serde_json::Value>,
    #[schema(example = "Lovely stay.")]
    comment: Option<String>,
}
