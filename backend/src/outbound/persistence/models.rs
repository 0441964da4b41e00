//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{listings, reviews, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Row struct for reading from the listings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = listings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ListingRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub country: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub image_filename: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
    pub owner_id: Uuid,
    pub review_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new listings.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = listings)]
pub(crate) struct NewListingRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub price: f64,
    pub location: &'a str,
    pub country: &'a str,
    pub category: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub image_filename: Option<&'a str>,
    pub longitude: f64,
    pub latitude: f64,
    pub owner_id: Uuid,
    pub review_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Changeset for the editable listing fields.
///
/// `category` is written even when `None` so clearing it sticks.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = listings)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ListingFieldsUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub price: f64,
    pub location: &'a str,
    pub country: &'a str,
    pub category: Option<&'a str>,
}

/// Changeset replacing the listing image.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = listings)]
pub(crate) struct ListingImageUpdate<'a> {
    pub image_url: &'a str,
    pub image_filename: &'a str,
}

/// Row struct for reading from the reviews table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}
