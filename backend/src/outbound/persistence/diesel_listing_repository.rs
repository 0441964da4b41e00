//! PostgreSQL-backed `ListingRepository`.
//!
//! Review references live in the `review_ids` array column so their order is
//! the order reviews were attached. Appends and removals are single-statement
//! array updates and therefore atomic per listing.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ListingRepository, ListingRepositoryError};
use crate::domain::{
    Geometry, Listing, ListingChanges, ListingDetails, ListingFilter, ListingId, MediaRef, Price,
    ReviewDetails, ReviewId, User, UserId,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_review_repository::row_to_review;
use super::diesel_user_repository::row_to_credentials;
use super::models::{
    ListingFieldsUpdate, ListingImageUpdate, ListingRow, NewListingRow, ReviewRow, UserRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{listings, reviews, users};

mod sql {
    use diesel::sql_types::{Array, Uuid};

    diesel::define_sql_function! {
        fn array_append(array: Array<Uuid>, element: Uuid) -> Array<Uuid>;
    }

    diesel::define_sql_function! {
        fn array_remove(array: Array<Uuid>, element: Uuid) -> Array<Uuid>;
    }
}

/// Diesel-backed implementation of the listing repository port.
#[derive(Clone)]
pub struct DieselListingRepository {
    pool: DbPool,
}

impl DieselListingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ListingRepositoryError {
    map_pool_error(error, ListingRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ListingRepositoryError {
    map_diesel_error(
        error,
        ListingRepositoryError::query,
        ListingRepositoryError::connection,
    )
}

fn corrupt(err: impl std::fmt::Display) -> ListingRepositoryError {
    ListingRepositoryError::query(format!("stored listing is invalid: {err}"))
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn row_to_listing(row: ListingRow) -> Result<Listing, ListingRepositoryError> {
    let ListingRow {
        id,
        title,
        description,
        price,
        location,
        country,
        category,
        image_url,
        image_filename,
        longitude,
        latitude,
        owner_id,
        review_ids,
        created_at,
    } = row;
    let image = image_url
        .map(|url| MediaRef::new(url, image_filename.unwrap_or_default()))
        .transpose()
        .map_err(corrupt)?;
    Ok(Listing {
        id: ListingId::from_uuid(id),
        title,
        description,
        price: Price::new(price).map_err(corrupt)?,
        location,
        country,
        category,
        image,
        geometry: Geometry::point(longitude, latitude).map_err(corrupt)?,
        owner: UserId::from_uuid(owner_id),
        reviews: review_ids.into_iter().map(ReviewId::from_uuid).collect(),
        created_at,
    })
}

fn user_from_row(row: UserRow) -> Result<User, ListingRepositoryError> {
    row_to_credentials(row)
        .map(|stored| stored.user)
        .map_err(corrupt)
}

/// Arrange fetched reviews in reference order, dropping dangling references.
fn order_reviews(
    references: &[ReviewId],
    fetched: Vec<(ReviewRow, Option<UserRow>)>,
) -> Result<Vec<ReviewDetails>, ListingRepositoryError> {
    let mut by_id: HashMap<Uuid, (ReviewRow, Option<UserRow>)> = fetched
        .into_iter()
        .map(|(review, author)| (review.id, (review, author)))
        .collect();
    references
        .iter()
        .filter_map(|id| by_id.remove(id.as_uuid()))
        .map(|(review, author)| {
            Ok(ReviewDetails {
                review: row_to_review(review).map_err(corrupt)?,
                author: author.map(user_from_row).transpose()?,
            })
        })
        .collect()
}

#[async_trait]
impl ListingRepository for DieselListingRepository {
    async fn list(&self, filter: &ListingFilter) -> Result<Vec<Listing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let mut query = listings::table
            .select(ListingRow::as_select())
            .order((listings::created_at.asc(), listings::id.asc()))
            .into_boxed();
        match filter {
            ListingFilter::All => {}
            ListingFilter::Category(category) => {
                query = query.filter(listings::category.eq(category.clone()));
            }
            ListingFilter::Search(needle) => {
                let pattern = format!("%{}%", escape_like(needle));
                query = query.filter(
                    listings::title
                        .ilike(pattern.clone())
                        .or(listings::location.ilike(pattern.clone()))
                        .or(listings::country.ilike(pattern.clone()))
                        .or(listings::category.ilike(pattern)),
                );
            }
        }
        let rows: Vec<ListingRow> = query.load(&mut conn).await.map_err(diesel_error)?;
        rows.into_iter().map(row_to_listing).collect()
    }

    async fn find_by_id(
        &self,
        id: &ListingId,
    ) -> Result<Option<Listing>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = listings::table
            .find(id.as_uuid())
            .select(ListingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_listing).transpose()
    }

    async fn find_with_relations(
        &self,
        id: &ListingId,
    ) -> Result<Option<ListingDetails>, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let found: Option<(ListingRow, Option<UserRow>)> = listings::table
            .left_join(users::table)
            .filter(listings::id.eq(id.as_uuid()))
            .select((ListingRow::as_select(), Option::<UserRow>::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        let Some((row, owner)) = found else {
            return Ok(None);
        };
        let listing = row_to_listing(row)?;

        let wanted: Vec<Uuid> = listing.reviews.iter().map(|id| *id.as_uuid()).collect();
        let fetched: Vec<(ReviewRow, Option<UserRow>)> = if wanted.is_empty() {
            Vec::new()
        } else {
            reviews::table
                .left_join(users::table)
                .filter(reviews::id.eq_any(wanted))
                .select((ReviewRow::as_select(), Option::<UserRow>::as_select()))
                .load(&mut conn)
                .await
                .map_err(diesel_error)?
        };
        let reviews = order_reviews(&listing.reviews, fetched)?;

        Ok(Some(ListingDetails {
            owner: owner.map(user_from_row).transpose()?,
            listing,
            reviews,
        }))
    }

    async fn insert(&self, listing: &Listing) -> Result<ListingId, ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewListingRow {
            id: *listing.id.as_uuid(),
            title: &listing.title,
            description: &listing.description,
            price: listing.price.value(),
            location: &listing.location,
            country: &listing.country,
            category: listing.category.as_deref(),
            image_url: listing.image.as_ref().map(MediaRef::url),
            image_filename: listing.image.as_ref().map(MediaRef::filename),
            longitude: listing.geometry.longitude(),
            latitude: listing.geometry.latitude(),
            owner_id: *listing.owner.as_uuid(),
            review_ids: listing.reviews.iter().map(|id| *id.as_uuid()).collect(),
            created_at: listing.created_at,
        };
        diesel::insert_into(listings::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(listing.id)
    }

    async fn update_fields(
        &self,
        id: &ListingId,
        changes: &ListingChanges,
    ) -> Result<(), ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let fields = &changes.fields;
        let update = ListingFieldsUpdate {
            title: &fields.title,
            description: &fields.description,
            price: fields.price.value(),
            location: &fields.location,
            country: &fields.country,
            category: fields.category.as_deref(),
        };
        let image = changes.image.as_ref().map(|image| ListingImageUpdate {
            image_url: image.url(),
            image_filename: image.filename(),
        });
        diesel::update(listings::table.find(id.as_uuid()))
            .set((update, image))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn delete_by_id(&self, id: &ListingId) -> Result<(), ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::delete(listings::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn push_review(
        &self,
        id: &ListingId,
        review: &ReviewId,
    ) -> Result<(), ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(listings::table.find(id.as_uuid()))
            .set(listings::review_ids.eq(sql::array_append(
                listings::review_ids,
                *review.as_uuid(),
            )))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn pull_review(
        &self,
        id: &ListingId,
        review: &ReviewId,
    ) -> Result<(), ListingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(listings::table.find(id.as_uuid()))
            .set(listings::review_ids.eq(sql::array_remove(
                listings::review_ids,
                *review.as_uuid(),
            )))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }
}
