//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts with their password digest.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Text,
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Listings. `review_ids` keeps review references in insertion order.
    listings (id) {
        id -> Uuid,
        title -> Text,
        description -> Text,
        price -> Float8,
        location -> Text,
        country -> Text,
        category -> Nullable<Text>,
        image_url -> Nullable<Text>,
        image_filename -> Nullable<Text>,
        longitude -> Float8,
        latitude -> Float8,
        owner_id -> Uuid,
        review_ids -> Array<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reviews with a back-reference to their listing.
    reviews (id) {
        id -> Uuid,
        listing_id -> Uuid,
        rating -> Int2,
        comment -> Text,
        author_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(listings -> users (owner_id));
diesel::joinable!(reviews -> users (author_id));

diesel::allow_tables_to_appear_in_same_query!(listings, reviews, users);
