//! UUID-backed identifiers for listings and reviews.

use std::fmt;

/// Raised when an identifier string is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} id must be a valid UUID, got '{value}'")]
pub struct InvalidIdentifier {
    kind: &'static str,
    value: String,
}

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[derive(::serde::Serialize, ::serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Parse an identifier from its canonical string form.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidIdentifier> {
                let raw = raw.as_ref();
                ::uuid::Uuid::parse_str(raw.trim())
                    .map(Self)
                    .map_err(|_| InvalidIdentifier {
                        kind: $kind,
                        value: raw.to_owned(),
                    })
            }

            /// Generate a fresh random identifier.
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Wrap an already-parsed UUID.
            pub const fn from_uuid(uuid: ::uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &::uuid::Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidIdentifier;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

uuid_identifier!(
    /// Stable identifier of a listing.
    ListingId,
    "listing"
);

uuid_identifier!(
    /// Stable identifier of a review.
    ReviewId,
    "review"
);
