//! Request shapes for listings and reviews and their validation.
//!
//! Validation is pure: a shape either yields a fully typed draft or the
//! ordered list of everything wrong with it. Nothing downstream re-validates.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{Error, ListingDraft, Price, RATING_MAX, RATING_MIN, Rating, ReviewDraft};

/// Machine-readable reason a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorCode {
    Required,
    Empty,
    NotANumber,
    NotAnInteger,
    TooSmall,
    TooLarge,
    Malformed,
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub code: FieldErrorCode,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, code: FieldErrorCode, detail: impl fmt::Display) -> Self {
        Self {
            field,
            code,
            message: format!("\"{field}\" {detail}"),
        }
    }
}

/// Ordered field errors produced by a failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All messages joined with `,` in field order.
    pub fn joined(&self) -> String {
        self.0
            .iter()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    fn into_result<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, Self> {
        if !self.is_empty() {
            return Err(self);
        }
        match value() {
            Some(value) => Ok(value),
            None => Err(self),
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

impl From<ValidationErrors> for Error {
    fn from(value: ValidationErrors) -> Self {
        Error::invalid_request(value.joined()).with_details(json!({ "errors": value.0 }))
    }
}

/// A request shape that validates into a typed value.
pub trait Schema {
    type Output;

    fn validate(&self) -> Result<Self::Output, ValidationErrors>;
}

/// A request body as it arrived.
///
/// Decoding happens at the edge, but a body that fails to decode is only
/// reported once the request reaches [`crate::domain::Stage::Validating`],
/// so callers are authenticated and authorized before their payload is
/// judged.
///
/// # Examples
/// ```
/// use wanderlust::domain::{Payload, ReviewInput};
///
/// let payload = Payload::<ReviewInput>::from_json::<ReviewInput>(br#"{"rating":"x"#);
/// let errors = payload.decode().expect_err("truncated body");
/// assert_eq!(errors.errors()[0].field, "body");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    Decoded(T),
    Malformed(String),
}

impl<T> Payload<T> {
    /// Decode `body` as the wire shape `W`, then convert it into `T`.
    pub fn from_json<W>(body: &[u8]) -> Self
    where
        W: DeserializeOwned + Into<T>,
    {
        match serde_json::from_slice::<W>(body) {
            Ok(wire) => Self::Decoded(wire.into()),
            Err(err) => Self::Malformed(err.to_string()),
        }
    }

    /// The decoded value, or a single `body` field error.
    pub fn decode(self) -> Result<T, ValidationErrors> {
        match self {
            Self::Decoded(value) => Ok(value),
            Self::Malformed(reason) => Err(ValidationErrors(vec![FieldError::new(
                "body",
                FieldErrorCode::Malformed,
                format_args!("could not be decoded: {reason}"),
            )])),
        }
    }
}

impl<T> From<T> for Payload<T> {
    fn from(value: T) -> Self {
        Self::Decoded(value)
    }
}

/// Raw listing payload for create and update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ListingInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub location: Option<String>,
    pub country: Option<String>,
    #[serde(alias = "types")]
    pub category: Option<String>,
}

impl Schema for ListingInput {
    type Output = ListingDraft;

    fn validate(&self) -> Result<ListingDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let title = required_text(&mut errors, "title", self.title.as_deref());
        let description = required_text(&mut errors, "description", self.description.as_deref());
        let price = price(&mut errors, self.price.as_ref());
        let location = required_text(&mut errors, "location", self.location.as_deref());
        let country = required_text(&mut errors, "country", self.country.as_deref());
        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);

        errors.into_result(|| {
            Some(ListingDraft {
                title: title?,
                description: description?,
                price: price?,
                location: location?,
                country: country?,
                category,
            })
        })
    }
}

/// Raw review payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewInput {
    pub rating: Option<Value>,
    pub comment: Option<String>,
}

impl Schema for ReviewInput {
    type Output = ReviewDraft;

    fn validate(&self) -> Result<ReviewDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let rating = rating(&mut errors, self.rating.as_ref());
        let comment = required_text(&mut errors, "comment", self.comment.as_deref());

        errors.into_result(|| {
            Some(ReviewDraft {
                rating: rating?,
                comment: comment?,
            })
        })
    }
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&str>,
) -> Option<String> {
    match value.map(str::trim) {
        None => {
            errors.push(FieldError::new(field, FieldErrorCode::Required, "is required"));
            None
        }
        Some("") => {
            errors.push(FieldError::new(
                field,
                FieldErrorCode::Empty,
                "is not allowed to be empty",
            ));
            None
        }
        Some(text) => Some(text.to_owned()),
    }
}

fn price(errors: &mut ValidationErrors, value: Option<&Value>) -> Option<Price> {
    const FIELD: &str = "price";
    let number = match value {
        None | Some(Value::Null) => {
            errors.push(FieldError::new(FIELD, FieldErrorCode::Required, "is required"));
            return None;
        }
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    let Some(number) = number.filter(|number| number.is_finite()) else {
        errors.push(FieldError::new(
            FIELD,
            FieldErrorCode::NotANumber,
            "must be a number",
        ));
        return None;
    };
    match Price::new(number) {
        Ok(price) => Some(price),
        Err(_) => {
            errors.push(FieldError::new(
                FIELD,
                FieldErrorCode::TooSmall,
                "must be greater than or equal to 0",
            ));
            None
        }
    }
}

fn rating(errors: &mut ValidationErrors, value: Option<&Value>) -> Option<Rating> {
    const FIELD: &str = "rating";
    let integer = match value {
        None | Some(Value::Null) => {
            errors.push(FieldError::new(FIELD, FieldErrorCode::Required, "is required"));
            return None;
        }
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Some(Value::String(text)) => text.trim().parse::<i64>().ok(),
        Some(_) => None,
    };
    let Some(integer) = integer else {
        errors.push(FieldError::new(
            FIELD,
            FieldErrorCode::NotAnInteger,
            "must be an integer",
        ));
        return None;
    };
    if integer < i64::from(RATING_MIN) {
        errors.push(FieldError::new(
            FIELD,
            FieldErrorCode::TooSmall,
            format!("must be greater than or equal to {RATING_MIN}"),
        ));
        return None;
    }
    if integer > i64::from(RATING_MAX) {
        errors.push(FieldError::new(
            FIELD,
            FieldErrorCode::TooLarge,
            format!("must be less than or equal to {RATING_MAX}"),
        ));
        return None;
    }
    Rating::new(integer).ok()
}
