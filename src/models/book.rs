//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Availability status of a book copy.
///
/// One book row is one physical copy: `Available` can flip to `Borrowed`
/// only through the locked borrow transaction, never twice concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Available,
    Borrowed,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::Borrowed => "borrowed",
        }
    }
}

impl Default for BookStatus {
    fn default() -> Self {
        BookStatus::Available
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(BookStatus::Available),
            "borrowed" => Ok(BookStatus::Borrowed),
            _ => Err(format!("Invalid book status: {}", s)),
        }
    }
}

// SQLx conversion for BookStatus (stored as TEXT)
impl sqlx::Type<Postgres> for BookStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BookStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub status: BookStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Non-null means the book is soft-deleted and hidden from listings
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Compact book representation embedded in borrow history entries
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub status: BookStatus,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author required"))]
    pub author: String,
    #[validate(length(min = 1, message = "Genre required"))]
    pub genre: String,
    /// Initial status, defaults to `available`
    pub status: Option<BookStatus>,
}

/// Partial update request.
///
/// Only these four fields are updatable; anything else in the request body
/// is silently dropped during deserialization.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub status: Option<BookStatus>,
}

impl UpdateBook {
    /// True when no recognized field was supplied
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.genre.is_none()
            && self.status.is_none()
    }
}

/// Book listing query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Filter by status
    pub status: Option<BookStatus>,
    /// Include soft-deleted rows (admin audit listing only)
    pub include_deleted: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        assert_eq!("available".parse::<BookStatus>().unwrap(), BookStatus::Available);
        assert_eq!("BORROWED".parse::<BookStatus>().unwrap(), BookStatus::Borrowed);
        assert_eq!(BookStatus::Borrowed.to_string(), "borrowed");
        assert!("lost".parse::<BookStatus>().is_err());
    }

    #[test]
    fn update_payload_detects_empty_field_set() {
        let empty = UpdateBook::default();
        assert!(empty.is_empty());

        let update = UpdateBook {
            genre: Some("Fantasy".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn update_payload_ignores_unknown_fields() {
        let update: UpdateBook =
            serde_json::from_str(r#"{"title": "Dune", "publisher": "ignored"}"#).unwrap();
        assert_eq!(update.title.as_deref(), Some("Dune"));
        assert!(update.author.is_none());
    }
}
