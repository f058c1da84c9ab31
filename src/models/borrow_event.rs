//! Borrow event model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::BookSummary;
use super::user::UserSummary;

/// Immutable record of one borrow action.
///
/// Append-only audit trail: rows are inserted inside the borrow transaction
/// and never updated or deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowEvent {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub borrowed_at: DateTime<Utc>,
}

/// Borrow event with embedded user and book for the admin borrow log
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowEventDetails {
    pub id: i32,
    pub borrowed_at: DateTime<Utc>,
    pub book: BookSummary,
    pub user: UserSummary,
}

/// One entry of a user's own borrow history
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowedBook {
    pub id: i32,
    pub borrowed_at: DateTime<Utc>,
    pub book: BookSummary,
}
