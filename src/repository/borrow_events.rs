//! Borrow events repository for database operations.
//!
//! Read-only: borrow_events rows are inserted by the borrow transaction in
//! `BooksRepository` and never touched afterwards.

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::AppResult,
    models::{
        book::BookSummary,
        borrow_event::{BorrowEventDetails, BorrowedBook},
        user::UserSummary,
    },
};

#[derive(Clone)]
pub struct BorrowEventsRepository {
    pool: Pool<Postgres>,
}

impl BorrowEventsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Full borrow log for the admin audit view, newest first.
    ///
    /// Soft-deleted books stay visible here: the log is history, not catalog.
    pub async fn list(&self, page: i64, per_page: i64) -> AppResult<(Vec<BorrowEventDetails>, i64)> {
        let rows = sqlx::query(
            r#"
            SELECT e.id, e.borrowed_at,
                   b.id as book_id, b.title, b.author, b.genre, b.status,
                   u.id as user_id, u.name, u.email
            FROM borrow_events e
            JOIN books b ON e.book_id = b.id
            JOIN users u ON e.user_id = u.id
            ORDER BY e.borrowed_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        let mut events = Vec::new();
        for row in rows {
            events.push(BorrowEventDetails {
                id: row.get("id"),
                borrowed_at: row.get("borrowed_at"),
                book: BookSummary {
                    id: row.get("book_id"),
                    title: row.get("title"),
                    author: row.get("author"),
                    genre: row.get("genre"),
                    status: row.get("status"),
                },
                user: UserSummary {
                    id: row.get("user_id"),
                    name: row.get("name"),
                    email: row.get("email"),
                },
            });
        }

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM borrow_events")
            .fetch_one(&self.pool)
            .await?;

        Ok((events, total))
    }

    /// Borrow history of one user, newest first.
    pub async fn list_for_user(
        &self,
        user_id: i32,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<BorrowedBook>, i64)> {
        let rows = sqlx::query(
            r#"
            SELECT e.id, e.borrowed_at,
                   b.id as book_id, b.title, b.author, b.genre, b.status
            FROM borrow_events e
            JOIN books b ON e.book_id = b.id
            WHERE e.user_id = $1
            ORDER BY e.borrowed_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(BorrowedBook {
                id: row.get("id"),
                borrowed_at: row.get("borrowed_at"),
                book: BookSummary {
                    id: row.get("book_id"),
                    title: row.get("title"),
                    author: row.get("author"),
                    genre: row.get("genre"),
                    status: row.get("status"),
                },
            });
        }

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM borrow_events WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok((entries, total))
    }
}
