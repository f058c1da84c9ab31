//! Books repository for database operations.
//!
//! All status-affecting mutations (borrow, field update, soft delete) run
//! inside a single transaction holding a `FOR UPDATE` lock on the book row,
//! so concurrent callers against the same book id serialize at the database
//! and exactly one of them observes the pre-state. Callers on different book
//! ids never block each other.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, BookStatus, CreateBook, UpdateBook},
        borrow_event::BorrowEvent,
    },
};

const BOOK_COLUMNS: &str = "id, title, author, genre, status, created_at, updated_at, deleted_at";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a new book. No lock needed: there is no prior state to race.
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (title, author, genre, status)
            VALUES ($1, $2, $3, $4)
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.genre)
        .bind(book.status.unwrap_or_default())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Get a book by ID, including soft-deleted rows.
    ///
    /// The caller decides whether a soft-deleted row is NotFound or Gone.
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List books, newest first, soft-deleted rows excluded unless the
    /// query explicitly asks for them (admin audit listing).
    pub async fn list(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
        let include_deleted = query.include_deleted.unwrap_or(false);

        let books = sqlx::query_as::<_, Book>(&format!(
            r#"
            SELECT {BOOK_COLUMNS}
            FROM books
            WHERE ($1 OR deleted_at IS NULL)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(include_deleted)
        .bind(query.status)
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM books
            WHERE ($1 OR deleted_at IS NULL)
              AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(include_deleted)
        .bind(query.status)
        .fetch_one(&self.pool)
        .await?;

        Ok((books, total))
    }

    /// Borrow a book: the one correctness-critical path in the system.
    ///
    /// Runs as a single transaction. The `FOR UPDATE` select pins the row
    /// for the whole read-check-write sequence, so two concurrent borrows of
    /// the same book cannot both observe `available`: the loser waits on the
    /// lock, re-reads the committed row and fails the status check. The
    /// status flip and the event insert commit together or not at all.
    pub async fn borrow(&self, book_id: i32, user_id: i32) -> AppResult<BorrowEvent> {
        let mut tx = self.pool.begin().await?;

        // Soft-deleted rows are invisible here, so deleting and borrowing
        // the same book also serialize to NotFound for the loser.
        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            SELECT {BOOK_COLUMNS}
            FROM books
            WHERE id = $1 AND deleted_at IS NULL
            FOR UPDATE
            "#
        ))
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if book.status == BookStatus::Borrowed {
            return Err(AppError::Conflict("Book already borrowed".to_string()));
        }

        sqlx::query("UPDATE books SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(book_id)
            .bind(BookStatus::Borrowed)
            .execute(&mut *tx)
            .await?;

        let event = sqlx::query_as::<_, BorrowEvent>(
            r#"
            INSERT INTO borrow_events (book_id, user_id)
            VALUES ($1, $2)
            RETURNING id, book_id, user_id, borrowed_at
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Book {} borrowed by user {}", book_id, user_id);

        Ok(event)
    }

    /// Apply a partial update under the same row lock the borrow path takes.
    ///
    /// A borrowed book's fields are frozen: the status check happens inside
    /// the lock scope, never as a separate unlocked pre-check, so a racing
    /// borrow cannot slip between check and write.
    pub async fn update_fields(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Book>(&format!(
            r#"
            SELECT {BOOK_COLUMNS}
            FROM books
            WHERE id = $1 AND deleted_at IS NULL
            FOR UPDATE
            "#
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        if current.status == BookStatus::Borrowed {
            return Err(AppError::Conflict(
                "Cannot update a borrowed book".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                genre = COALESCE($4, genre),
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&update.title)
        .bind(&update.author)
        .bind(&update.genre)
        .bind(update.status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Soft-delete a book under the row lock. The row is never removed;
    /// `deleted_at` is set and every other field is left untouched.
    pub async fn soft_delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            SELECT {BOOK_COLUMNS}
            FROM books
            WHERE id = $1 AND deleted_at IS NULL
            FOR UPDATE
            "#
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Book with id {} not found or already deleted", id))
        })?;

        if book.status == BookStatus::Borrowed {
            return Err(AppError::Conflict(
                "Cannot delete: book is currently borrowed".to_string(),
            ));
        }

        sqlx::query("UPDATE books SET deleted_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Book {} soft-deleted", id);

        Ok(())
    }
}
