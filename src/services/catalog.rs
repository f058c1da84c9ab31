//! Catalog management service: the book lifecycle manager.
//!
//! Validation failures are caught here, before any lock is taken; the
//! status-dependent business rules live inside the repository's lock scope.

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add a new book to the catalog
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.books.create(&book).await
    }

    /// List books with filters and pagination
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        self.repository.books.list(query).await
    }

    /// Get a single book by ID.
    ///
    /// A soft-deleted book is Gone, not NotFound: the identity once existed.
    pub async fn view_book(&self, id: i32) -> AppResult<Book> {
        let book = self.repository.books.get_by_id(id).await?;
        if book.deleted_at.is_some() {
            return Err(AppError::Gone("Book has been deleted".to_string()));
        }
        Ok(book)
    }

    /// Partially update a book (title, author, genre, status only)
    pub async fn update_book(&self, id: i32, update: UpdateBook) -> AppResult<Book> {
        if update.is_empty() {
            return Err(AppError::Validation(
                "No valid fields provided for update".to_string(),
            ));
        }
        self.repository.books.update_fields(id, &update).await
    }

    /// Soft-delete a book
    pub async fn soft_delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.soft_delete(id).await
    }
}
