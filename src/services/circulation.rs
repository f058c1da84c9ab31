//! Circulation service: borrow transaction entry point and borrow history

use crate::{
    error::{AppError, AppResult},
    models::borrow_event::{BorrowEvent, BorrowEventDetails, BorrowedBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
}

impl CirculationService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book on behalf of a user.
    ///
    /// The identity check happens before any storage access; everything else
    /// runs inside the locked transaction in the repository.
    pub async fn borrow_book(&self, book_id: i32, user_id: i32) -> AppResult<BorrowEvent> {
        if book_id <= 0 {
            return Err(AppError::Validation("Invalid book id".to_string()));
        }
        self.repository.books.borrow(book_id, user_id).await
    }

    /// Full borrow log for the admin audit view
    pub async fn borrow_log(
        &self,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<BorrowEventDetails>, i64)> {
        self.repository.borrow_events.list(page, per_page).await
    }

    /// One user's borrow history
    pub async fn user_borrows(
        &self,
        user_id: i32,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<BorrowedBook>, i64)> {
        self.repository
            .borrow_events
            .list_for_user(user_id, page, per_page)
            .await
    }
}
