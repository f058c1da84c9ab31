//! Book browsing and borrowing endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookQuery},
        borrow_event::BorrowEvent,
    },
};

use super::AuthenticatedUser;

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// List of items
    pub items: Vec<T>,
    /// Total number of items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}

/// Borrow response
#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    pub event: BorrowEvent,
    pub message: String,
}

/// List books with filters and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("status" = Option<String>, Query, description = "Filter by status (available/borrowed)"),
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (default: 10)")
    ),
    responses(
        (status = 200, description = "List of books", body = PaginatedResponse<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(mut query): Query<BookQuery>,
) -> AppResult<Json<PaginatedResponse<Book>>> {
    // The public listing never exposes soft-deleted rows
    query.include_deleted = Some(false);

    let (books, total) = state.services.catalog.list_books(&query).await?;

    Ok(Json(PaginatedResponse {
        items: books,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(10),
    }))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found"),
        (status = 410, description = "Book has been deleted")
    )
)]
pub async fn view_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.view_book(id).await?;
    Ok(Json(book))
}

/// Borrow a book as the authenticated user
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 201, description = "Book borrowed", body = BorrowResponse),
        (status = 400, description = "Invalid book id"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book already borrowed")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<BorrowResponse>)> {
    let event = state
        .services
        .circulation
        .borrow_book(id, claims.user_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BorrowResponse {
            event,
            message: "Book borrowed successfully".to_string(),
        }),
    ))
}
