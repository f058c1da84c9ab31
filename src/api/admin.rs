//! Admin endpoints: catalog management and borrow log

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookQuery, CreateBook, UpdateBook},
        borrow_event::BorrowEventDetails,
        user::{PublicUser, RegisterUser, Role},
    },
};

use super::{books::PaginatedResponse, AuthenticatedUser};

/// Register another admin account
#[utoipa::path(
    post,
    path = "/admin/register",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Admin created", body = PublicUser),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Admin rights required"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn register_admin(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<RegisterUser>,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    claims.require_admin()?;

    let admin = state.services.users.register(request, Role::Admin).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/admin/books",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book added", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Admin rights required")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require_admin()?;

    let created = state.services.catalog.create_book(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List books for administration (may include soft-deleted rows)
#[utoipa::path(
    get,
    path = "/admin/books",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("include_deleted" = Option<bool>, Query, description = "Include soft-deleted books"),
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (default: 10)")
    ),
    responses(
        (status = 200, description = "List of books", body = PaginatedResponse<Book>),
        (status = 403, description = "Admin rights required")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PaginatedResponse<Book>>> {
    claims.require_admin()?;

    let (books, total) = state.services.catalog.list_books(&query).await?;

    Ok(Json(PaginatedResponse {
        items: books,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(10),
    }))
}

/// Partially update a book
#[utoipa::path(
    patch,
    path = "/admin/books/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "No valid fields provided"),
        (status = 403, description = "Admin rights required"),
        (status = 404, description = "Book not found or deleted"),
        (status = 409, description = "Book is currently borrowed")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(update): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    claims.require_admin()?;

    let updated = state.services.catalog.update_book(id, update).await?;
    Ok(Json(updated))
}

/// Soft-delete a book
#[utoipa::path(
    delete,
    path = "/admin/books/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book soft-deleted"),
        (status = 403, description = "Admin rights required"),
        (status = 404, description = "Book not found or already deleted"),
        (status = 409, description = "Book is currently borrowed")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.catalog.soft_delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct BorrowLogQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Full borrow log with embedded user and book details
#[utoipa::path(
    get,
    path = "/admin/borrow-events",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "Borrow log", body = PaginatedResponse<BorrowEventDetails>),
        (status = 403, description = "Admin rights required")
    )
)]
pub async fn borrow_log(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BorrowLogQuery>,
) -> AppResult<Json<PaginatedResponse<BorrowEventDetails>>> {
    claims.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let (events, total) = state.services.circulation.borrow_log(page, per_page).await?;

    Ok(Json(PaginatedResponse {
        items: events,
        total,
        page,
        per_page,
    }))
}
