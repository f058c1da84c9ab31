//! User-facing account endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{error::AppResult, models::borrow_event::BorrowedBook};

use super::{books::PaginatedResponse, AuthenticatedUser};

#[derive(Debug, Deserialize, IntoParams)]
pub struct BorrowHistoryQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// List the authenticated user's borrow history
#[utoipa::path(
    get,
    path = "/users/me/borrows",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (default: 10)")
    ),
    responses(
        (status = 200, description = "Borrow history", body = PaginatedResponse<BorrowedBook>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_borrows(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BorrowHistoryQuery>,
) -> AppResult<Json<PaginatedResponse<BorrowedBook>>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);

    let (entries, total) = state
        .services
        .circulation
        .user_borrows(claims.user_id, page, per_page)
        .await?;

    Ok(Json(PaginatedResponse {
        items: entries,
        total,
        page,
        per_page,
    }))
}
