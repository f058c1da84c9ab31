//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, auth, books, health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Booklend API",
        version = "0.1.0",
        description = "Library Lending Service REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        // Books
        books::list_books,
        books::view_book,
        books::borrow_book,
        // Users
        users::my_borrows,
        // Admin
        admin::register_admin,
        admin::create_book,
        admin::list_books,
        admin::update_book,
        admin::delete_book,
        admin::borrow_log,
    ),
    components(
        schemas(
            // Auth
            auth::LoginResponse,
            crate::models::user::RegisterUser,
            crate::models::user::LoginRequest,
            crate::models::user::PublicUser,
            crate::models::user::Role,
            crate::models::user::UserSummary,
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookStatus,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::BookQuery,
            books::BorrowResponse,
            // Borrow events
            crate::models::borrow_event::BorrowEvent,
            crate::models::borrow_event::BorrowEventDetails,
            crate::models::borrow_event::BorrowedBook,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book browsing and borrowing"),
        (name = "users", description = "User account endpoints"),
        (name = "admin", description = "Catalog administration and borrow log")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
