use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, add_book, borrow_book, get_book, get_member, list_overdue, register_member,
    return_book, save, search_books, statistics,
};

/// Creates the API router with all catalog endpoints
///
/// Command endpoints (Write operations):
/// - POST /books - Add a book
/// - POST /members - Register a member
/// - POST /books/:isbn/borrow - Borrow a book
/// - POST /books/:isbn/return - Return a book
/// - POST /admin/save - Persist the catalog
///
/// Query endpoints (Read operations):
/// - GET /books?q= - Search books
/// - GET /books/:isbn - Book details
/// - GET /members/:member_id - Member details
/// - GET /overdue - Overdue books as of today
/// - GET /statistics - Catalog statistics
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Books
        .route("/books", post(add_book).get(search_books))
        .route("/books/:isbn", get(get_book))
        .route("/books/:isbn/borrow", post(borrow_book))
        .route("/books/:isbn/return", post(return_book))
        // Members
        .route("/members", post(register_member))
        .route("/members/:member_id", get(get_member))
        // Reports
        .route("/overdue", get(list_overdue))
        .route("/statistics", get(statistics))
        .route("/admin/save", post(save))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
