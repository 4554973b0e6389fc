use axum::http::StatusCode;
use chrono::{Duration, NaiveDate};
use rusty_catalog::adapters::mock::CatalogStore as MockCatalogStore;
use rusty_catalog::api::handlers::AppState;
use rusty_catalog::api::router::create_router;
use rusty_catalog::api::types::*;
use rusty_catalog::application::catalog::Statistics;
use serde_json::json;
use std::sync::Arc;

mod common;

use common::{fixed_today, parse, send, setup_app};

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

/// 返却期限（2024-05-15）の3日後
fn three_days_late() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 18).unwrap()
}

async fn add_dune(app: &axum::Router) {
    let (status, _) = send(
        app,
        "POST",
        "/books",
        Some(json!({
            "isbn": "111",
            "title": "Dune",
            "author": "Frank Herbert",
            "year": 1965,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn register(app: &axum::Router, member_id: &str, max_loans: Option<u32>) {
    let (status, _) = send(
        app,
        "POST",
        "/members",
        Some(json!({
            "member_id": member_id,
            "name": "Alice",
            "max_loans": max_loans,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

// ============================================================================
// E2Eテスト: 正常系フロー
// ============================================================================

#[tokio::test]
async fn test_e2e_full_borrow_flow() {
    let store = Arc::new(MockCatalogStore::new());
    let (app, _) = setup_app(store, fixed_today);

    add_dune(&app).await;
    register(&app, "M1", None).await;

    // Step 1: 貸出（POST /books/111/borrow）
    let (status, body) = send(
        &app,
        "POST",
        "/books/111/borrow",
        Some(json!({ "member_id": "M1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let borrowed: BookBorrowedResponse = parse(&body);
    assert_eq!(borrowed.due_date, fixed_today() + Duration::days(14));
    assert_eq!(borrowed.message, "Book issued. Due date: 2024-05-15");

    // Step 2: 二重貸出は失敗
    let (status, body) = send(
        &app,
        "POST",
        "/books/111/borrow",
        Some(json!({ "member_id": "M1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "ALREADY_BORROWED");

    // Step 3: 書籍と会員の状態確認
    let (_, body) = send(&app, "GET", "/books/111", None).await;
    let book: BookResponse = parse(&body);
    assert!(!book.available);
    assert_eq!(book.borrowed_by.as_deref(), Some("M1"));
    assert_eq!(book.due_date, Some(borrowed.due_date));

    let (_, body) = send(&app, "GET", "/members/M1", None).await;
    let member: MemberResponse = parse(&body);
    assert_eq!(member.borrowed_isbns, vec!["111".to_string()]);

    // Step 4: 返却（期限内なので延滞料金なし）
    let (status, body) = send(&app, "POST", "/books/111/return", None).await;
    assert_eq!(status, StatusCode::OK);
    let returned: BookReturnedResponse = parse(&body);
    assert!(!returned.was_overdue);
    assert_eq!(returned.fine, None);

    let (_, body) = send(&app, "GET", "/books/111", None).await;
    let book: BookResponse = parse(&body);
    assert!(book.available);
    assert_eq!(book.borrowed_by, None);
    assert_eq!(book.due_date, None);

    // Step 5: 二重返却はInvalidReturn
    let (status, body) = send(&app, "POST", "/books/111/return", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.error, "INVALID_RETURN");
}

#[tokio::test]
async fn test_e2e_overdue_return_reports_fine() {
    let store = Arc::new(MockCatalogStore::new());
    let (app, state) = setup_app(store.clone(), fixed_today);

    add_dune(&app).await;
    register(&app, "M1", None).await;
    send(
        &app,
        "POST",
        "/books/111/borrow",
        Some(json!({ "member_id": "M1" })),
    )
    .await;

    // 同じCatalogを3日遅れの日付で操作する
    let late_state = Arc::new(AppState {
        today: three_days_late,
        ..AppState::new(state.catalog.lock().await.clone(), store)
    });
    let late_app = create_router(late_state);

    let (_, body) = send(&late_app, "GET", "/overdue", None).await;
    let overdue: Vec<BookResponse> = parse(&body);
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].isbn, "111");

    let (status, body) = send(&late_app, "POST", "/books/111/return", None).await;
    assert_eq!(status, StatusCode::OK);
    let returned: BookReturnedResponse = parse(&body);
    assert!(returned.was_overdue);
    let fine = returned.fine.unwrap();
    assert_eq!(fine.days_late, 3);
    assert_eq!(fine.amount, 6);
}

#[tokio::test]
async fn test_e2e_search_and_statistics() {
    let store = Arc::new(MockCatalogStore::new());
    let (app, _) = setup_app(store, fixed_today);

    add_dune(&app).await;
    register(&app, "M1", None).await;

    let (_, body) = send(&app, "GET", "/books?q=dune", None).await;
    let found: Vec<BookResponse> = parse(&body);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Dune");

    let (_, body) = send(&app, "GET", "/books?q=111", None).await;
    let found: Vec<BookResponse> = parse(&body);
    assert_eq!(found.len(), 1);

    let (status, body) = send(&app, "GET", "/books?q=tolkien", None).await;
    assert_eq!(status, StatusCode::OK);
    let found: Vec<BookResponse> = parse(&body);
    assert!(found.is_empty());

    let (_, body) = send(&app, "GET", "/statistics", None).await;
    let stats: Statistics = parse(&body);
    assert_eq!(
        stats,
        Statistics {
            total_books: 1,
            available_books: 1,
            borrowed_books: 0,
            total_members: 1,
        }
    );
}

#[tokio::test]
async fn test_e2e_save_writes_snapshot_to_store() {
    let store = Arc::new(MockCatalogStore::new());
    let (app, _) = setup_app(store.clone(), fixed_today);

    add_dune(&app).await;
    register(&app, "M1", None).await;
    send(
        &app,
        "POST",
        "/books/111/borrow",
        Some(json!({ "member_id": "M1" })),
    )
    .await;

    let (status, _) = send(&app, "POST", "/admin/save", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(store.save_count(), 1);

    let saved = store.saved();
    let book = &saved.books["111"];
    assert!(!book.available);
    assert_eq!(book.borrowed_by.as_deref(), Some("M1"));
    assert_eq!(saved.members["M1"].borrowed_isbns, vec!["111".to_string()]);
}

// ============================================================================
// E2Eテスト: 異常系
// ============================================================================

#[tokio::test]
async fn test_e2e_duplicates_are_conflicts() {
    let store = Arc::new(MockCatalogStore::new());
    let (app, _) = setup_app(store, fixed_today);

    add_dune(&app).await;
    register(&app, "M1", None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/books",
        Some(json!({ "isbn": "111", "title": "Other", "author": "Other" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(parse::<ErrorResponse>(&body).error, "DUPLICATE_ISBN");

    let (status, body) = send(
        &app,
        "POST",
        "/members",
        Some(json!({ "member_id": "M1", "name": "Other" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(parse::<ErrorResponse>(&body).error, "DUPLICATE_MEMBER_ID");
}

#[tokio::test]
async fn test_e2e_not_found() {
    let store = Arc::new(MockCatalogStore::new());
    let (app, _) = setup_app(store, fixed_today);

    add_dune(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/books/111/borrow",
        Some(json!({ "member_id": "nobody" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse::<ErrorResponse>(&body).error, "MEMBER_NOT_FOUND");

    let (status, body) = send(&app, "POST", "/books/999/return", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse::<ErrorResponse>(&body).error, "BOOK_NOT_FOUND");

    let (status, _) = send(&app, "GET", "/members/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_e2e_limit_reached() {
    let store = Arc::new(MockCatalogStore::new());
    let (app, _) = setup_app(store, fixed_today);

    add_dune(&app).await;
    send(
        &app,
        "POST",
        "/books",
        Some(json!({ "isbn": "222", "title": "Emma", "author": "Jane Austen" })),
    )
    .await;
    register(&app, "M1", Some(1)).await;

    let (status, _) = send(
        &app,
        "POST",
        "/books/111/borrow",
        Some(json!({ "member_id": "M1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/books/222/borrow",
        Some(json!({ "member_id": "M1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(parse::<ErrorResponse>(&body).error, "LIMIT_REACHED");

    let (_, body) = send(&app, "GET", "/books/222", None).await;
    assert!(parse::<BookResponse>(&body).available);
}

#[tokio::test]
async fn test_e2e_blank_isbn_is_bad_request() {
    let store = Arc::new(MockCatalogStore::new());
    let (app, _) = setup_app(store, fixed_today);

    let (status, body) = send(
        &app,
        "POST",
        "/books",
        Some(json!({ "isbn": "  ", "title": "Dune", "author": "Frank Herbert" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse::<ErrorResponse>(&body).error, "BAD_REQUEST");
}

#[tokio::test]
async fn test_e2e_health() {
    let store = Arc::new(MockCatalogStore::new());
    let (app, _) = setup_app(store, fixed_today);

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}
