use crate::application::catalog::{Catalog, CatalogError, Statistics, save_catalog};
use crate::domain::commands::{BorrowBook, ReturnBook};
use crate::ports::CatalogStore;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{
    error::ApiError,
    types::{
        AddBookRequest, BookBorrowedResponse, BookResponse, BookReturnedResponse,
        BorrowBookRequest, MemberResponse, RegisterMemberRequest, SearchBooksQuery, parse_isbn,
        parse_member_id,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
///
/// Catalogは1つだけで、Mutexにより操作は直列に適用される。
pub struct AppState {
    pub catalog: Mutex<Catalog>,
    pub store: Arc<dyn CatalogStore>,
    /// 貸出日・返却日・延滞判定の基準日
    pub today: fn() -> NaiveDate,
}

impl AppState {
    pub fn new(catalog: Catalog, store: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog: Mutex::new(catalog),
            store,
            today: local_today,
        }
    }
}

/// ローカル時刻での今日の日付
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// ============================================================================
// Command handlers (POST)
// ============================================================================

/// POST /books - 書籍を蔵書に追加
pub async fn add_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let cmd = req.to_command()?;

    let book = state.catalog.lock().await.add_book(cmd)?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(&book))))
}

/// POST /members - 会員を登録
pub async fn register_member(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterMemberRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiError> {
    let cmd = req.to_command()?;

    let member = state.catalog.lock().await.register_member(cmd)?;

    Ok((StatusCode::CREATED, Json(MemberResponse::from(&member))))
}

/// POST /books/:isbn/borrow - 書籍を貸し出す
///
/// 強制されるビジネスルール:
/// - 書籍と会員が存在すること
/// - 会員の貸出数が上限に達していないこと
/// - 書籍が貸出可能であること
pub async fn borrow_book(
    State(state): State<Arc<AppState>>,
    Path(isbn): Path<String>,
    Json(req): Json<BorrowBookRequest>,
) -> Result<Json<BookBorrowedResponse>, ApiError> {
    let cmd = BorrowBook {
        isbn: parse_isbn(isbn)?,
        member_id: parse_member_id(req.member_id)?,
        borrowed_on: (state.today)(),
    };

    let event = state.catalog.lock().await.borrow_book(cmd)?;

    Ok(Json(BookBorrowedResponse::from(event)))
}

/// POST /books/:isbn/return - 書籍を返却
///
/// 強制されるビジネスルール:
/// - 書籍が存在すること
/// - 貸出中であること
/// - 延滞中の書籍も返却可能（延滞料金を算出して返す）
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    Path(isbn): Path<String>,
) -> Result<Json<BookReturnedResponse>, ApiError> {
    let cmd = ReturnBook {
        isbn: parse_isbn(isbn)?,
        returned_on: (state.today)(),
    };

    let event = state.catalog.lock().await.return_book(cmd)?;

    Ok(Json(BookReturnedResponse::from(event)))
}

/// POST /admin/save - 現在の蔵書をストアに保存
pub async fn save(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    let catalog = state.catalog.lock().await;
    save_catalog(state.store.as_ref(), &catalog).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /books?q=keyword - 書籍検索
///
/// qが省略された場合は全書籍を返す。該当なしは空配列。
pub async fn search_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchBooksQuery>,
) -> Json<Vec<BookResponse>> {
    let catalog = state.catalog.lock().await;

    let books = match query.q.as_deref() {
        Some(keyword) => catalog.search_books(keyword),
        None => catalog.books(),
    };

    Json(books.into_iter().map(BookResponse::from).collect())
}

/// GET /books/:isbn - 書籍詳細
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(isbn): Path<String>,
) -> Result<Json<BookResponse>, ApiError> {
    let isbn = parse_isbn(isbn)?;
    let catalog = state.catalog.lock().await;

    let book = catalog
        .book(&isbn)
        .ok_or_else(|| CatalogError::BookNotFound(isbn.clone()))?;

    Ok(Json(BookResponse::from(book)))
}

/// GET /members/:member_id - 会員詳細
pub async fn get_member(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<String>,
) -> Result<Json<MemberResponse>, ApiError> {
    let member_id = parse_member_id(member_id)?;
    let catalog = state.catalog.lock().await;

    let member = catalog
        .member(&member_id)
        .ok_or_else(|| CatalogError::MemberNotFound(member_id.clone()))?;

    Ok(Json(MemberResponse::from(member)))
}

/// GET /overdue - 今日の時点で延滞している書籍
pub async fn list_overdue(State(state): State<Arc<AppState>>) -> Json<Vec<BookResponse>> {
    let today = (state.today)();
    let catalog = state.catalog.lock().await;

    Json(
        catalog
            .overdue_books(today)
            .into_iter()
            .map(BookResponse::from)
            .collect(),
    )
}

/// GET /statistics - 蔵書統計
pub async fn statistics(State(state): State<Arc<AppState>>) -> Json<Statistics> {
    Json(state.catalog.lock().await.statistics())
}
