use crate::application::catalog::{CatalogError, PersistenceError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    Catalog(CatalogError),
    Persistence(PersistenceError),
    BadRequest(String),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        ApiError::Persistence(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            // 400 Bad Request - 入力の形式不正
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),

            ApiError::Catalog(err) => {
                let message = err.to_string();
                match err {
                    // 404 Not Found - リクエストされたリソースが存在しない
                    CatalogError::BookNotFound(_) => {
                        (StatusCode::NOT_FOUND, "BOOK_NOT_FOUND", message)
                    }
                    CatalogError::MemberNotFound(_) => {
                        (StatusCode::NOT_FOUND, "MEMBER_NOT_FOUND", message)
                    }

                    // 409 Conflict - キーの重複
                    CatalogError::DuplicateIsbn(_) => {
                        (StatusCode::CONFLICT, "DUPLICATE_ISBN", message)
                    }
                    CatalogError::DuplicateMemberId(_) => {
                        (StatusCode::CONFLICT, "DUPLICATE_MEMBER_ID", message)
                    }

                    // 422 Unprocessable Entity - ビジネスルール違反
                    CatalogError::AlreadyBorrowed(_) => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "ALREADY_BORROWED",
                        message,
                    ),
                    CatalogError::InvalidReturn(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_RETURN", message)
                    }
                    CatalogError::LimitReached { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "LIMIT_REACHED", message)
                    }
                }
            }

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ApiError::Persistence(err) => {
                tracing::error!("Persistence error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "Failed to persist catalog".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
