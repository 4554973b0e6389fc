#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use rusty_catalog::adapters::mock::CatalogStore as MockCatalogStore;
use rusty_catalog::api::handlers::AppState;
use rusty_catalog::api::router::create_router;
use rusty_catalog::application::catalog::{Catalog, CatalogConfig};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// テストの基準日
pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

/// 固定日付・モックストアでルーターを組み立てる
///
/// `today` を差し替えることで延滞のシナリオも再現できる。
pub fn setup_app(
    store: Arc<MockCatalogStore>,
    today: fn() -> NaiveDate,
) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        today,
        ..AppState::new(Catalog::new(CatalogConfig::default()), store)
    });
    (create_router(state.clone()), state)
}

/// JSONリクエストを送り、ステータスとボディを返す
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

pub fn parse<T: DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap()
}
