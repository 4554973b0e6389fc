use crate::ports::CatalogStore;

use super::catalog::{Catalog, CatalogConfig};
use super::errors::PersistenceError;

/// 蔵書ストアからCatalogを復元する
///
/// 起動時に1回だけ呼ばれる。保存データが壊れている場合は
/// DecodeErrorとして失敗し、部分的に読み込んだ状態では起動しない。
///
/// # 引数
/// * `store` - 蔵書ストア
/// * `config` - 貸出期間・延滞料金の設定
pub async fn load_catalog(
    store: &dyn CatalogStore,
    config: CatalogConfig,
) -> Result<Catalog, PersistenceError> {
    let snapshot = store.load().await.map_err(PersistenceError::StoreError)?;
    let (books, members) = snapshot.decode()?;

    tracing::info!(
        "Catalog loaded: {} books, {} members",
        books.len(),
        members.len()
    );

    Ok(Catalog::from_parts(config, books, members))
}

/// Catalogの現在の状態を蔵書ストアに保存する
///
/// 既存の保存内容はまるごと置き換えられる。
pub async fn save_catalog(
    store: &dyn CatalogStore,
    catalog: &Catalog,
) -> Result<(), PersistenceError> {
    let snapshot = catalog.snapshot();

    store
        .save(&snapshot)
        .await
        .map_err(PersistenceError::StoreError)?;

    tracing::info!(
        "Catalog saved: {} books, {} members",
        snapshot.books.len(),
        snapshot.members.len()
    );

    Ok(())
}
