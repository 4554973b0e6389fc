use crate::ports::catalog_store::{CatalogSnapshot, CatalogStore as CatalogStoreTrait, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// CatalogStoreのモック実装
///
/// スナップショットをメモリ上に保持する。
/// 保存回数を数えるので、終了時保存のテストにも使える。
pub struct CatalogStore {
    snapshot: Mutex<CatalogSnapshot>,
    save_count: Mutex<usize>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::with_snapshot(CatalogSnapshot::default())
    }

    /// テスト用に初期データを持たせる
    pub fn with_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            save_count: Mutex::new(0),
        }
    }

    /// 最後に保存されたスナップショット
    pub fn saved(&self) -> CatalogSnapshot {
        self.snapshot.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.save_count.lock().unwrap()
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogStoreTrait for CatalogStore {
    async fn load(&self) -> Result<CatalogSnapshot> {
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn save(&self, snapshot: &CatalogSnapshot) -> Result<()> {
        *self.snapshot.lock().unwrap() = snapshot.clone();
        *self.save_count.lock().unwrap() += 1;
        Ok(())
    }
}
