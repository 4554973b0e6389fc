pub mod catalog_store;

// パブリックに型を再エクスポート
pub use catalog_store::CatalogStore as JsonFileCatalogStore;
