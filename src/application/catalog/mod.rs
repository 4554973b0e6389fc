#[allow(clippy::module_inception)]
mod catalog;
mod errors;
mod persistence;

pub use catalog::{Catalog, CatalogConfig, Statistics};
pub use errors::{CatalogError, PersistenceError, Result};
pub use persistence::{load_catalog, save_catalog};
