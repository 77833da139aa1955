//! Storage layer for the shop records.
//!
//! The core is written against the `ShopStore` trait; `SqliteStore` is the
//! production implementation. Opening a store creates the schema and seeds
//! the id sequences on first use.

mod sqlite_backend;
mod traits;

pub use sqlite_backend::SqliteStore;
pub use traits::ShopStore;

use anyhow::Result;
use std::path::Path;

use crate::ids::IdSeeds;

/// Opens the SQLite store at `path`, creating it if needed.
pub fn open_store(path: &Path, seeds: &IdSeeds) -> Result<Box<dyn ShopStore>> {
    Ok(Box::new(SqliteStore::open(path, seeds)?))
}
