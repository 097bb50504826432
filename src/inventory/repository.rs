pub mod ddb_inventory_repository;
pub mod memory_inventory_repository;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;
use crate::inventory::domain::model::InventoryBookEntity;

// Read side of the local inventory consumed by the federated lookup.
#[async_trait]
pub(crate) trait InventoryRepository: Repository<InventoryBookEntity> {
    // case-insensitive substring match on title/author/category plus ISBN digit match
    async fn find_by_text(&self, text: &str, limit: usize) -> LibraryResult<Vec<InventoryBookEntity>>;

    // exact match on the normalized ISBN-13 (or the raw digit form when not derivable)
    async fn find_by_isbn(&self, isbn: &str, limit: usize) -> LibraryResult<Vec<InventoryBookEntity>>;
}
