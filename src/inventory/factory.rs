use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::inventory::repository::InventoryRepository;
use crate::inventory::repository::ddb_inventory_repository::DDBInventoryRepository;
use crate::inventory::repository::memory_inventory_repository::MemoryInventoryRepository;
use crate::utils::ddb::{build_db_client, create_table};

pub(crate) async fn create_inventory_repository(config: &Configuration, store: RepositoryStore) -> Box<dyn InventoryRepository> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store, config.dynamodb_endpoint.as_str()).await;
            Box::new(DDBInventoryRepository::new(client, "inventory", "inventory_ndx"))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store, config.dynamodb_endpoint.as_str()).await;
            let _ = create_table(&client, "inventory", "book_id", "clean_isbn", "title").await;
            Box::new(DDBInventoryRepository::new(client, "inventory", "inventory_ndx"))
        }
        RepositoryStore::Memory => {
            Box::new(MemoryInventoryRepository::new())
        }
    }
}
