use async_trait::async_trait;
use crate::core::library::{CatalogSource, LibraryError, LibraryResult};
use crate::inventory::repository::InventoryRepository;
use crate::isbn;
use crate::sources::CatalogClient;
use crate::sources::record::CatalogRecord;

// Serves the branch inventory as a catalog source; its records carry availability.
pub(crate) struct LocalCatalogClient {
    inventory: Box<dyn InventoryRepository>,
}

impl LocalCatalogClient {
    pub(crate) fn new(inventory: Box<dyn InventoryRepository>) -> Self {
        Self {
            inventory,
        }
    }
}

#[async_trait]
impl CatalogClient for LocalCatalogClient {
    fn source(&self) -> CatalogSource {
        CatalogSource::Local
    }

    async fn search(&self, query: &str, max_results: usize) -> LibraryResult<Vec<CatalogRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(vec![]);
        }
        let books = self.inventory.find_by_text(query, max_results).await?;
        Ok(books.iter().map(CatalogRecord::from).collect())
    }

    async fn lookup_by_isbn(&self, isbn: &str) -> LibraryResult<Option<CatalogRecord>> {
        Ok(self.lookup_matches(isbn, 1).await?.into_iter().next())
    }

    async fn lookup_matches(&self, isbn: &str, limit: usize) -> LibraryResult<Vec<CatalogRecord>> {
        let key = isbn::lookup_key(isbn);
        if key.is_empty() {
            return Ok(vec![]);
        }
        let mut books = self.inventory.find_by_isbn(key.as_str(), limit).await?;
        // books entered with an unverifiable ISBN are stored under their raw digits
        let raw = isbn::compact(isbn);
        if books.is_empty() && raw != key {
            books = self.inventory.find_by_isbn(raw.as_str(), limit).await?;
        }
        Ok(books.iter().map(CatalogRecord::from).collect())
    }

    async fn get_by_id(&self, key: &str) -> LibraryResult<Option<CatalogRecord>> {
        match self.inventory.get(key).await {
            Ok(book) => Ok(Some(CatalogRecord::from(&book))),
            Err(LibraryError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::library::CatalogSource;
    use crate::inventory::domain::model::InventoryBookEntity;
    use crate::inventory::repository::memory_inventory_repository::MemoryInventoryRepository;
    use crate::sources::CatalogClient;
    use crate::sources::local::LocalCatalogClient;

    fn build_client(books: Vec<InventoryBookEntity>) -> LocalCatalogClient {
        LocalCatalogClient::new(Box::new(MemoryInventoryRepository::with_books(books)))
    }

    #[tokio::test]
    async fn test_should_search_local_inventory() {
        let client = build_client(vec![
            InventoryBookEntity::new("Nineteen Eighty-Four", "George Orwell", "Fiction", Some("9780451524935"), 2),
            InventoryBookEntity::new("Animal Farm", "George Orwell", "Fiction", None, 1),
            InventoryBookEntity::new("Brave New World", "Aldous Huxley", "Fiction", None, 1),
        ]);
        let records = client.search("orwell", 40).await.expect("should search");
        assert_eq!(2, records.len());
        assert!(records.iter().all(|r| r.source == CatalogSource::Local));
        assert_eq!(Some(2), records[0].available_copies);
        assert!(client.search("   ", 40).await.expect("should search").is_empty());
    }

    #[tokio::test]
    async fn test_should_lookup_local_isbn_in_either_form() {
        let client = build_client(vec![
            InventoryBookEntity::new("The Odyssey", "Homer", "Classics", Some("0140449132"), 1),
            InventoryBookEntity::new("The Odyssey", "Homer", "Classics", Some("978-0-14-044913-6"), 1),
            InventoryBookEntity::new("Odd Import", "Nobody", "General", Some("12345-678"), 1),
        ]);
        let found = client.lookup_matches("0-14-044913-2", 3).await.expect("should look up");
        assert_eq!(2, found.len());
        assert!(found.iter().all(|r| r.isbn13.as_deref() == Some("9780140449136")));

        let found = client.lookup_by_isbn("9780140449136").await.expect("should look up");
        assert!(found.is_some());

        let found = client.lookup_by_isbn("9791032305690").await.expect("should look up");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_should_get_local_record_by_key() {
        let book = InventoryBookEntity::new("Dune", "Frank Herbert", "Science Fiction", None, 1);
        let book_id = book.book_id.to_string();
        let client = build_client(vec![book]);
        let record = client.get_by_id(book_id.as_str()).await.expect("should get").expect("should exist");
        assert_eq!(format!("local:{}", book_id), record.id);
        assert!(client.get_by_id("missing").await.expect("should not fail").is_none());
    }
}
