use std::sync::RwLock;
use async_trait::async_trait;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::Repository;
use crate::inventory::domain::model::InventoryBookEntity;
use crate::inventory::repository::InventoryRepository;

// In-process inventory, kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryInventoryRepository {
    books: RwLock<Vec<InventoryBookEntity>>,
}

impl MemoryInventoryRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_books(books: Vec<InventoryBookEntity>) -> Self {
        Self { books: RwLock::new(books) }
    }

    fn filtered<P>(&self, limit: usize, predicate: P) -> LibraryResult<Vec<InventoryBookEntity>>
        where P: Fn(&InventoryBookEntity) -> bool {
        let books = self.books.read()
            .map_err(|_| LibraryError::runtime("inventory lock poisoned", None))?;
        Ok(books.iter().filter(|b| predicate(b)).take(limit).cloned().collect())
    }
}

#[async_trait]
impl Repository<InventoryBookEntity> for MemoryInventoryRepository {
    async fn create(&self, entity: &InventoryBookEntity) -> LibraryResult<usize> {
        let mut books = self.books.write()
            .map_err(|_| LibraryError::runtime("inventory lock poisoned", None))?;
        if books.iter().any(|b| b.book_id == entity.book_id) {
            return Err(LibraryError::duplicate_key(format!("book {} already exists", entity.book_id).as_str()));
        }
        books.push(entity.clone());
        Ok(1)
    }

    async fn get(&self, id: &str) -> LibraryResult<InventoryBookEntity> {
        self.filtered(1, |b| b.book_id == id)?
            .pop()
            .ok_or_else(|| LibraryError::not_found(format!("book not found for {}", id).as_str()))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let mut books = self.books.write()
            .map_err(|_| LibraryError::runtime("inventory lock poisoned", None))?;
        let before = books.len();
        books.retain(|b| b.book_id != id);
        Ok(before - books.len())
    }
}

#[async_trait]
impl InventoryRepository for MemoryInventoryRepository {
    async fn find_by_text(&self, text: &str, limit: usize) -> LibraryResult<Vec<InventoryBookEntity>> {
        self.filtered(limit, |b| b.matches_text(text))
    }

    async fn find_by_isbn(&self, isbn: &str, limit: usize) -> LibraryResult<Vec<InventoryBookEntity>> {
        if isbn.is_empty() {
            return Ok(vec![]);
        }
        self.filtered(limit, |b| b.matches_isbn(isbn))
    }
}

#[cfg(test)]
mod tests {
    use crate::core::library::LibraryError;
    use crate::core::repository::Repository;
    use crate::inventory::domain::model::InventoryBookEntity;
    use crate::inventory::repository::InventoryRepository;
    use crate::inventory::repository::memory_inventory_repository::MemoryInventoryRepository;

    #[tokio::test]
    async fn test_should_create_get_delete_books() {
        let repo = MemoryInventoryRepository::new();
        let book = InventoryBookEntity::new("Dune", "Frank Herbert", "Science Fiction", None, 1);
        assert_eq!(1, repo.create(&book).await.expect("should create book"));
        assert!(matches!(repo.create(&book).await, Err(LibraryError::DuplicateKey { .. })));

        let loaded = repo.get(book.book_id.as_str()).await.expect("should return book");
        assert_eq!(book, loaded);

        assert_eq!(1, repo.delete(book.book_id.as_str()).await.expect("should delete book"));
        assert!(repo.get(book.book_id.as_str()).await.is_err());
    }

    #[tokio::test]
    async fn test_should_find_by_text_with_limit() {
        let books = (0..50)
            .map(|i| InventoryBookEntity::new(format!("Orwell Reader {}", i).as_str(), "Various", "Essays", None, 1))
            .collect();
        let repo = MemoryInventoryRepository::with_books(books);
        assert_eq!(40, repo.find_by_text("orwell", 40).await.expect("should search").len());
        assert!(repo.find_by_text("tolstoy", 40).await.expect("should search").is_empty());
    }

    #[tokio::test]
    async fn test_should_find_by_isbn() {
        let repo = MemoryInventoryRepository::with_books(vec![
            InventoryBookEntity::new("The Odyssey", "Homer", "Classics", Some("0140449132"), 3),
            InventoryBookEntity::new("The Iliad", "Homer", "Classics", Some("9780140447941"), 1),
        ]);
        let found = repo.find_by_isbn("9780140449136", 3).await.expect("should look up");
        assert_eq!(1, found.len());
        assert_eq!("The Odyssey", found[0].title.as_str());
        assert!(repo.find_by_isbn("", 3).await.expect("should look up").is_empty());
    }
}
