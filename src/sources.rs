pub mod factory;
pub mod google_books;
pub mod guard;
pub mod local;
pub mod open_library;
pub mod record;

use async_trait::async_trait;
use crate::core::library::{CatalogSource, LibraryResult};
use crate::sources::record::CatalogRecord;

// CatalogClient is one bibliographic source the lookup fans out to. Implementations
// report failures; the guard decides what a failure degrades to.
#[async_trait]
pub(crate) trait CatalogClient: Sync + Send {
    fn source(&self) -> CatalogSource;

    async fn search(&self, query: &str, max_results: usize) -> LibraryResult<Vec<CatalogRecord>>;

    async fn lookup_by_isbn(&self, isbn: &str) -> LibraryResult<Option<CatalogRecord>>;

    // sources that can hold several copies of one ISBN override this
    async fn lookup_matches(&self, isbn: &str, limit: usize) -> LibraryResult<Vec<CatalogRecord>> {
        let found = self.lookup_by_isbn(isbn).await?;
        Ok(found.into_iter().take(limit).collect())
    }

    // `key` is the part of a composite id after the source prefix
    async fn get_by_id(&self, key: &str) -> LibraryResult<Option<CatalogRecord>>;
}
