pub mod service;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use crate::core::library::{CatalogSource, LibraryError, LibraryResult};
use crate::sources::record::CatalogRecord;

// FederatedLookup keeps the per-source answers of one ISBN lookup side by side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FederatedLookup {
    pub local: Option<CatalogRecord>,
    pub google_books: Option<CatalogRecord>,
    pub open_library: Option<CatalogRecord>,
}

/// Restricts a lookup to some of the configured sources, e.g. only the local inventory
/// when a librarian checks stock, or only the external catalogs when importing a book.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LookupScope {
    #[default]
    All,
    Only(Vec<CatalogSource>),
}

impl LookupScope {
    pub fn includes(&self, source: CatalogSource) -> bool {
        match self {
            LookupScope::All => true,
            LookupScope::Only(sources) => sources.contains(&source),
        }
    }

    // comma-separated source prefixes such as `local,google`; absent or blank means all
    pub fn parse(raw: Option<&str>) -> LibraryResult<LookupScope> {
        let mut sources = vec![];
        for name in raw.unwrap_or_default().split(',').map(str::trim).filter(|name| !name.is_empty()) {
            let source = CatalogSource::from_prefix(name).ok_or_else(|| LibraryError::validation(
                format!("unknown catalog source {}", name).as_str(), None))?;
            if !sources.contains(&source) {
                sources.push(source);
            }
        }
        if sources.is_empty() {
            Ok(LookupScope::All)
        } else {
            Ok(LookupScope::Only(sources))
        }
    }
}

// Every operation stops with `LibraryError::Cancelled` once `cancel` fires. Source
// failures never surface here; they only shrink the result. Sources outside `scope`
// are never called.
#[async_trait]
pub(crate) trait LookupService: Sync + Send {
    async fn search_all(&self, query: &str, scope: &LookupScope, cancel: &CancellationToken) -> LibraryResult<Vec<CatalogRecord>>;
    async fn lookup_isbn_federated(&self, isbn: &str, scope: &LookupScope, cancel: &CancellationToken) -> LibraryResult<Vec<CatalogRecord>>;
    async fn lookup_isbn_by_source(&self, isbn: &str, scope: &LookupScope, cancel: &CancellationToken) -> LibraryResult<FederatedLookup>;
    async fn get_by_composite_id(&self, id: &str, cancel: &CancellationToken) -> LibraryResult<Option<CatalogRecord>>;
}

#[cfg(test)]
mod tests {
    use crate::core::library::{CatalogSource, LibraryError};
    use crate::lookup::domain::LookupScope;

    #[tokio::test]
    async fn test_should_parse_lookup_scope() {
        assert_eq!(LookupScope::All, LookupScope::parse(None).expect("should parse"));
        assert_eq!(LookupScope::All, LookupScope::parse(Some(" , ")).expect("should parse"));
        let scope = LookupScope::parse(Some("local, google,l")).expect("should parse");
        assert_eq!(LookupScope::Only(vec![CatalogSource::Local, CatalogSource::GoogleBooks]), scope);
        assert!(scope.includes(CatalogSource::Local));
        assert!(!scope.includes(CatalogSource::OpenLibrary));
        assert!(LookupScope::All.includes(CatalogSource::OpenLibrary));
        assert!(matches!(LookupScope::parse(Some("local,amazon")), Err(LibraryError::Validation { .. })));
    }
}
