use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use crate::core::library::CatalogSource;
use crate::inventory::domain::model::InventoryBookEntity;
use crate::isbn;

pub const UNTITLED: &str = "Untitled";
pub const UNKNOWN_AUTHOR: &str = "Unknown";
pub const GENERAL_CATEGORY: &str = "General";

// CatalogRecord is the request-scoped shape every source maps its results into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: String,
    pub isbn13: Option<String>,
    pub isbn10: Option<String>,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub category: String,
    pub language: Option<String>,
    pub published_date: Option<String>,
    pub page_count: Option<u32>,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    pub source: CatalogSource,
    // only the local inventory knows availability
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_copies: Option<i64>,
}

impl CatalogRecord {
    pub(crate) fn new(source: CatalogSource, key: &str, title: Option<String>, author: Option<String>) -> Self {
        Self {
            id: CompositeId::new(source, key).to_string(),
            isbn13: None,
            isbn10: None,
            title: non_blank(title).unwrap_or_else(|| UNTITLED.to_string()),
            author: non_blank(author).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            publisher: None,
            category: GENERAL_CATEGORY.to_string(),
            language: None,
            published_date: None,
            page_count: None,
            thumbnail_url: None,
            description: None,
            source,
            available_copies: None,
        }
    }

    // isbn13 always passes its checksum and isbn10 is derived from it whenever both exist
    pub(crate) fn with_isbns(mut self, isbn13: Option<&str>, isbn10: Option<&str>) -> Self {
        let (isbn13, isbn10) = isbn::resolve_pair(isbn13, isbn10);
        self.isbn13 = isbn13;
        self.isbn10 = isbn10;
        self
    }

    pub(crate) fn with_category(mut self, category: Option<String>) -> Self {
        self.category = non_blank(category).unwrap_or_else(|| GENERAL_CATEGORY.to_string());
        self
    }

    pub(crate) fn with_thumbnail(mut self, url: Option<String>) -> Self {
        self.thumbnail_url = secure_url(url);
        self
    }

    pub fn composite_id(&self) -> Option<CompositeId> {
        CompositeId::parse(self.id.as_str())
    }
}

impl From<&InventoryBookEntity> for CatalogRecord {
    fn from(other: &InventoryBookEntity) -> Self {
        let mut record = CatalogRecord::new(
            CatalogSource::Local, other.book_id.as_str(),
            Some(other.title.to_string()), Some(other.author.to_string()))
            .with_isbns(other.clean_isbn.as_deref(), other.isbn.as_deref())
            .with_category(Some(other.category.to_string()))
            .with_thumbnail(other.thumbnail_url.clone());
        record.publisher = other.publisher.clone();
        record.language = other.language.clone();
        record.published_date = other.published_date.clone();
        record.description = other.description.clone();
        record.available_copies = Some(other.available_copies);
        record
    }
}

/// A source-tagged record handle such as `google:zyTCAlFPjgYC`, resolved to its source once
/// at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeId {
    pub source: CatalogSource,
    pub key: String,
}

impl CompositeId {
    pub fn new(source: CatalogSource, key: &str) -> Self {
        Self {
            source,
            key: key.to_string(),
        }
    }

    /// `None` when the prefix is not a known source or the key is blank.
    pub fn parse(raw: &str) -> Option<CompositeId> {
        let (prefix, key) = raw.trim().split_once(':')?;
        let source = CatalogSource::from_prefix(prefix)?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some(CompositeId::new(source, key))
    }
}

impl Display for CompositeId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.source.prefix(), self.key)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub(crate) fn secure_url(url: Option<String>) -> Option<String> {
    non_blank(url).map(|u| match u.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => u,
    })
}

#[cfg(test)]
mod tests {
    use crate::core::library::CatalogSource;
    use crate::inventory::domain::model::InventoryBookEntity;
    use crate::sources::record::{CatalogRecord, CompositeId, GENERAL_CATEGORY, secure_url, UNKNOWN_AUTHOR, UNTITLED};

    #[tokio::test]
    async fn test_should_fill_placeholders() {
        let record = CatalogRecord::new(CatalogSource::GoogleBooks, "abc", Some("  ".to_string()), None);
        assert_eq!("google:abc", record.id.as_str());
        assert_eq!(UNTITLED, record.title.as_str());
        assert_eq!(UNKNOWN_AUTHOR, record.author.as_str());
        assert_eq!(GENERAL_CATEGORY, record.category.as_str());
    }

    #[tokio::test]
    async fn test_should_keep_isbn_pair_consistent() {
        let record = CatalogRecord::new(CatalogSource::OpenLibrary, "books/OL1M", None, None)
            .with_isbns(Some("9780140449136"), Some("0306406152"));
        assert_eq!(Some("9780140449136"), record.isbn13.as_deref());
        assert_eq!(Some("0140449132"), record.isbn10.as_deref());

        let record = CatalogRecord::new(CatalogSource::OpenLibrary, "books/OL1M", None, None)
            .with_isbns(Some("9780140449137"), None);
        assert_eq!(None, record.isbn13);
        assert_eq!(None, record.isbn10);
    }

    #[tokio::test]
    async fn test_should_parse_composite_ids() {
        let id = CompositeId::parse("google:zyTCAlFPjgYC").expect("should parse");
        assert_eq!(CatalogSource::GoogleBooks, id.source);
        assert_eq!("zyTCAlFPjgYC", id.key.as_str());

        let id = CompositeId::parse("o:books/OL7353617M").expect("should parse legacy prefix");
        assert_eq!(CatalogSource::OpenLibrary, id.source);
        assert_eq!("openlibrary:books/OL7353617M", id.to_string().as_str());

        let id = CompositeId::parse("l:42").expect("should parse legacy prefix");
        assert_eq!(CatalogSource::Local, id.source);

        assert_eq!(None, CompositeId::parse("ext-c:abc"));
        assert_eq!(None, CompositeId::parse("no-prefix"));
        assert_eq!(None, CompositeId::parse("local:  "));
    }

    #[tokio::test]
    async fn test_should_map_inventory_books() {
        let mut book = InventoryBookEntity::new("The Odyssey", "Homer", "", Some("0-14-044913-2"), 3);
        book.thumbnail_url = Some("http://covers.example.org/odyssey.jpg".to_string());
        let record = CatalogRecord::from(&book);
        assert_eq!(format!("local:{}", book.book_id), record.id);
        assert_eq!(CatalogSource::Local, record.source);
        assert_eq!(Some("9780140449136"), record.isbn13.as_deref());
        assert_eq!(Some("0140449132"), record.isbn10.as_deref());
        assert_eq!(GENERAL_CATEGORY, record.category.as_str());
        assert_eq!(Some(3), record.available_copies);
        assert_eq!(Some("https://covers.example.org/odyssey.jpg"), record.thumbnail_url.as_deref());
    }

    #[tokio::test]
    async fn test_should_secure_urls() {
        assert_eq!(Some("https://a.b/c".to_string()), secure_url(Some("http://a.b/c".to_string())));
        assert_eq!(Some("https://a.b/c".to_string()), secure_url(Some("https://a.b/c".to_string())));
        assert_eq!(None, secure_url(Some(" ".to_string())));
    }
}
