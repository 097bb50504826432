use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use crate::core::library::{CatalogSource, LibraryResult};
use crate::isbn;
use crate::sources::CatalogClient;
use crate::sources::record::CatalogRecord;
use crate::utils::http::get_json;
use crate::utils::json::{array_strings, first_string, int_prop, string_prop};

const MAX_PAGE_SIZE: usize = 50;
const MAX_AUTHOR_LOOKUPS: usize = 3;

// Client for the Open Library search, edition and author documents.
pub(crate) struct OpenLibraryClient {
    http: Client,
    base_url: String,
    covers_url: String,
}

impl OpenLibraryClient {
    pub(crate) fn new(http: Client, base_url: &str, covers_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            covers_url: covers_url.trim_end_matches('/').to_string(),
        }
    }

    fn cover_url(&self, cover_id: Option<String>, size: &str) -> Option<String> {
        // Open Library uses -1 for "no cover"
        cover_id.filter(|id| !id.starts_with('-'))
            .map(|id| format!("{}/b/id/{}-{}.jpg", self.covers_url, id, size))
    }

    fn map_search_doc(&self, doc: &Value) -> Option<CatalogRecord> {
        let key = first_string(doc, "edition_key").map(|ed| format!("books/{}", ed))
            .or_else(|| string_prop(doc, "key").map(|k| k.trim_start_matches('/').to_string()))?;
        let isbns = array_strings(doc, "isbn");
        let isbn13 = isbns.iter().find_map(|i| isbn::normalize_isbn13(i));
        let isbn10 = isbns.iter().find_map(|i| isbn::normalize_isbn10(i));

        let mut record = CatalogRecord::new(CatalogSource::OpenLibrary, key.as_str(),
                                            string_prop(doc, "title"),
                                            Some(array_strings(doc, "author_name").join(", ")))
            .with_isbns(isbn13.as_deref(), isbn10.as_deref())
            .with_thumbnail(self.cover_url(string_prop(doc, "cover_i"), "M"));
        record.publisher = first_string(doc, "publisher");
        record.published_date = string_prop(doc, "first_publish_year");
        record.language = first_string(doc, "language");
        Some(record)
    }

    // edition and work documents share enough shape to be mapped together
    async fn map_edition(&self, doc: &Value, fallback_key: &str, queried_isbn: Option<&str>) -> CatalogRecord {
        let key = string_prop(doc, "key")
            .map(|k| k.trim_start_matches('/').to_string())
            .unwrap_or_else(|| fallback_key.to_string());
        let isbn13 = array_strings(doc, "isbn_13").iter().find_map(|i| isbn::normalize_isbn13(i))
            .or_else(|| queried_isbn.and_then(isbn::normalize_isbn13));
        let isbn10 = array_strings(doc, "isbn_10").iter().find_map(|i| isbn::normalize_isbn10(i))
            .or_else(|| queried_isbn.and_then(isbn::normalize_isbn10));
        let author = match string_prop(doc, "by_statement") {
            Some(by) => Some(by),
            None => self.author_names(doc).await,
        };

        let mut record = CatalogRecord::new(CatalogSource::OpenLibrary, key.as_str(),
                                            string_prop(doc, "title"), author)
            .with_isbns(isbn13.as_deref(), isbn10.as_deref())
            .with_thumbnail(self.cover_url(first_string(doc, "covers"), "L"));
        record.publisher = first_string(doc, "publishers");
        record.published_date = string_prop(doc, "publish_date");
        record.page_count = int_prop(doc, "number_of_pages");
        record.language = language_code(doc);
        record.description = string_prop(doc, "description").or_else(|| string_prop(doc, "notes"));
        record
    }

    // Resolves up to three author references; unreadable authors are skipped.
    async fn author_names(&self, doc: &Value) -> Option<String> {
        let keys: Vec<String> = match doc.get("authors") {
            Some(Value::Array(authors)) => authors.iter()
                .filter_map(|a| string_prop(a, "key").or_else(|| a.get("author").and_then(|inner| string_prop(inner, "key"))))
                .take(MAX_AUTHOR_LOOKUPS)
                .collect(),
            _ => vec![],
        };
        if keys.is_empty() {
            return None;
        }
        let lookups = keys.iter().map(|key| {
            let url = format!("{}/{}.json", self.base_url, key.trim_start_matches('/'));
            async move {
                match get_json(&self.http, url.as_str()).await {
                    Ok(doc) => doc.and_then(|d| string_prop(&d, "name")),
                    Err(err) => {
                        debug!(url = url.as_str(), error = %err, "skipping unreadable author");
                        None
                    }
                }
            }
        });
        let names: Vec<String> = join_all(lookups).await.into_iter().flatten().collect();
        if names.is_empty() { None } else { Some(names.join(", ")) }
    }
}

#[async_trait]
impl CatalogClient for OpenLibraryClient {
    fn source(&self) -> CatalogSource {
        CatalogSource::OpenLibrary
    }

    async fn search(&self, query: &str, max_results: usize) -> LibraryResult<Vec<CatalogRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(vec![]);
        }
        let url = format!("{}/search.json?q={}&limit={}",
                          self.base_url, urlencoding::encode(query), max_results.clamp(1, MAX_PAGE_SIZE));
        let records: Vec<CatalogRecord> = match get_json(&self.http, url.as_str()).await? {
            Some(Value::Object(root)) => match root.get("docs") {
                Some(Value::Array(docs)) => docs.iter().filter_map(|d| self.map_search_doc(d)).collect(),
                _ => vec![],
            },
            _ => vec![],
        };
        debug!(query, count = records.len(), "open library search");
        Ok(records)
    }

    // tries the ISBN-13 form first, then the digits as given
    async fn lookup_by_isbn(&self, isbn: &str) -> LibraryResult<Option<CatalogRecord>> {
        let mut candidates = vec![isbn::lookup_key(isbn), isbn::compact(isbn)];
        candidates.dedup();
        for clean in candidates.iter().filter(|c| c.len() == 10 || c.len() == 13) {
            let url = format!("{}/isbn/{}.json", self.base_url, urlencoding::encode(clean.as_str()));
            if let Some(doc) = get_json(&self.http, url.as_str()).await? {
                let fallback_key = format!("isbn/{}", clean);
                return Ok(Some(self.map_edition(&doc, fallback_key.as_str(), Some(clean.as_str())).await));
            }
        }
        Ok(None)
    }

    async fn get_by_id(&self, key: &str) -> LibraryResult<Option<CatalogRecord>> {
        let key = key.trim().trim_start_matches('/');
        let key = key.strip_suffix(".json").unwrap_or(key);
        if key.is_empty() {
            return Ok(None);
        }
        let url = format!("{}/{}.json", self.base_url, key);
        match get_json(&self.http, url.as_str()).await? {
            Some(doc) => Ok(Some(self.map_edition(&doc, key, None).await)),
            None => Ok(None),
        }
    }
}

// "/languages/eng" -> "eng"
fn language_code(doc: &Value) -> Option<String> {
    match doc.get("languages") {
        Some(Value::Array(langs)) => langs.first()
            .and_then(|l| string_prop(l, "key"))
            .and_then(|k| k.rsplit('/').next().map(str::to_string))
            .filter(|k| !k.is_empty()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router};
    use axum::routing::get;
    use serde_json::json;
    use crate::core::domain::Configuration;
    use crate::core::library::CatalogSource;
    use crate::sources::CatalogClient;
    use crate::sources::open_library::OpenLibraryClient;
    use crate::utils::http::build_http_client;
    use crate::utils::testing::{fixture, serve};

    async fn build_client() -> OpenLibraryClient {
        let app = Router::new()
            .route("/search.json", get(|| async { Json(fixture("openlibrary_search")) }))
            .route("/isbn/9780140449136.json", get(|| async { Json(fixture("openlibrary_edition")) }))
            .route("/books/OL7353617M.json", get(|| async { Json(fixture("openlibrary_edition")) }))
            .route("/books/OL2M.json", get(|| async {
                Json(json!({"title": "Signed", "by_statement": "by A. Writer", "covers": [-1]}))
            }))
            .route("/authors/OL12345A.json", get(|| async { Json(fixture("openlibrary_author")) }));
        let base = serve(app).await;
        let http = build_http_client(&Configuration::new("test")).expect("should build client");
        OpenLibraryClient::new(http, base.as_str(), "https://covers.openlibrary.org")
    }

    #[tokio::test]
    async fn test_should_map_search_docs() {
        let client = build_client().await;
        let records = client.search("odyssey", 16).await.expect("should search");
        // the doc without any key is dropped
        assert_eq!(2, records.len());

        let odyssey = &records[0];
        assert_eq!("openlibrary:books/OL7353617M", odyssey.id.as_str());
        assert_eq!(Some("9780140449136"), odyssey.isbn13.as_deref());
        assert_eq!(Some("0140449132"), odyssey.isbn10.as_deref());
        assert_eq!(Some("https://covers.openlibrary.org/b/id/8231856-M.jpg"), odyssey.thumbnail_url.as_deref());
        assert_eq!(Some("1614"), odyssey.published_date.as_deref());
        assert_eq!(Some("Penguin Books"), odyssey.publisher.as_deref());
        assert_eq!("General", odyssey.category.as_str());

        let orwell = &records[1];
        assert_eq!("openlibrary:works/OL1168007W", orwell.id.as_str());
        assert_eq!(Some("9780451524935"), orwell.isbn13.as_deref());
        assert_eq!(None, orwell.thumbnail_url);
    }

    #[tokio::test]
    async fn test_should_lookup_edition_by_isbn() {
        let client = build_client().await;
        let record = client.lookup_by_isbn("9780140449136").await.expect("should look up")
            .expect("should find edition");
        assert_eq!("openlibrary:books/OL7353617M", record.id.as_str());
        assert_eq!(CatalogSource::OpenLibrary, record.source);
        assert_eq!("Homer", record.author.as_str());
        assert_eq!(Some(541), record.page_count);
        assert_eq!(Some("eng"), record.language.as_deref());
        assert_eq!(Some("An epic poem attributed to Homer."), record.description.as_deref());
        assert_eq!(Some("https://covers.openlibrary.org/b/id/8231856-L.jpg"), record.thumbnail_url.as_deref());
        assert_eq!(Some("0140449132"), record.isbn10.as_deref());

        let record = client.lookup_by_isbn("0-14-044913-2").await.expect("should look up");
        assert_eq!(Some("openlibrary:books/OL7353617M"), record.as_ref().map(|r| r.id.as_str()));

        assert!(client.lookup_by_isbn("9780306406157").await.expect("should map 404").is_none());
        assert!(client.lookup_by_isbn("12345").await.expect("should skip").is_none());
    }

    #[tokio::test]
    async fn test_should_get_edition_by_key() {
        let client = build_client().await;
        let record = client.get_by_id("books/OL7353617M").await.expect("should get").expect("should exist");
        assert_eq!("The Odyssey", record.title.as_str());

        let record = client.get_by_id("/books/OL2M.json").await.expect("should get").expect("should exist");
        assert_eq!("openlibrary:books/OL2M", record.id.as_str());
        assert_eq!("by A. Writer", record.author.as_str());
        assert_eq!(None, record.thumbnail_url);
        assert_eq!("General", record.category.as_str());

        assert!(client.get_by_id("works/OL404W").await.expect("should map 404").is_none());
    }
}
