use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use crate::core::library::{CatalogSource, LibraryResult};
use crate::isbn;
use crate::sources::CatalogClient;
use crate::sources::record::CatalogRecord;
use crate::utils::http::get_json;
use crate::utils::json::{array_strings, first_string, int_prop, object_prop, string_prop};

const MAX_PAGE_SIZE: usize = 40;
const ISBN_CANDIDATES: usize = 5;

// Client for the Google Books volumes API.
pub(crate) struct GoogleBooksClient {
    http: Client,
    base_url: String,
}

impl GoogleBooksClient {
    pub(crate) fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn volume(&self, id: &str) -> LibraryResult<Option<CatalogRecord>> {
        let url = format!("{}/volumes/{}", self.base_url, urlencoding::encode(id));
        Ok(get_json(&self.http, url.as_str()).await?
            .and_then(|doc| map_volume(&doc, Some(id))))
    }

    async fn find_isbn(&self, wanted: &str) -> LibraryResult<Option<CatalogRecord>> {
        let url = format!("{}/volumes?q=isbn:{}&maxResults={}",
                          self.base_url, urlencoding::encode(wanted), ISBN_CANDIDATES);
        let doc = match get_json(&self.http, url.as_str()).await? {
            Some(doc) => doc,
            None => return Ok(None),
        };
        let items = volume_items(&doc);
        let exact = items.iter()
            .find(|item| extract_isbns(object_prop(item, "volumeInfo")).0.as_deref() == Some(wanted));
        let chosen = match exact.or_else(|| items.first()) {
            Some(item) => item,
            None => return Ok(None),
        };
        let partial = map_volume(chosen, None);
        let id = match string_prop(chosen, "id") {
            Some(id) => id,
            None => return Ok(partial),
        };
        // the search listing is abridged, so prefer the full volume when it can be read
        match self.volume(id.as_str()).await {
            Ok(Some(full)) => Ok(Some(full)),
            Ok(None) => Ok(partial),
            Err(err) => {
                warn!(volume = id.as_str(), error = %err, "falling back to search listing for volume");
                Ok(partial)
            }
        }
    }
}

#[async_trait]
impl CatalogClient for GoogleBooksClient {
    fn source(&self) -> CatalogSource {
        CatalogSource::GoogleBooks
    }

    async fn search(&self, query: &str, max_results: usize) -> LibraryResult<Vec<CatalogRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(vec![]);
        }
        let url = format!("{}/volumes?q={}&maxResults={}",
                          self.base_url, urlencoding::encode(query), max_results.clamp(1, MAX_PAGE_SIZE));
        let doc = get_json(&self.http, url.as_str()).await?;
        let records: Vec<CatalogRecord> = doc.as_ref()
            .map(|doc| volume_items(doc).iter().filter_map(|item| map_volume(item, None)).collect())
            .unwrap_or_default();
        debug!(query, count = records.len(), "google books search");
        Ok(records)
    }

    async fn lookup_by_isbn(&self, isbn: &str) -> LibraryResult<Option<CatalogRecord>> {
        let wanted = isbn::lookup_key(isbn);
        if wanted.is_empty() {
            return Ok(None);
        }
        if let Some(found) = self.find_isbn(wanted.as_str()).await? {
            return Ok(Some(found));
        }
        let raw = isbn::compact(isbn);
        if raw != wanted && !raw.is_empty() {
            return self.find_isbn(raw.as_str()).await;
        }
        Ok(None)
    }

    async fn get_by_id(&self, key: &str) -> LibraryResult<Option<CatalogRecord>> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(None);
        }
        self.volume(key).await
    }
}

fn volume_items(doc: &Value) -> Vec<Value> {
    match doc.get("items") {
        Some(Value::Array(items)) => items.clone(),
        _ => vec![],
    }
}

// volumes without an id cannot be retrieved later and are dropped
fn map_volume(item: &Value, fallback_id: Option<&str>) -> Option<CatalogRecord> {
    let id = string_prop(item, "id").or_else(|| fallback_id.map(str::to_string))?;
    let info = object_prop(item, "volumeInfo");
    let (isbn13, isbn10) = extract_isbns(info);
    let authors = array_strings(info, "authors").join(", ");
    let links = object_prop(info, "imageLinks");

    let mut record = CatalogRecord::new(CatalogSource::GoogleBooks, id.as_str(),
                                        string_prop(info, "title"), Some(authors))
        .with_isbns(isbn13.as_deref(), isbn10.as_deref())
        .with_category(first_string(info, "categories"))
        .with_thumbnail(string_prop(links, "thumbnail").or_else(|| string_prop(links, "smallThumbnail")));
    record.publisher = string_prop(info, "publisher");
    record.published_date = string_prop(info, "publishedDate");
    record.language = string_prop(info, "language");
    record.page_count = int_prop(info, "pageCount");
    record.description = string_prop(info, "description");
    Some(record)
}

fn extract_isbns(info: &Value) -> (Option<String>, Option<String>) {
    let mut isbn13 = None;
    let mut isbn10 = None;
    if let Some(Value::Array(ids)) = info.get("industryIdentifiers") {
        for id in ids {
            let identifier = string_prop(id, "identifier");
            match string_prop(id, "type").as_deref() {
                Some("ISBN_13") => isbn13 = identifier.as_deref().and_then(isbn::normalize_isbn13).or(isbn13),
                Some("ISBN_10") => isbn10 = identifier.as_deref().and_then(isbn::normalize_isbn10).or(isbn10),
                _ => {}
            }
        }
    }
    (isbn13, isbn10)
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router};
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use std::collections::HashMap;
    use crate::core::domain::Configuration;
    use crate::core::library::{CatalogSource, LibraryError};
    use crate::sources::CatalogClient;
    use crate::sources::google_books::GoogleBooksClient;
    use crate::utils::http::build_http_client;
    use crate::utils::testing::{fixture, serve};

    async fn build_client() -> GoogleBooksClient {
        let app = Router::new()
            .route("/volumes", get(|Query(params): Query<HashMap<String, String>>| async move {
                match params.get("q").map(String::as_str) {
                    Some("isbn:9791032305690") => Json(serde_json::json!({"totalItems": 0})),
                    _ => Json(fixture("google_search")),
                }
            }))
            .route("/volumes/zyTCAlFPjgYC", get(|| async { Json(fixture("google_volume")) }))
            .route("/volumes/broken", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }));
        let base = serve(app).await;
        let http = build_http_client(&Configuration::new("test")).expect("should build client");
        GoogleBooksClient::new(http, base.as_str())
    }

    #[tokio::test]
    async fn test_should_map_search_results() {
        let client = build_client().await;
        let records = client.search("odyssey", 16).await.expect("should search");
        // the volume without an id is dropped
        assert_eq!(3, records.len());

        let orwell = &records[0];
        assert_eq!("google:abc1984xyz", orwell.id.as_str());
        assert_eq!(Some("9780451524935"), orwell.isbn13.as_deref());
        assert_eq!(Some("0451524934"), orwell.isbn10.as_deref());
        assert_eq!("George Orwell", orwell.author.as_str());
        assert_eq!(Some(328), orwell.page_count);
        assert_eq!(Some("https://books.google.com/books/content?id=abc1984xyz&img=1&zoom=1"), orwell.thumbnail_url.as_deref());
        assert_eq!(CatalogSource::GoogleBooks, orwell.source);

        let odyssey = &records[1];
        assert_eq!("Homer, Robert Fagles", odyssey.author.as_str());
        assert_eq!("Poetry", odyssey.category.as_str());

        let sparse = &records[2];
        assert_eq!("Untitled", sparse.title.as_str());
        assert_eq!("Unknown", sparse.author.as_str());
        assert_eq!("General", sparse.category.as_str());
        assert_eq!(None, sparse.isbn13);
        assert_eq!(None, sparse.page_count);
        assert_eq!(None, sparse.thumbnail_url);
    }

    #[tokio::test]
    async fn test_should_skip_blank_queries() {
        let client = build_client().await;
        assert!(client.search("  ", 16).await.expect("should search").is_empty());
    }

    #[tokio::test]
    async fn test_should_lookup_isbn_with_full_volume() {
        let client = build_client().await;
        let record = client.lookup_by_isbn("978-0-14-044913-6").await.expect("should look up")
            .expect("should find volume");
        assert_eq!("google:zyTCAlFPjgYC", record.id.as_str());
        assert_eq!(Some(541), record.page_count);
        assert_eq!(Some("0140449132"), record.isbn10.as_deref());
        assert!(record.description.is_some());

        let none = client.lookup_by_isbn("9791032305690").await.expect("should look up");
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_should_get_volume_by_id() {
        let client = build_client().await;
        let record = client.get_by_id("zyTCAlFPjgYC").await.expect("should get").expect("should exist");
        assert_eq!("The Odyssey", record.title.as_str());
        assert!(client.get_by_id("unknown").await.expect("should map 404").is_none());
        let err = client.get_by_id("broken").await.expect_err("should fail");
        assert!(matches!(err, LibraryError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_should_report_connection_refused() {
        let http = build_http_client(&Configuration::new("test")).expect("should build client");
        let client = GoogleBooksClient::new(http, "http://127.0.0.1:1");
        let err = client.search("dune", 16).await.expect_err("should fail");
        assert!(matches!(err, LibraryError::Transport { .. }));
    }
}
