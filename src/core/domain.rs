use std::str::FromStr;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const GOOGLE_BOOKS_URL: &str = "https://www.googleapis.com/books/v1";
pub const OPEN_LIBRARY_URL: &str = "https://openlibrary.org";
pub const OPEN_LIBRARY_COVERS_URL: &str = "https://covers.openlibrary.org";
pub const DYNAMODB_LOCAL_URL: &str = "http://localhost:8000";
pub const USER_AGENT: &str = "lms-lookup/0.1";

// Configuration abstracts config options for the federated lookup
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub(crate) struct Configuration {
    pub branch_id: String,
    pub google_books_url: String,
    pub open_library_url: String,
    pub open_library_covers_url: String,
    pub dynamodb_endpoint: String,
    pub user_agent: String,
    // applied uniformly to every call a source client makes
    pub source_timeout_ms: u64,
    pub external_page_size: usize,
    pub local_search_limit: usize,
    pub local_isbn_limit: usize,
}

impl Configuration {
    pub fn new(branch_id: &str) -> Self {
        Configuration {
            branch_id: branch_id.to_string(),
            google_books_url: GOOGLE_BOOKS_URL.to_string(),
            open_library_url: OPEN_LIBRARY_URL.to_string(),
            open_library_covers_url: OPEN_LIBRARY_COVERS_URL.to_string(),
            dynamodb_endpoint: DYNAMODB_LOCAL_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            source_timeout_ms: 10_000,
            external_page_size: 16,
            local_search_limit: 40,
            local_isbn_limit: 3,
        }
    }

    // overlays LMS_* environment variables on top of the defaults
    pub fn from_env(branch_id: &str) -> Self {
        Self::new(branch_id).with_overrides(|name| std::env::var(name).ok())
    }

    pub(crate) fn with_overrides<F>(mut self, lookup: F) -> Self
        where F: Fn(&str) -> Option<String> {
        if let Some(url) = lookup("LMS_GOOGLE_BOOKS_URL") {
            self.google_books_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("LMS_OPEN_LIBRARY_URL") {
            self.open_library_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("LMS_OPEN_LIBRARY_COVERS_URL") {
            self.open_library_covers_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("LMS_DYNAMODB_ENDPOINT") {
            self.dynamodb_endpoint = url;
        }
        if let Some(ms) = parse_var(&lookup, "LMS_SOURCE_TIMEOUT_MS") {
            self.source_timeout_ms = ms;
        }
        if let Some(size) = parse_var(&lookup, "LMS_EXTERNAL_PAGE_SIZE") {
            self.external_page_size = size;
        }
        if let Some(limit) = parse_var(&lookup, "LMS_LOCAL_SEARCH_LIMIT") {
            self.local_search_limit = limit;
        }
        if let Some(limit) = parse_var(&lookup, "LMS_LOCAL_ISBN_LIMIT") {
            self.local_isbn_limit = limit;
        }
        self
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }
}

fn parse_var<T: FromStr, F: Fn(&str) -> Option<String>>(lookup: &F, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse::<T>() {
        Ok(val) => Some(val),
        Err(_) => {
            warn!(variable = name, value = raw.as_str(), "ignoring unparsable configuration value");
            None
        }
    }
}
