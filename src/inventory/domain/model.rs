use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;
use serde::{Deserialize, Serialize};
use crate::isbn;
use crate::utils::date::serializer;

// InventoryBookEntity abstracts a title held by the local branch; copies are counted, not
// individually identified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct InventoryBookEntity {
    pub book_id: String,
    pub version: i64,
    pub title: String,
    pub author: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    // GSI hash key; must be omitted rather than null when there is no ISBN
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean_isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub total_copies: i64,
    pub available_copies: i64,
    pub search_key: String,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl InventoryBookEntity {
    pub fn new(title: &str, author: &str, category: &str, isbn: Option<&str>, copies: i64) -> Self {
        let raw_isbn = isbn.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        Self {
            book_id: Uuid::new_v4().to_string(),
            version: 0,
            title: title.to_string(),
            author: author.to_string(),
            category: category.to_string(),
            clean_isbn: raw_isbn.as_deref().and_then(clean_isbn),
            isbn: raw_isbn,
            description: None,
            language: None,
            publisher: None,
            published_date: None,
            thumbnail_url: None,
            total_copies: copies,
            available_copies: copies,
            search_key: search_key(title, author, category),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    // case-insensitive substring over title/author/category, or digit substring over the ISBN
    pub fn matches_text(&self, text: &str) -> bool {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        if self.search_key.contains(needle.as_str()) {
            return true;
        }
        let digits = isbn::only_digits(text);
        !digits.is_empty() && self.clean_isbn.as_deref().map_or(false, |i| i.contains(digits.as_str()))
    }

    pub fn matches_isbn(&self, key: &str) -> bool {
        let raw_digits = self.isbn.as_deref().map(isbn::compact);
        self.clean_isbn.as_deref() == Some(key) || raw_digits.as_deref() == Some(key)
    }
}

// ISBN-13 when derivable, otherwise the digit form of a ten digit ISBN
pub(crate) fn clean_isbn(raw: &str) -> Option<String> {
    isbn::normalize_isbn13(raw)
        .or_else(|| isbn::to_isbn13_from10(raw))
        .or_else(|| {
            let compact = isbn::compact(raw);
            if compact.len() == 10 { Some(compact) } else { None }
        })
}

pub(crate) fn search_key(title: &str, author: &str, category: &str) -> String {
    format!("{} {} {}", title, author, category).to_lowercase()
}
