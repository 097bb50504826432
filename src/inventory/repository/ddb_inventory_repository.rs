use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;

use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::Repository;
use crate::inventory::domain::model::{InventoryBookEntity, search_key};
use crate::inventory::repository::InventoryRepository;
use crate::isbn;
use crate::utils::ddb::{parse_date_attribute, parse_item, parse_number_attribute, parse_string_attribute};

// upper bound on scan pages read for a single text search
const MAX_SCAN_PAGES: usize = 10;
const MAX_PAGE_ITEMS: usize = 500;

#[derive(Debug)]
pub struct DDBInventoryRepository {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DDBInventoryRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }
}

#[async_trait]
impl Repository<InventoryBookEntity> for DDBInventoryRepository {
    async fn create(&self, entity: &InventoryBookEntity) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        let val = serde_json::to_value(entity)?;
        self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(book_id)")
            .set_item(Some(parse_item(val)?))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn get(&self, id: &str) -> LibraryResult<InventoryBookEntity> {
        let table_name: &str = self.table_name.as_ref();
        self.client
            .query()
            .table_name(table_name)
            .limit(2)
            .consistent_read(true)
            .key_condition_expression(
                "book_id = :book_id",
            )
            .expression_attribute_values(
                ":book_id",
                AttributeValue::S(id.to_string()),
            )
            .send()
            .await.map_err(LibraryError::from).and_then(|req| {
            if let Some(items) = req.items {
                if items.len() > 1 {
                    return Err(LibraryError::database(format!("too many books for {}", id).as_str(), None, false));
                } else if let Some(map) = items.first() {
                    return Ok(map_to_inventory(map));
                }
                Err(LibraryError::not_found(format!("book item not found for {}", id).as_str()))
            } else {
                Err(LibraryError::not_found(format!("book not found for {}", id).as_str()))
            }
        })
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        self.client.delete_item()
            .table_name(table_name)
            .key("book_id", AttributeValue::S(id.to_string()))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }
}

#[async_trait]
impl InventoryRepository for DDBInventoryRepository {
    // DynamoDB has no secondary text index, so this is a filtered scan that stops once
    // `limit` matches are collected or MAX_SCAN_PAGES pages have been read.
    async fn find_by_text(&self, text: &str, limit: usize) -> LibraryResult<Vec<InventoryBookEntity>> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Ok(vec![]);
        }
        let digits = isbn::only_digits(text);
        let table_name: &str = self.table_name.as_ref();
        let mut filter_expr = String::from("contains(search_key, :needle)");
        if !digits.is_empty() {
            filter_expr.push_str(" OR contains(clean_isbn, :digits)");
        }

        let mut matches = vec![];
        let mut exclusive_start_key: Option<HashMap<String, AttributeValue>> = None;
        for _page in 0..MAX_SCAN_PAGES {
            let mut request = self.client
                .scan()
                .table_name(table_name)
                .consistent_read(false)
                .filter_expression(filter_expr.as_str())
                .expression_attribute_values(":needle", AttributeValue::S(needle.clone()))
                .set_exclusive_start_key(exclusive_start_key.take())
                .limit(page_limit(limit.saturating_mul(10)));
            if !digits.is_empty() {
                request = request.expression_attribute_values(":digits", AttributeValue::S(digits.clone()));
            }
            let out = request.send().await.map_err(LibraryError::from)?;
            if let Some(items) = out.items.as_ref() {
                matches.extend(items.iter().map(map_to_inventory));
            }
            if matches.len() >= limit {
                break;
            }
            match out.last_evaluated_key() {
                Some(key) => exclusive_start_key = Some(key.clone()),
                None => break,
            }
        }
        matches.truncate(limit);
        Ok(matches)
    }

    async fn find_by_isbn(&self, isbn: &str, limit: usize) -> LibraryResult<Vec<InventoryBookEntity>> {
        if isbn.is_empty() || limit == 0 {
            return Ok(vec![]);
        }
        let table_name: &str = self.table_name.as_ref();
        let index_name: &str = self.index_name.as_ref();
        self.client
            .query()
            .table_name(table_name)
            .index_name(index_name)
            .limit(page_limit(limit))
            .consistent_read(false)
            .key_condition_expression("clean_isbn = :clean_isbn")
            .expression_attribute_values(":clean_isbn", AttributeValue::S(isbn.to_string()))
            .send()
            .await.map_err(LibraryError::from).map(|req| {
            req.items.as_ref().unwrap_or(&vec![]).iter()
                .map(map_to_inventory).collect()
        })
    }
}

// DynamoDB page sizes are i32; caller limits come from configuration
fn page_limit(wanted: usize) -> i32 {
    wanted.clamp(1, MAX_PAGE_ITEMS) as i32
}

fn map_to_inventory(map: &HashMap<String, AttributeValue>) -> InventoryBookEntity {
    let title = parse_string_attribute("title", map).unwrap_or(String::from(""));
    let author = parse_string_attribute("author", map).unwrap_or(String::from(""));
    let category = parse_string_attribute("category", map).unwrap_or(String::from(""));
    InventoryBookEntity {
        book_id: parse_string_attribute("book_id", map).unwrap_or(String::from("")),
        version: parse_number_attribute("version", map),
        isbn: parse_string_attribute("isbn", map),
        clean_isbn: parse_string_attribute("clean_isbn", map),
        description: parse_string_attribute("description", map),
        language: parse_string_attribute("language", map),
        publisher: parse_string_attribute("publisher", map),
        published_date: parse_string_attribute("published_date", map),
        thumbnail_url: parse_string_attribute("thumbnail_url", map),
        total_copies: parse_number_attribute("total_copies", map),
        available_copies: parse_number_attribute("available_copies", map),
        search_key: parse_string_attribute("search_key", map)
            .unwrap_or_else(|| search_key(&title, &author, &category)),
        created_at: parse_date_attribute("created_at", map).unwrap_or(Utc::now().naive_utc()),
        updated_at: parse_date_attribute("updated_at", map).unwrap_or(Utc::now().naive_utc()),
        title,
        author,
        category,
    }
}
