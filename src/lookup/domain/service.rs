use std::collections::HashMap;
use std::future::Future;
use std::time::Instant;
use async_trait::async_trait;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use crate::core::domain::Configuration;
use crate::core::library::{CatalogSource, LibraryError, LibraryResult};
use crate::isbn;
use crate::lookup::domain::{FederatedLookup, LookupScope, LookupService};
use crate::sources::CatalogClient;
use crate::sources::guard::GuardedSource;
use crate::sources::record::{CatalogRecord, CompositeId};

pub(crate) struct LookupServiceImpl {
    sources: Vec<GuardedSource>,
    external_page_size: usize,
    local_search_limit: usize,
    local_isbn_limit: usize,
}

impl LookupServiceImpl {
    // `clients` order is the merge tie-break for records of equal rank
    pub(crate) fn new(config: &Configuration, clients: Vec<Box<dyn CatalogClient>>) -> Self {
        Self {
            sources: clients.into_iter()
                .map(|client| GuardedSource::new(client, config.source_timeout()))
                .collect(),
            external_page_size: config.external_page_size,
            local_search_limit: config.local_search_limit,
            local_isbn_limit: config.local_isbn_limit,
        }
    }

    fn page_size(&self, source: CatalogSource) -> usize {
        match source {
            CatalogSource::Local => self.local_search_limit,
            _ => self.external_page_size,
        }
    }

    fn isbn_limit(&self, source: CatalogSource) -> usize {
        match source {
            CatalogSource::Local => self.local_isbn_limit,
            _ => 1,
        }
    }

    fn in_scope<'a>(&'a self, scope: &'a LookupScope) -> impl Iterator<Item=&'a GuardedSource> + 'a {
        self.sources.iter().filter(move |source| scope.includes(source.source()))
    }

    async fn isbn_fan_out(&self, isbn: &str, scope: &LookupScope, cancel: &CancellationToken) -> LibraryResult<Vec<(CatalogSource, Vec<CatalogRecord>)>> {
        let isbn = isbn.trim();
        if isbn::compact(isbn).is_empty() {
            return Ok(vec![]);
        }
        let lookups = self.in_scope(scope).map(|source| async move {
            let found = source.lookup_matches(isbn, self.isbn_limit(source.source())).await;
            (source.source(), found)
        });
        until_cancelled(cancel, "lookup_isbn", join_all(lookups)).await
    }
}

#[async_trait]
impl LookupService for LookupServiceImpl {
    async fn search_all(&self, query: &str, scope: &LookupScope, cancel: &CancellationToken) -> LibraryResult<Vec<CatalogRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(vec![]);
        }
        if let Some(isbn) = isbn::looks_like_isbn(query) {
            return self.lookup_isbn_federated(isbn.as_str(), scope, cancel).await;
        }
        let started = Instant::now();
        let searches = self.in_scope(scope)
            .map(|source| source.search(query, self.page_size(source.source())));
        let batches = until_cancelled(cancel, "search_all", join_all(searches)).await?;
        let fetched: usize = batches.iter().map(Vec::len).sum();
        let merged = merge_records(batches.into_iter().flatten());
        info!(query, fetched, count = merged.len(), elapsed_ms = started.elapsed().as_millis() as u64,
            "federated search");
        Ok(merged)
    }

    async fn lookup_isbn_federated(&self, isbn: &str, scope: &LookupScope, cancel: &CancellationToken) -> LibraryResult<Vec<CatalogRecord>> {
        let started = Instant::now();
        let slots = self.isbn_fan_out(isbn, scope, cancel).await?;
        let merged = merge_records(slots.into_iter().flat_map(|(_, records)| records));
        info!(isbn, count = merged.len(), elapsed_ms = started.elapsed().as_millis() as u64,
            "federated isbn lookup");
        Ok(merged)
    }

    async fn lookup_isbn_by_source(&self, isbn: &str, scope: &LookupScope, cancel: &CancellationToken) -> LibraryResult<FederatedLookup> {
        let mut lookup = FederatedLookup::default();
        for (source, records) in self.isbn_fan_out(isbn, scope, cancel).await? {
            let slot = match source {
                CatalogSource::Local => &mut lookup.local,
                CatalogSource::GoogleBooks => &mut lookup.google_books,
                CatalogSource::OpenLibrary => &mut lookup.open_library,
            };
            if slot.is_none() {
                *slot = records.into_iter().next();
            }
        }
        Ok(lookup)
    }

    async fn get_by_composite_id(&self, id: &str, cancel: &CancellationToken) -> LibraryResult<Option<CatalogRecord>> {
        let parsed = match CompositeId::parse(id) {
            Some(parsed) => parsed,
            None => {
                warn!(id, "composite id has no recognised source prefix");
                return Ok(None);
            }
        };
        let source = match self.sources.iter().find(|s| s.source() == parsed.source) {
            Some(source) => source,
            None => {
                warn!(id, source = %parsed.source, "source is not configured");
                return Ok(None);
            }
        };
        until_cancelled(cancel, "get_by_composite_id", source.get_by_id(parsed.key.as_str())).await
    }
}

async fn until_cancelled<T, F>(cancel: &CancellationToken, operation: &str, work: F) -> LibraryResult<T>
    where F: Future<Output=T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            info!(operation, "lookup cancelled by caller");
            Err(LibraryError::cancelled(format!("{} cancelled", operation).as_str()))
        }
        res = work => Ok(res),
    }
}

/// Collapses records describing the same book. Records group on ISBN-13, then ISBN-10, then
/// canonical title and author. A group keeps its Local record when it has one and otherwise
/// the first record seen; groups stay in order of first appearance.
pub(crate) fn merge_records<I>(records: I) -> Vec<CatalogRecord>
    where I: IntoIterator<Item=CatalogRecord> {
    let mut merged: Vec<CatalogRecord> = vec![];
    let mut positions: HashMap<String, usize> = HashMap::new();
    for record in records {
        let key = dedup_key(&record);
        match positions.get(&key) {
            Some(&pos) => {
                if record.source == CatalogSource::Local && merged[pos].source != CatalogSource::Local {
                    merged[pos] = record;
                }
            }
            None => {
                positions.insert(key, merged.len());
                merged.push(record);
            }
        }
    }
    merged
}

fn dedup_key(record: &CatalogRecord) -> String {
    match (&record.isbn13, &record.isbn10) {
        (Some(isbn13), _) => isbn13.to_lowercase(),
        (None, Some(isbn10)) => isbn10.to_lowercase(),
        (None, None) => format!("{}|{}", canon(record.title.as_str()), canon(record.author.as_str())),
    }
}

fn canon(text: &str) -> String {
    let folded: String = text.to_lowercase().chars()
        .map(|ch| if ch == 'ı' { 'i' } else { ch })
        .filter(|ch| ch.is_alphanumeric() || ch.is_whitespace())
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
