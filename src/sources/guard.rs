use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use crate::core::library::{CatalogSource, LibraryResult};
use crate::sources::CatalogClient;
use crate::sources::record::CatalogRecord;

/// Wraps a [`CatalogClient`] so that a failing or slow source yields no data instead of an
/// error. Every call is bounded by the same timeout; errors and timeouts are logged and
/// dropped. Cancellation is left to the caller: dropping the returned future aborts the
/// in-flight request.
pub(crate) struct GuardedSource {
    client: Box<dyn CatalogClient>,
    timeout: Duration,
}

impl GuardedSource {
    pub(crate) fn new(client: Box<dyn CatalogClient>, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
        }
    }

    pub(crate) fn source(&self) -> CatalogSource {
        self.client.source()
    }

    pub(crate) async fn search(&self, query: &str, max_results: usize) -> Vec<CatalogRecord> {
        self.guarded("search", self.client.search(query, max_results)).await
            .unwrap_or_default()
    }

    pub(crate) async fn lookup_matches(&self, isbn: &str, limit: usize) -> Vec<CatalogRecord> {
        self.guarded("lookup_matches", self.client.lookup_matches(isbn, limit)).await
            .unwrap_or_default()
    }

    pub(crate) async fn get_by_id(&self, key: &str) -> Option<CatalogRecord> {
        self.guarded("get_by_id", self.client.get_by_id(key)).await
            .flatten()
    }

    async fn guarded<T, F>(&self, operation: &str, call: F) -> Option<T>
        where F: Future<Output=LibraryResult<T>> {
        let source = self.source();
        let started = Instant::now();
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(val)) => {
                debug!(source = %source, operation, elapsed_ms = started.elapsed().as_millis() as u64,
                    "source call completed");
                Some(val)
            }
            Ok(Err(err)) => {
                warn!(source = %source, operation, error = %err, retryable = err.retryable(),
                    "source call failed, continuing without it");
                None
            }
            Err(_) => {
                warn!(source = %source, operation, timeout_ms = self.timeout.as_millis() as u64,
                    "source call timed out, continuing without it");
                None
            }
        }
    }
}
