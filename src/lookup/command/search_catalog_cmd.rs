use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use crate::core::command::{Command, CommandError};
use crate::lookup::domain::{LookupScope, LookupService};
use crate::sources::record::CatalogRecord;

pub(crate) struct SearchCatalogCommand {
    lookup_service: Box<dyn LookupService>,
}

impl SearchCatalogCommand {
    pub(crate) fn new(lookup_service: Box<dyn LookupService>) -> Self {
        Self {
            lookup_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchCatalogCommandRequest {
    pub(crate) query: String,
    pub(crate) sources: Option<String>,
    #[serde(skip, default)]
    pub(crate) cancel: CancellationToken,
}

impl SearchCatalogCommandRequest {
    pub fn new(query: &str, sources: Option<&str>, cancel: CancellationToken) -> Self {
        Self {
            query: query.to_string(),
            sources: sources.map(str::to_string),
            cancel,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchCatalogCommandResponse {
    pub count: usize,
    pub records: Vec<CatalogRecord>,
}

impl SearchCatalogCommandResponse {
    pub fn new(records: Vec<CatalogRecord>) -> Self {
        Self {
            count: records.len(),
            records,
        }
    }
}

#[async_trait]
impl Command<SearchCatalogCommandRequest, SearchCatalogCommandResponse> for SearchCatalogCommand {
    async fn execute(&self, req: SearchCatalogCommandRequest) -> Result<SearchCatalogCommandResponse, CommandError> {
        if req.query.trim().is_empty() {
            return Err(CommandError::Validation { message: "query must not be blank".to_string(), reason_code: None });
        }
        let scope = LookupScope::parse(req.sources.as_deref())?;
        self.lookup_service.search_all(req.query.as_str(), &scope, &req.cancel)
            .await.map_err(CommandError::from).map(SearchCatalogCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;
    use crate::core::command::{Command, CommandError};
    use crate::core::repository::RepositoryStore;
    use crate::lookup::command::search_catalog_cmd::{SearchCatalogCommand, SearchCatalogCommandRequest};
    use crate::lookup::factory;

    async fn build_command() -> SearchCatalogCommand {
        let svc = factory::create_lookup_service(&factory::offline_config(), RepositoryStore::Memory)
            .await.expect("should build service");
        SearchCatalogCommand::new(svc)
    }

    #[tokio::test]
    async fn test_should_run_search_with_unreachable_sources() {
        let cmd = build_command().await;
        let res = cmd.execute(SearchCatalogCommandRequest::new("dune", None, CancellationToken::new()))
            .await.expect("should search");
        assert_eq!(0, res.count);
        assert!(res.records.is_empty());
    }

    #[tokio::test]
    async fn test_should_reject_blank_query() {
        let cmd = build_command().await;
        let err = cmd.execute(SearchCatalogCommandRequest::new("  ", None, CancellationToken::new()))
            .await.expect_err("should fail");
        assert!(matches!(err, CommandError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_should_reject_unknown_sources() {
        let cmd = build_command().await;
        let err = cmd.execute(SearchCatalogCommandRequest::new("dune", Some("local,amazon"), CancellationToken::new()))
            .await.expect_err("should fail");
        assert!(matches!(err, CommandError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_should_report_cancelled_search() {
        let cmd = build_command().await;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = cmd.execute(SearchCatalogCommandRequest::new("dune", Some("local"), cancel))
            .await.expect_err("should be cancelled");
        assert!(matches!(err, CommandError::Cancelled { .. }));
    }
}
