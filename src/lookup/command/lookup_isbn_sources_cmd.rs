use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use crate::core::command::{Command, CommandError};
use crate::lookup::command::lookup_isbn_cmd::validate_isbn;
use crate::lookup::domain::{FederatedLookup, LookupScope, LookupService};

pub(crate) struct LookupIsbnSourcesCommand {
    lookup_service: Box<dyn LookupService>,
}

impl LookupIsbnSourcesCommand {
    pub(crate) fn new(lookup_service: Box<dyn LookupService>) -> Self {
        Self {
            lookup_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LookupIsbnSourcesCommandRequest {
    pub(crate) isbn: String,
    pub(crate) sources: Option<String>,
    #[serde(skip, default)]
    pub(crate) cancel: CancellationToken,
}

impl LookupIsbnSourcesCommandRequest {
    pub fn new(isbn: &str, sources: Option<&str>, cancel: CancellationToken) -> Self {
        Self {
            isbn: isbn.to_string(),
            sources: sources.map(str::to_string),
            cancel,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LookupIsbnSourcesCommandResponse {
    pub isbn: String,
    pub sources: FederatedLookup,
}

impl LookupIsbnSourcesCommandResponse {
    pub fn new(isbn: String, sources: FederatedLookup) -> Self {
        Self {
            isbn,
            sources,
        }
    }
}

#[async_trait]
impl Command<LookupIsbnSourcesCommandRequest, LookupIsbnSourcesCommandResponse> for LookupIsbnSourcesCommand {
    async fn execute(&self, req: LookupIsbnSourcesCommandRequest) -> Result<LookupIsbnSourcesCommandResponse, CommandError> {
        let isbn = validate_isbn(req.isbn.as_str())?;
        let scope = LookupScope::parse(req.sources.as_deref())?;
        self.lookup_service.lookup_isbn_by_source(isbn.as_str(), &scope, &req.cancel)
            .await.map_err(CommandError::from).map(|sources| LookupIsbnSourcesCommandResponse::new(isbn, sources))
    }
}
