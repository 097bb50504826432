use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use crate::core::command::{Command, CommandError};
use crate::isbn;
use crate::lookup::domain::{LookupScope, LookupService};
use crate::sources::record::CatalogRecord;

pub(crate) struct LookupIsbnCommand {
    lookup_service: Box<dyn LookupService>,
}

impl LookupIsbnCommand {
    pub(crate) fn new(lookup_service: Box<dyn LookupService>) -> Self {
        Self {
            lookup_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LookupIsbnCommandRequest {
    pub(crate) isbn: String,
    pub(crate) sources: Option<String>,
    #[serde(skip, default)]
    pub(crate) cancel: CancellationToken,
}

impl LookupIsbnCommandRequest {
    pub fn new(isbn: &str, sources: Option<&str>, cancel: CancellationToken) -> Self {
        Self {
            isbn: isbn.to_string(),
            sources: sources.map(str::to_string),
            cancel,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LookupIsbnCommandResponse {
    pub isbn: String,
    pub records: Vec<CatalogRecord>,
}

impl LookupIsbnCommandResponse {
    pub fn new(isbn: String, records: Vec<CatalogRecord>) -> Self {
        Self {
            isbn,
            records,
        }
    }
}

// rejects anything that cannot be an ISBN before any source is asked
pub(crate) fn validate_isbn(raw: &str) -> Result<String, CommandError> {
    isbn::looks_like_isbn(raw).ok_or_else(|| CommandError::Validation {
        message: format!("{} is not a 10 or 13 character ISBN", raw.trim()),
        reason_code: None,
    })
}

#[async_trait]
impl Command<LookupIsbnCommandRequest, LookupIsbnCommandResponse> for LookupIsbnCommand {
    async fn execute(&self, req: LookupIsbnCommandRequest) -> Result<LookupIsbnCommandResponse, CommandError> {
        let isbn = validate_isbn(req.isbn.as_str())?;
        let scope = LookupScope::parse(req.sources.as_deref())?;
        self.lookup_service.lookup_isbn_federated(isbn.as_str(), &scope, &req.cancel)
            .await.map_err(CommandError::from).map(|records| LookupIsbnCommandResponse::new(isbn, records))
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;
    use crate::core::command::{Command, CommandError};
    use crate::core::repository::RepositoryStore;
    use crate::lookup::command::lookup_isbn_cmd::{LookupIsbnCommand, LookupIsbnCommandRequest, validate_isbn};
    use crate::lookup::factory;

    #[tokio::test]
    async fn test_should_validate_isbn_shape() {
        assert_eq!("9780140449136", validate_isbn(" 978-0-14-044913-6 ").expect("should accept").as_str());
        assert_eq!("080442957X", validate_isbn("080442957x").expect("should accept").as_str());
        assert!(matches!(validate_isbn("dune"), Err(CommandError::Validation { .. })));
        assert!(matches!(validate_isbn("12345"), Err(CommandError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_should_run_isbn_lookup_with_unreachable_sources() {
        let svc = factory::create_lookup_service(&factory::offline_config(), RepositoryStore::Memory)
            .await.expect("should build service");
        let cmd = LookupIsbnCommand::new(svc);
        let res = cmd.execute(LookupIsbnCommandRequest::new("0-14-044913-2", None, CancellationToken::new()))
            .await.expect("should look up");
        assert_eq!("0140449132", res.isbn.as_str());
        assert!(res.records.is_empty());
    }
}
