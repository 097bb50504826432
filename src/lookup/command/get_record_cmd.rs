use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use crate::core::command::{Command, CommandError};
use crate::lookup::domain::LookupService;
use crate::sources::record::CatalogRecord;

pub(crate) struct GetRecordCommand {
    lookup_service: Box<dyn LookupService>,
}

impl GetRecordCommand {
    pub(crate) fn new(lookup_service: Box<dyn LookupService>) -> Self {
        Self {
            lookup_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetRecordCommandRequest {
    pub(crate) id: String,
    #[serde(skip, default)]
    pub(crate) cancel: CancellationToken,
}

impl GetRecordCommandRequest {
    pub fn new(id: &str, cancel: CancellationToken) -> Self {
        Self {
            id: id.to_string(),
            cancel,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GetRecordCommandResponse {
    pub record: CatalogRecord,
}

impl GetRecordCommandResponse {
    pub fn new(record: CatalogRecord) -> Self {
        Self {
            record,
        }
    }
}

#[async_trait]
impl Command<GetRecordCommandRequest, GetRecordCommandResponse> for GetRecordCommand {
    async fn execute(&self, req: GetRecordCommandRequest) -> Result<GetRecordCommandResponse, CommandError> {
        match self.lookup_service.get_by_composite_id(req.id.as_str(), &req.cancel).await? {
            Some(record) => Ok(GetRecordCommandResponse::new(record)),
            None => Err(CommandError::NotFound { message: format!("no catalog record for {}", req.id) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;
    use crate::core::command::{Command, CommandError};
    use crate::core::repository::RepositoryStore;
    use crate::lookup::command::get_record_cmd::{GetRecordCommand, GetRecordCommandRequest};
    use crate::lookup::factory;

    #[tokio::test]
    async fn test_should_report_missing_records() {
        let svc = factory::create_lookup_service(&factory::offline_config(), RepositoryStore::Memory)
            .await.expect("should build service");
        let cmd = GetRecordCommand::new(svc);
        for id in ["local:missing", "google:unreachable", "ext-c:abc"] {
            let err = cmd.execute(GetRecordCommandRequest::new(id, CancellationToken::new()))
                .await.expect_err("should not find");
            assert!(matches!(err, CommandError::NotFound { .. }));
        }
    }
}
