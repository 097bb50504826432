use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::core::repository::RepositoryStore;
use crate::lookup::domain::LookupService;
use crate::lookup::domain::service::LookupServiceImpl;
use crate::sources::factory::create_catalog_clients;

pub(crate) async fn create_lookup_service(config: &Configuration, store: RepositoryStore) -> LibraryResult<Box<dyn LookupService>> {
    let clients = create_catalog_clients(config, store).await?;
    Ok(Box::new(LookupServiceImpl::new(config, clients)))
}

#[cfg(test)]
pub(crate) fn offline_config() -> Configuration {
    let mut config = Configuration::new("test");
    config.google_books_url = "http://127.0.0.1:1".to_string();
    config.open_library_url = "http://127.0.0.1:1".to_string();
    config.source_timeout_ms = 1_000;
    config
}
