use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::core::repository::RepositoryStore;
use crate::inventory::factory::create_inventory_repository;
use crate::sources::CatalogClient;
use crate::sources::google_books::GoogleBooksClient;
use crate::sources::local::LocalCatalogClient;
use crate::sources::open_library::OpenLibraryClient;
use crate::utils::http::build_http_client;

// Builds the configured sources in merge order: local first, then the external catalogs.
pub(crate) async fn create_catalog_clients(config: &Configuration, store: RepositoryStore) -> LibraryResult<Vec<Box<dyn CatalogClient>>> {
    let http = build_http_client(config)?;
    let inventory = create_inventory_repository(config, store).await;
    let clients: Vec<Box<dyn CatalogClient>> = vec![
        Box::new(LocalCatalogClient::new(inventory)),
        Box::new(GoogleBooksClient::new(http.clone(), config.google_books_url.as_str())),
        Box::new(OpenLibraryClient::new(http, config.open_library_url.as_str(), config.open_library_covers_url.as_str())),
    ];
    Ok(clients)
}
