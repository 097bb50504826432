use axum::{
    body::HttpBody,
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use crate::core::command::{Command, CommandError};
use crate::core::controller::{AppState, ServerError};
use crate::lookup::command::get_record_cmd::{GetRecordCommand, GetRecordCommandRequest, GetRecordCommandResponse};
use crate::lookup::command::lookup_isbn_cmd::{LookupIsbnCommand, LookupIsbnCommandRequest, LookupIsbnCommandResponse};
use crate::lookup::command::lookup_isbn_sources_cmd::{LookupIsbnSourcesCommand, LookupIsbnSourcesCommandRequest, LookupIsbnSourcesCommandResponse};
use crate::lookup::command::search_catalog_cmd::{SearchCatalogCommand, SearchCatalogCommandRequest, SearchCatalogCommandResponse};
use crate::lookup::domain::LookupService;
use crate::lookup::factory;

#[derive(Debug, Deserialize)]
pub(crate) struct SearchParams {
    q: Option<String>,
    sources: Option<String>,
}

// `?sources=local,google` restricts a lookup to those sources
#[derive(Debug, Deserialize)]
pub(crate) struct ScopeParams {
    sources: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordParams {
    id: Option<String>,
}

/// Routes of the lookup service, generic over the request body so the same router runs
/// under `lambda_http` and under a plain hyper server.
pub fn app<B>(state: AppState) -> Router<(), B>
    where B: HttpBody + Send + 'static {
    Router::new()
        .route("/lookup", get(search_catalog))
        .route("/lookup/isbn/:isbn", get(lookup_isbn))
        .route("/lookup/isbn/:isbn/sources", get(lookup_isbn_sources))
        .route("/lookup/records", get(get_record))
        .with_state(state)
}

async fn build_service(state: AppState) -> Result<Box<dyn LookupService>, ServerError> {
    factory::create_lookup_service(&state.config, state.store).await
        .map_err(|err| ServerError::from(CommandError::from(err)))
}

// The token is cancelled when the handler future is dropped, e.g. on client disconnect.
pub(crate) async fn search_catalog(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>) -> Result<Json<SearchCatalogCommandResponse>, ServerError> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let req = SearchCatalogCommandRequest::new(params.q.unwrap_or_default().as_str(), params.sources.as_deref(), cancel);
    let svc = build_service(state).await?;
    let res = SearchCatalogCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn lookup_isbn(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
    Query(params): Query<ScopeParams>) -> Result<Json<LookupIsbnCommandResponse>, ServerError> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let req = LookupIsbnCommandRequest::new(isbn.as_str(), params.sources.as_deref(), cancel);
    let svc = build_service(state).await?;
    let res = LookupIsbnCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn lookup_isbn_sources(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
    Query(params): Query<ScopeParams>) -> Result<Json<LookupIsbnSourcesCommandResponse>, ServerError> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let req = LookupIsbnSourcesCommandRequest::new(isbn.as_str(), params.sources.as_deref(), cancel);
    let svc = build_service(state).await?;
    let res = LookupIsbnSourcesCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn get_record(
    State(state): State<AppState>,
    Query(params): Query<RecordParams>) -> Result<Json<GetRecordCommandResponse>, ServerError> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let req = GetRecordCommandRequest::new(params.id.unwrap_or_default().as_str(), cancel);
    let svc = build_service(state).await?;
    let res = GetRecordCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}
