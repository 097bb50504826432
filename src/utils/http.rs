use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult};

// helper method to build the http client shared by the external source clients
pub(crate) fn build_http_client(config: &Configuration) -> LibraryResult<Client> {
    Client::builder()
        .timeout(config.source_timeout())
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(LibraryError::from)
}

// GETs a JSON document; a 404 is an absent document, any other non-success status an error.
pub(crate) async fn get_json(client: &Client, url: &str) -> LibraryResult<Option<Value>> {
    debug!(url, "GET");
    let res = client.get(url).send().await?;
    let status = res.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(LibraryError::transport(
            format!("unexpected status from {}", url).as_str(),
            Some(status.as_u16().to_string()),
            status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS));
    }
    res.json::<Value>().await.map(Some).map_err(LibraryError::from)
}

impl From<reqwest::Error> for LibraryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return LibraryError::serialization(format!("invalid response body {:?}", err).as_str());
        }
        let reason = if err.is_timeout() {
            Some("TimeoutError".to_string())
        } else if err.is_connect() {
            Some("ConnectError".to_string())
        } else {
            err.status().map(|s| s.as_u16().to_string())
        };
        let retryable = err.is_timeout() || err.is_connect();
        LibraryError::transport(format!("http request failed {:?}", err).as_str(), reason, retryable)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::Router;
    use axum::routing::get;
    use serde_json::json;
    use crate::core::domain::Configuration;
    use crate::core::library::LibraryError;
    use crate::utils::http::{build_http_client, get_json};
    use crate::utils::testing::serve;

    #[tokio::test]
    async fn test_should_get_json() {
        let base = serve(Router::new()
            .route("/ok", get(|| async { axum::Json(json!({"hello": "world"})) }))
            .route("/boom", get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }))).await;
        let client = build_http_client(&Configuration::new("test")).expect("should build client");

        let doc = get_json(&client, format!("{}/ok", base).as_str()).await.expect("should fetch");
        assert_eq!(Some(json!({"hello": "world"})), doc);

        let missing = get_json(&client, format!("{}/missing", base).as_str()).await.expect("should map 404");
        assert_eq!(None, missing);

        let err = get_json(&client, format!("{}/boom", base).as_str()).await.expect_err("should fail");
        assert!(matches!(err, LibraryError::Transport { retryable: true, .. }));
    }

    #[tokio::test]
    async fn test_should_map_connection_refused() {
        let client = build_http_client(&Configuration::new("test")).expect("should build client");
        let err = get_json(&client, "http://127.0.0.1:1/none").await.expect_err("should fail");
        assert!(matches!(err, LibraryError::Transport { .. }));
    }
}
