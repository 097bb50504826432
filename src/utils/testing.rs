use std::net::TcpListener;
use axum::Router;

// Serves the router on an ephemeral local port and returns its base url.
pub(crate) async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("should bind test listener");
    let addr = listener.local_addr().expect("should have local addr");
    let server = axum::Server::from_tcp(listener).expect("should build test server")
        .serve(app.into_make_service());
    tokio::spawn(async move {
        let _ = server.await;
    });
    format!("http://{}", addr)
}

pub(crate) fn fixture(name: &str) -> serde_json::Value {
    let raw = match name {
        "google_search" => include_str!("../../tests/data/google_search.json"),
        "google_volume" => include_str!("../../tests/data/google_volume.json"),
        "openlibrary_search" => include_str!("../../tests/data/openlibrary_search.json"),
        "openlibrary_edition" => include_str!("../../tests/data/openlibrary_edition.json"),
        "openlibrary_author" => include_str!("../../tests/data/openlibrary_author.json"),
        other => panic!("unknown fixture {}", other),
    };
    serde_json::from_str(raw).expect("fixture should be valid json")
}
