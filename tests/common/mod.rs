#![allow(dead_code)]

use axum::Router;
use hitscout::types::SearchTrack;
use serde_json::json;

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A search result item as Spotify returns it.
pub fn track_json(id: &str, name: &str, artists: &[(&str, &str)], explicit: bool) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "artists": artists
            .iter()
            .map(|(id, name)| json!({ "id": id, "name": name }))
            .collect::<Vec<_>>(),
        "album": { "name": format!("{} album", name) },
        "popularity": 42,
        "duration_ms": 180000,
        "explicit": explicit
    })
}

pub fn search_track(id: &str, name: &str, artists: &[(&str, &str)]) -> SearchTrack {
    serde_json::from_value(track_json(id, name, artists, false)).unwrap()
}
