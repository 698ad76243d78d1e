mod common;

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use axum::{
    Json, Router,
    extract::{Query, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use common::{spawn, track_json};
use hitscout::{
    config::{Backoff, IngestSettings, Pacing, SpotifyConfig},
    spotify::{self, SpotifyClient, auth, features, search},
};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Hits {
    count: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<String>>>,
}

async fn throttled_once(State(hits): State<Hits>, RawQuery(query): RawQuery) -> Response {
    let n = hits.count.fetch_add(1, Ordering::SeqCst);
    hits.queries.lock().unwrap().push(query.unwrap_or_default());
    if n == 0 {
        (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, "2")],
            "slow down",
        )
            .into_response()
    } else {
        Json(json!({ "tracks": { "items": [track_json("t1", "One", &[("a1", "A")], false)] } }))
            .into_response()
    }
}

async fn always_throttled(State(hits): State<Hits>) -> Response {
    hits.count.fetch_add(1, Ordering::SeqCst);
    (StatusCode::TOO_MANY_REQUESTS, [(header::RETRY_AFTER, "0")]).into_response()
}

async fn broken(State(hits): State<Hits>) -> Response {
    hits.count.fetch_add(1, Ordering::SeqCst);
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}

fn client(base: &str, backoff: Backoff) -> SpotifyClient {
    SpotifyClient::new(&format!("{}/v1", base), "test-token", backoff)
}

#[tokio::test]
async fn test_throttled_request_is_retried_after_retry_after() {
    let hits = Hits::default();
    let app = Router::new()
        .route("/v1/search", get(throttled_once))
        .with_state(hits.clone());
    let base = spawn(app).await;
    let client = client(&base, Backoff::default());

    let start = Instant::now();
    let page = search::search_tracks(&client, "year:2024", 50, 0).await;

    assert!(start.elapsed() >= Duration::from_secs(2));
    assert_eq!(hits.count.load(Ordering::SeqCst), 2);
    let queries = hits.queries.lock().unwrap().clone();
    assert_eq!(queries[0], queries[1]);
    assert!(queries[0].contains("type=track"));

    let page = page.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].as_ref().unwrap().id, "t1");
}

#[tokio::test]
async fn test_retry_ceiling_gives_up() {
    let hits = Hits::default();
    let app = Router::new()
        .route("/v1/search", get(always_throttled))
        .with_state(hits.clone());
    let base = spawn(app).await;
    let client = client(
        &base,
        Backoff {
            default_retry_after: Duration::ZERO,
            max_retries: Some(2),
        },
    );

    let page = search::search_tracks(&client, "year:2024", 50, 0).await;

    assert!(page.is_none());
    // first attempt plus two retries
    assert_eq!(hits.count.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_server_error_is_empty_result() {
    let hits = Hits::default();
    let app = Router::new()
        .route("/v1/audio-features", get(broken))
        .with_state(hits.clone());
    let base = spawn(app).await;
    let client = client(&base, Backoff::default());

    let entries = features::get_audio_features(&client, &["t1".to_string()]).await;

    assert!(entries.is_empty());
    assert_eq!(hits.count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_malformed_payload_is_empty_result() {
    let app = Router::new().route(
        "/v1/search",
        get(|| async { ([(header::CONTENT_TYPE, "application/json")], "{not json") }),
    );
    let base = spawn(app).await;
    let client = client(&base, Backoff::default());

    assert!(search::search_tracks(&client, "q", 50, 0).await.is_none());
}

#[tokio::test]
async fn test_no_request_for_empty_batches() {
    // nothing listens here; any request would fail loudly
    let client = client("http://127.0.0.1:9", Backoff::default());
    assert!(features::get_audio_features(&client, &[]).await.is_empty());
    assert!(spotify::artists::get_artists(&client, &[]).await.is_empty());
}

// Full pipeline against a fake Spotify.

#[derive(Clone, Default)]
struct FakeSpotify {
    searches: Arc<Mutex<Vec<String>>>,
    feature_batches: Arc<Mutex<Vec<String>>>,
    artist_batches: Arc<Mutex<Vec<String>>>,
}

async fn token(headers: HeaderMap, body: String) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    // base64("id:secret")
    if auth != "Basic aWQ6c2VjcmV0" || body != "grant_type=client_credentials" {
        return (StatusCode::UNAUTHORIZED, "invalid_client").into_response();
    }
    Json(json!({ "access_token": "fake-token", "token_type": "Bearer", "expires_in": 3600 }))
        .into_response()
}

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some("Bearer fake-token")
}

async fn fake_search(
    State(fake): State<FakeSpotify>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let q = params.get("q").cloned().unwrap_or_default();
    fake.searches.lock().unwrap().push(q.clone());

    let items: Vec<Value> = match q.as_str() {
        "first" => vec![
            track_json("t1", "One", &[("a1", "Alpha"), ("a2", "Beta")], false),
            track_json("t2", "Two", &[("a2", "Beta")], true),
            track_json("t3", "Three", &[], false),
        ],
        "broken" => return (StatusCode::BAD_GATEWAY, "upstream").into_response(),
        "second" => vec![
            track_json("t2", "Two (duplicate)", &[("a9", "Other")], false),
            Value::Null,
            track_json("t4", "Four", &[("a1", "Alpha")], false),
            track_json("t5", "Five", &[("a5", "Epsilon")], false),
        ],
        _ => vec![track_json("t9", "Never", &[("a9", "Other")], false)],
    };
    Json(json!({ "tracks": { "items": items } })).into_response()
}

async fn fake_features(
    State(fake): State<FakeSpotify>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let ids = params.get("ids").cloned().unwrap_or_default();
    fake.feature_batches.lock().unwrap().push(ids.clone());

    let entries: Vec<Value> = ids
        .split(',')
        .map(|id| match id {
            "t1" => json!({
                "id": "t1", "danceability": 0.7, "energy": 0.6, "key": 5, "loudness": -6.5,
                "mode": 1, "speechiness": 0.05, "acousticness": 0.2, "instrumentalness": 0.0,
                "liveness": 0.1, "valence": 0.4, "tempo": 121.5, "time_signature": 3
            }),
            "t2" => json!({ "id": "t2", "danceability": 0.5, "energy": null }),
            _ => Value::Null,
        })
        .collect();
    Json(json!({ "audio_features": entries })).into_response()
}

async fn fake_artists(
    State(fake): State<FakeSpotify>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let ids = params.get("ids").cloned().unwrap_or_default();
    fake.artist_batches.lock().unwrap().push(ids.clone());

    let artists: Vec<Value> = ids
        .split(',')
        .map(|id| match id {
            "a1" => json!({ "id": "a1", "genres": ["indie pop", "chamber pop"] }),
            "a2" => json!({ "id": "a2", "genres": [] }),
            _ => Value::Null,
        })
        .collect();
    Json(json!({ "artists": artists })).into_response()
}

async fn fake_spotify() -> (String, FakeSpotify) {
    let fake = FakeSpotify::default();
    let app = Router::new()
        .route("/api/token", post(token))
        .route("/v1/search", get(fake_search))
        .route("/v1/audio-features", get(fake_features))
        .route("/v1/artists", get(fake_artists))
        .with_state(fake.clone());
    (spawn(app).await, fake)
}

fn spotify_config(base: &str, secret: &str) -> SpotifyConfig {
    SpotifyConfig {
        client_id: "id".to_string(),
        client_secret: secret.to_string(),
        api_url: format!("{}/v1", base),
        token_url: format!("{}/api/token", base),
    }
}

fn settings(output: std::path::PathBuf) -> IngestSettings {
    IngestSettings {
        queries: ["first", "broken", "second", "third"]
            .map(String::from)
            .to_vec(),
        track_quota: 4,
        feature_batch_size: 3,
        artist_batch_size: 50,
        pacing: Pacing::none(),
        output,
        ..IngestSettings::default()
    }
}

#[tokio::test]
async fn test_request_token() {
    let (base, _) = fake_spotify().await;

    let token = auth::request_token(&spotify_config(&base, "secret"))
        .await
        .unwrap();
    assert_eq!(token.access_token, "fake-token");
    assert_eq!(token.expires_in, 3600);

    let err = auth::request_token(&spotify_config(&base, "wrong"))
        .await
        .unwrap_err();
    assert!(err.contains("401"));
}

#[tokio::test]
async fn test_run_ingest_end_to_end() {
    let (base, fake) = fake_spotify().await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("spotify_tracks.csv");

    let written = spotify::run_ingest(&spotify_config(&base, "secret"), &settings(output.clone()))
        .await
        .unwrap();
    assert_eq!(written, 4);

    // quota reached during "second": "third" is never issued
    assert_eq!(
        *fake.searches.lock().unwrap(),
        ["first", "broken", "second"].map(String::from)
    );
    assert_eq!(
        *fake.feature_batches.lock().unwrap(),
        ["t1,t2,t3", "t4"].map(String::from)
    );
    assert_eq!(*fake.artist_batches.lock().unwrap(), ["a1,a2"].map(String::from));

    let mut rdr = csv::Reader::from_path(&output).unwrap();
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    let ids: Vec<&str> = rows.iter().map(|r| &r[1]).collect();
    assert_eq!(ids, ["t1", "t2", "t3", "t4"]);

    // t1: full features, first genre of a1
    assert_eq!(&rows[0][2], "Alpha;Beta");
    assert_eq!(&rows[0][7], "FALSE");
    assert_eq!(&rows[0][10], "5");
    assert_eq!(rows[0][18].parse::<f64>().unwrap(), 121.5);
    assert_eq!(&rows[0][19], "3");
    assert_eq!(&rows[0][20], "indie pop");

    // t2: first occurrence kept, partial features, artist without genres
    assert_eq!(&rows[1][4], "Two");
    assert_eq!(&rows[1][7], "TRUE");
    assert_eq!(rows[1][8].parse::<f64>().unwrap(), 0.5);
    assert_eq!(&rows[1][9], "0");
    assert_eq!(&rows[1][19], "4");
    assert_eq!(&rows[1][20], "various");

    // t3: null features, no artist
    assert_eq!(&rows[2][2], "");
    assert_eq!(&rows[2][19], "4");
    assert_eq!(&rows[2][20], "various");

    // t4: missing from the features response, shares a1
    assert_eq!(&rows[3][8], "0");
    assert_eq!(&rows[3][20], "indie pop");
}

#[tokio::test]
async fn test_run_ingest_aborts_without_token() {
    let (base, fake) = fake_spotify().await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("spotify_tracks.csv");

    let result = spotify::run_ingest(&spotify_config(&base, "wrong"), &settings(output.clone())).await;

    assert!(result.is_err());
    assert!(fake.searches.lock().unwrap().is_empty());
    assert!(!output.exists());
}

#[derive(Clone, Default)]
struct ArtistBatches {
    sizes: Arc<Mutex<Vec<usize>>>,
}

async fn many_artists(
    State(batches): State<ArtistBatches>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let ids: Vec<String> = params
        .get("ids")
        .map(|ids| ids.split(',').map(String::from).collect())
        .unwrap_or_default();
    batches.sizes.lock().unwrap().push(ids.len());

    let artists: Vec<Value> = ids
        .iter()
        .map(|id| json!({ "id": id, "genres": [format!("genre of {}", id)] }))
        .collect();
    Json(json!({ "artists": artists })).into_response()
}

#[tokio::test]
async fn test_genres_resolved_in_sub_batches() {
    let batches = ArtistBatches::default();
    let app = Router::new()
        .route("/v1/artists", get(many_artists))
        .with_state(batches.clone());
    let base = spawn(app).await;
    let client = client(&base, Backoff::default());
    let ids: Vec<String> = (0..120).map(|i| format!("artist{}", i)).collect();

    // oversized batch sizes are capped at 50
    let genres = spotify::artists::resolve_genres(&client, &ids, 80, Duration::ZERO).await;

    assert_eq!(*batches.sizes.lock().unwrap(), [50, 50, 20]);
    assert_eq!(genres.len(), 120);
    assert_eq!(genres["artist119"], "genre of artist119");
}
