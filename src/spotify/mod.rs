//! # Spotify Integration Module
//!
//! Client-credentials access to the Spotify Web API and the ingestion pipeline
//! that turns search results into one flat table row per track.
//!
//! ## Architecture
//!
//! ```text
//! Token Provider (auth)
//!          ↓
//! Track Search Aggregator (search)   ─┐
//!          ↓                          │
//! Audio Feature Fetcher (features)   ─┼─ SpotifyClient::send_json (429 backoff)
//!          ↓                          │
//! Artist Genre Resolver (artists)    ─┘
//!          ↓
//! Record Joiner & Exporter (management::export)
//! ```
//!
//! Everything runs sequentially on the calling task. The only suspension
//! points are the configured pacing sleeps and the throttling backoff.
//!
//! ## Error Handling
//!
//! - **Token exchange failure** is the only fatal path; [`run_ingest`] returns
//!   an error before any search is issued.
//! - **HTTP 429** is retried after the `Retry-After` delay (5s when absent).
//!   There is no retry ceiling unless [`Backoff::max_retries`] is set.
//! - **Any other failure** (non-2xx, transport error, malformed JSON) is
//!   printed and treated as "no data" so the run continues with what it has.
//!
//! ## API Coverage
//!
//! - `POST /api/token` - client-credentials grant
//! - `GET /search` - track search, one page per query
//! - `GET /audio-features` - batched audio features
//! - `GET /artists` - batched artist lookup (≤ 50 ids)

pub mod artists;
pub mod auth;
pub mod features;
pub mod search;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{
    Res,
    config::{Backoff, IngestSettings, SpotifyConfig},
    info,
    management::{TokenManager, export},
    utils, warning,
};

/// Authenticated handle on the Web API shared by every pipeline stage.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    access_token: String,
    backoff: Backoff,
}

impl SpotifyClient {
    pub fn new(api_url: &str, access_token: &str, backoff: Backoff) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            backoff,
        }
    }

    /// Authenticated `GET {api_url}/{path}` with the given query parameters.
    pub fn get(&self, path: &str, query: &[(&str, String)]) -> RequestBuilder {
        self.http
            .get(format!(
                "{uri}/{path}",
                uri = self.api_url,
                path = path.trim_start_matches('/')
            ))
            .bearer_auth(&self.access_token)
            .query(query)
    }

    /// Sends a request and decodes its JSON body, handling throttling.
    ///
    /// # Behaviour
    ///
    /// - **2xx**: the body is deserialized into `T`
    /// - **429**: waits for `Retry-After` seconds (or the configured default)
    ///   and re-issues the identical request; with `max_retries: None` this
    ///   repeats for as long as the server keeps throttling
    /// - **anything else**: status and body are printed, `None` is returned
    ///
    /// Transport failures and bodies that do not decode into `T` are also
    /// reported and mapped to `None`. Callers treat `None` as "no data".
    ///
    /// # Arguments
    ///
    /// * `request` - Fully built request; it is cloned for every attempt
    /// * `context` - Short label used in diagnostics, e.g. `"Search"`
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Option<T> {
        let mut retries: u32 = 0;

        loop {
            let Some(attempt) = request.try_clone() else {
                warning!("{} error: request cannot be repeated", context);
                return None;
            };

            let response = match attempt.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    warning!("{} error: {}", context, err);
                    return None;
                } // network or reqwest error
            };

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                if let Some(max) = self.backoff.max_retries {
                    if retries >= max {
                        warning!(
                            "{} still rate limited after {} retries, giving up.",
                            context,
                            retries
                        );
                        return None;
                    }
                }

                let wait = utils::retry_after(response.headers(), self.backoff.default_retry_after);
                warning!("Rate limited. Waiting {} seconds...", wait.as_secs());
                sleep(wait).await;
                retries += 1;
                continue; // retry
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                warning!("{} error: {}", context, status.as_u16());
                warning!("{}", body);
                return None;
            }

            return match response.json::<T>().await {
                Ok(body) => Some(body),
                Err(err) => {
                    warning!("{} error: malformed response: {}", context, err);
                    None
                }
            };
        }
    }
}

/// Pauses for `pause` unless it is zero.
pub(crate) async fn pace(pause: Duration) {
    if !pause.is_zero() {
        sleep(pause).await;
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

/// Runs the complete ingestion pipeline and writes the CSV export.
///
/// Steps, strictly in this order:
/// 1. exchange the client credentials for a bearer token
/// 2. search every configured query until the track quota is reached
/// 3. fetch audio features for the collected tracks in batches
/// 4. resolve one genre per primary artist in sub-batches
/// 5. join everything and write `settings.output`
///
/// # Returns
///
/// The number of data rows written.
///
/// # Errors
///
/// Fails when the settings are invalid, the token exchange fails or the
/// output file cannot be written. Fetch failures never abort the run.
pub async fn run_ingest(config: &SpotifyConfig, settings: &IngestSettings) -> Res<usize> {
    settings.validate()?;

    let token = auth::request_token(config)
        .await
        .map_err(|e| format!("Failed to get access token: {}", e))?;
    let token_mgr = TokenManager::new(token);
    let client = SpotifyClient::new(&config.api_url, token_mgr.access_token(), settings.backoff);

    let pb = spinner("Searching tracks...");
    let collection = search::collect_tracks(&client, settings).await;
    pb.finish_and_clear();
    info!(
        "Collected {} distinct tracks from {} artists",
        collection.len(),
        collection.artist_ids().len()
    );

    let pb = spinner("Fetching audio features...");
    let features = features::fetch_audio_features(
        &client,
        collection.track_ids(),
        settings.feature_batch_size,
        settings.pacing.batch_pause,
    )
    .await;
    pb.finish_and_clear();
    info!("Received audio features for {} tracks", features.len());

    let pb = spinner("Resolving artist genres...");
    let genres = artists::resolve_genres(
        &client,
        collection.artist_ids(),
        settings.artist_batch_size,
        settings.pacing.artist_pause,
    )
    .await;
    pb.finish_and_clear();
    info!("Resolved genres for {} artists", genres.len());

    token_mgr.warn_if_expired();

    let rows = export::join_rows(&collection, &features, &genres);
    export::export_to_path(&rows, &settings.output)?;

    Ok(rows.len())
}
