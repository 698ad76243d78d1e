//! Configuration management for hitscout.
//!
//! Values are read once at startup into plain configuration objects which are
//! then passed to every component explicitly. Nothing below the CLI layer
//! looks at the process environment.
//!
//! The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the working directory
//! 3. `.env` file in the local data directory
//! 4. Application defaults (where applicable)

use std::{env, fmt, path::PathBuf, time::Duration};

pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_LASTFM_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";
pub const DEFAULT_MODEL_DIR: &str = "Model";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8501";

/// Search facets issued in order until the track quota is reached.
pub const DEFAULT_SEARCH_QUERIES: [&str; 15] = [
    "year:2024",
    "year:2025",
    "year:2024 pop",
    "year:2024 rock",
    "year:2024 indie",
    "year:2025 pop",
    "year:2024 electronic",
    "year:2024 hip-hop",
    "year:2024 r&b",
    "year:2024 acoustic",
    "year:2024 latin",
    "year:2024 dance",
    "new release 2024",
    "top hits 2024",
    "viral 2024",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "{} has an invalid value: {}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Loads environment variables from `.env` files.
///
/// Looks for a `.env` in the working directory first and then in the
/// platform-specific local data directory under `hitscout/.env`:
/// - Linux: `~/.local/share/hitscout/.env`
/// - macOS: `~/Library/Application Support/hitscout/.env`
/// - Windows: `%LOCALAPPDATA%/hitscout/.env`
///
/// Variables already present in the environment are never overwritten. A
/// missing file is fine since credentials may come straight from the
/// environment.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("hitscout/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if let Err(e) = dotenv::dotenv() {
        if !e.not_found() {
            return Err(e.to_string());
        }
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn optional<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Client-credentials app registered with Spotify plus the endpoints to talk to.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Base URL of the Web API, e.g. `https://api.spotify.com/v1`.
    pub api_url: String,
    pub token_url: String,
}

impl SpotifyConfig {
    /// Reads `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET` and the optional
    /// `SPOTIFY_API_URL` / `SPOTIFY_API_TOKEN_URL` overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env_lookup)
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            client_id: required(&lookup, "SPOTIFY_CLIENT_ID")?,
            client_secret: required(&lookup, "SPOTIFY_CLIENT_SECRET")?,
            api_url: optional(&lookup, "SPOTIFY_API_URL", DEFAULT_SPOTIFY_API_URL)
                .trim_end_matches('/')
                .to_string(),
            token_url: optional(&lookup, "SPOTIFY_API_TOKEN_URL", DEFAULT_SPOTIFY_TOKEN_URL),
        })
    }
}

#[derive(Debug, Clone)]
pub struct LastFmConfig {
    pub api_key: String,
    /// Not needed by the read-only chart methods, but part of the app credentials.
    pub api_secret: String,
    pub api_url: String,
}

impl LastFmConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env_lookup)
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            api_key: required(&lookup, "LASTFM_API_KEY")?,
            api_secret: required(&lookup, "LASTFM_API_SECRET")?,
            api_url: optional(&lookup, "LASTFM_API_URL", DEFAULT_LASTFM_API_URL),
        })
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub model_dir: PathBuf,
    pub address: String,
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_vars(env_lookup)
    }

    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            model_dir: PathBuf::from(optional(&lookup, "MODEL_DIR", DEFAULT_MODEL_DIR)),
            address: optional(&lookup, "SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
        }
    }
}

/// Fixed sleeps used instead of real rate-limit negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Pause between two search queries.
    pub query_pause: Duration,
    /// Pause after every audio-features batch.
    pub batch_pause: Duration,
    /// Pause after every artists sub-batch.
    pub artist_pause: Duration,
}

impl Pacing {
    /// No pauses at all. Handy against local test servers.
    pub fn none() -> Self {
        Self {
            query_pause: Duration::ZERO,
            batch_pause: Duration::ZERO,
            artist_pause: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            query_pause: Duration::from_millis(500),
            batch_pause: Duration::from_millis(500),
            artist_pause: Duration::from_millis(300),
        }
    }
}

/// Behaviour on HTTP 429.
///
/// `max_retries: None` keeps re-issuing a throttled request for as long as the
/// server keeps answering 429. This is the default and means a persistently
/// throttled endpoint blocks the run forever; set a ceiling to turn that into
/// an empty result instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Wait used when the response carries no usable `Retry-After` header.
    pub default_retry_after: Duration,
    pub max_retries: Option<u32>,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            default_retry_after: Duration::from_secs(5),
            max_retries: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub queries: Vec<String>,
    /// Maximum number of distinct tracks collected across all queries.
    pub track_quota: usize,
    pub search_limit: u32,
    pub search_offset: u32,
    /// Ids per audio-features request. Independent from `track_quota`.
    pub feature_batch_size: usize,
    /// Ids per artists request; Spotify accepts at most 50.
    pub artist_batch_size: usize,
    pub pacing: Pacing,
    pub backoff: Backoff,
    pub output: PathBuf,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            queries: DEFAULT_SEARCH_QUERIES
                .iter()
                .map(|q| q.to_string())
                .collect(),
            track_quota: 100,
            search_limit: 50,
            search_offset: 0,
            feature_batch_size: 100,
            artist_batch_size: 50,
            pacing: Pacing::default(),
            backoff: Backoff::default(),
            output: PathBuf::from("spotify_tracks.csv"),
        }
    }
}

impl IngestSettings {
    /// Rejects settings that would make the batching loops meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feature_batch_size == 0 {
            return Err(ConfigError::Invalid {
                key: "feature_batch_size",
                value: "0".to_string(),
            });
        }
        if self.artist_batch_size == 0 || self.artist_batch_size > 50 {
            return Err(ConfigError::Invalid {
                key: "artist_batch_size",
                value: self.artist_batch_size.to_string(),
            });
        }
        if self.search_limit == 0 || self.search_limit > 50 {
            return Err(ConfigError::Invalid {
                key: "search_limit",
                value: self.search_limit.to_string(),
            });
        }
        Ok(())
    }
}
