use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::header::{HeaderMap, RETRY_AFTER};

use crate::types::FALLBACK_GENRE;

/// Value of the `Authorization` header for the client-credentials grant.
pub fn basic_credentials(client_id: &str, client_secret: &str) -> String {
    let encoded = STANDARD.encode(format!("{}:{}", client_id, client_secret));
    format!("Basic {}", encoded)
}

/// Reads `Retry-After` as whole seconds, falling back to `default`.
pub fn retry_after(headers: &HeaderMap, default: Duration) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

pub fn first_genre(genres: &[String]) -> String {
    genres
        .first()
        .cloned()
        .unwrap_or_else(|| FALLBACK_GENRE.to_string())
}

pub fn join_ids<S: AsRef<str>>(ids: &[S]) -> String {
    ids.iter().map(|id| id.as_ref()).collect::<Vec<_>>().join(",")
}

pub fn bool_token(value: bool) -> &'static str {
    if value { "TRUE" } else { "FALSE" }
}

/// Lenient numeric coercion for uploaded tables.
///
/// Blank and unparsable cells become `0.0`, boolean spellings become `1.0` / `0.0`.
pub fn coerce_number(cell: &str) -> f64 {
    let cell = cell.trim();
    match cell {
        "" => 0.0,
        "TRUE" | "True" | "true" => 1.0,
        "FALSE" | "False" | "false" => 0.0,
        _ => cell
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0),
    }
}

pub fn hit_label(class: u8) -> &'static str {
    if class == 1 { "Hit" } else { "Not Hit" }
}

pub fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}
