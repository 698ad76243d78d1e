//! Last.fm chart export.
//!
//! A single unpaginated `chart.getTopTracks` call whose result is written to a
//! CSV with one row per chart position.

use std::{fs::File, io::Write, path::Path, time::Duration};

use reqwest::Client;

use crate::{
    config::LastFmConfig,
    management::export::ExportError,
    types::{ChartArtist, ChartTopTracksResponse, ChartTrack},
};

pub const CHART_HEADER: [&str; 6] = ["Rank", "Track Name", "Artist", "Playcount", "Listeners", "URL"];

const MISSING: &str = "N/A";

/// Fetches the global top tracks chart.
///
/// # Errors
///
/// Returns a message for transport failures, non-2xx responses, undecodable
/// bodies and API-level errors (`{"error": .., "message": ..}`).
pub async fn get_chart_top_tracks(
    config: &LastFmConfig,
    limit: u32,
) -> Result<Vec<ChartTrack>, String> {
    let client = Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| format!("Request failed: {}", e))?;

    let limit = limit.to_string();
    let response = client
        .get(&config.api_url)
        .query(&[
            ("method", "chart.getTopTracks"),
            ("api_key", config.api_key.as_str()),
            ("limit", limit.as_str()),
            ("format", "json"),
        ])
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| format!("Request failed: {}", e))?;

    let body: ChartTopTracksResponse = response
        .json()
        .await
        .map_err(|e| format!("Invalid JSON response: {}", e))?;

    if body.error.is_some() {
        return Err(body.message.unwrap_or_else(|| "Unknown error".to_string()));
    }

    match body.tracks {
        Some(tracks) => Ok(tracks.track),
        None => Err("No tracks found in response.".to_string()),
    }
}

fn text(value: &Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => MISSING.to_string(),
        Some(other) => other.to_string(),
    }
}

fn artist_name(artist: &Option<ChartArtist>) -> String {
    match artist {
        Some(ChartArtist::Object { name: Some(name) }) => name.clone(),
        Some(ChartArtist::Name(name)) => name.clone(),
        _ => MISSING.to_string(),
    }
}

pub fn write_chart<W: Write>(tracks: &[ChartTrack], writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CHART_HEADER)?;
    for (i, track) in tracks.iter().enumerate() {
        wtr.write_record([
            (i + 1).to_string(),
            track.name.clone().unwrap_or_else(|| MISSING.to_string()),
            artist_name(&track.artist),
            text(&track.playcount),
            text(&track.listeners),
            track.url.clone().unwrap_or_else(|| MISSING.to_string()),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_chart(tracks: &[ChartTrack], path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_chart(tracks, file)
}
