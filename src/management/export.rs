use std::{collections::HashMap, fmt, fs::File, io::Write, path::Path};

use crate::{
    management::TrackCollection,
    success,
    types::{AudioFeatureSet, FALLBACK_GENRE, UnifiedTrackRow},
    utils,
};

/// Column layout of the exported table; the first column is the row ordinal.
pub const EXPORT_HEADER: [&str; 21] = [
    "",
    "track_id",
    "artists",
    "album_name",
    "track_name",
    "popularity",
    "duration_ms",
    "explicit",
    "danceability",
    "energy",
    "key",
    "loudness",
    "mode",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
    "time_signature",
    "track_genre",
];

#[derive(Debug)]
pub enum ExportError {
    IoError(std::io::Error),
    CsvError(csv::Error),
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::IoError(err)
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::CsvError(err)
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::IoError(e) => write!(f, "cannot write export: {}", e),
            ExportError::CsvError(e) => write!(f, "cannot encode export: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

/// Joins every collected track with its features and genre.
///
/// Rows come out in first-seen order. Missing features fall back to
/// [`AudioFeatureSet::default`]; a missing or unresolved primary artist falls
/// back to `"various"`.
pub fn join_rows(
    collection: &TrackCollection,
    features: &HashMap<String, AudioFeatureSet>,
    genres: &HashMap<String, String>,
) -> Vec<UnifiedTrackRow> {
    collection
        .records()
        .map(|track| {
            let features = features.get(&track.track_id).copied().unwrap_or_default();
            let genre = track
                .first_artist_id
                .as_ref()
                .and_then(|id| genres.get(id))
                .cloned()
                .unwrap_or_else(|| FALLBACK_GENRE.to_string());

            UnifiedTrackRow {
                track: track.clone(),
                features,
                genre,
            }
        })
        .collect()
}

fn to_record(index: usize, row: &UnifiedTrackRow) -> Vec<String> {
    let t = &row.track;
    let f = &row.features;
    vec![
        index.to_string(),
        t.track_id.clone(),
        t.artists.clone(),
        t.album_name.clone(),
        t.track_name.clone(),
        t.popularity.to_string(),
        t.duration_ms.to_string(),
        utils::bool_token(t.explicit).to_string(),
        f.danceability.to_string(),
        f.energy.to_string(),
        f.key.to_string(),
        f.loudness.to_string(),
        f.mode.to_string(),
        f.speechiness.to_string(),
        f.acousticness.to_string(),
        f.instrumentalness.to_string(),
        f.liveness.to_string(),
        f.valence.to_string(),
        f.tempo.to_string(),
        f.time_signature.to_string(),
        row.genre.clone(),
    ]
}

/// Writes the header and one record per row, ordinals starting at 0.
pub fn write_rows<W: Write>(rows: &[UnifiedTrackRow], writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPORT_HEADER)?;
    for (index, row) in rows.iter().enumerate() {
        wtr.write_record(to_record(index, row))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_to_path(rows: &[UnifiedTrackRow], path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    write_rows(rows, file)?;
    success!("Saved {} tracks to {}", rows.len(), path.display());
    Ok(())
}
