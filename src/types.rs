use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Genre used when an artist has no genres or could not be resolved.
pub const FALLBACK_GENRE: &str = "various";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

// Spotify responses. Every nested field is optional or defaulted so a
// partially filled payload still deserializes.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<TrackPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackPage {
    #[serde(default)]
    pub items: Vec<Option<SearchTrack>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTrack {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    #[serde(default)]
    pub album: Option<AlbumRef>,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub explicit: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimpleArtist {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlbumRef {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioFeaturesResponse {
    #[serde(default)]
    pub audio_features: Vec<Option<AudioFeatureEntry>>,
}

/// One entry of `/audio-features`; any field may be missing.
///
/// Integral fields are read as floats so `5` and `5.0` both parse.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioFeatureEntry {
    pub id: String,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub key: Option<f64>,
    pub loudness: Option<f64>,
    pub mode: Option<f64>,
    pub speechiness: Option<f64>,
    pub acousticness: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub liveness: Option<f64>,
    pub valence: Option<f64>,
    pub tempo: Option<f64>,
    pub time_signature: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtistsResponse {
    #[serde(default)]
    pub artists: Vec<Option<ArtistEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistEntry {
    pub id: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Track metadata captured the first time a track id shows up in search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub track_id: String,
    /// Artist names joined with `;`.
    pub artists: String,
    pub album_name: String,
    pub track_name: String,
    pub popularity: u32,
    pub duration_ms: u64,
    pub explicit: bool,
    pub first_artist_id: Option<String>,
}

impl From<SearchTrack> for TrackRecord {
    fn from(track: SearchTrack) -> Self {
        let first_artist_id = track.artists.first().and_then(|a| a.id.clone());
        let artists = track
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(";");

        TrackRecord {
            track_id: track.id,
            artists,
            album_name: track.album.map(|a| a.name).unwrap_or_default(),
            track_name: track.name,
            popularity: track.popularity,
            duration_ms: track.duration_ms,
            explicit: track.explicit,
            first_artist_id,
        }
    }
}

/// Audio features of one track with every gap filled.
///
/// Missing values are 0, except the time signature which is 4.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatureSet {
    pub danceability: f64,
    pub energy: f64,
    pub key: i64,
    pub loudness: f64,
    pub mode: i64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub time_signature: i64,
}

impl Default for AudioFeatureSet {
    fn default() -> Self {
        Self {
            danceability: 0.0,
            energy: 0.0,
            key: 0,
            loudness: 0.0,
            mode: 0,
            speechiness: 0.0,
            acousticness: 0.0,
            instrumentalness: 0.0,
            liveness: 0.0,
            valence: 0.0,
            tempo: 0.0,
            time_signature: 4,
        }
    }
}

impl From<&AudioFeatureEntry> for AudioFeatureSet {
    fn from(entry: &AudioFeatureEntry) -> Self {
        let d = AudioFeatureSet::default();
        AudioFeatureSet {
            danceability: entry.danceability.unwrap_or(d.danceability),
            energy: entry.energy.unwrap_or(d.energy),
            key: entry.key.map(|v| v as i64).unwrap_or(d.key),
            loudness: entry.loudness.unwrap_or(d.loudness),
            mode: entry.mode.map(|v| v as i64).unwrap_or(d.mode),
            speechiness: entry.speechiness.unwrap_or(d.speechiness),
            acousticness: entry.acousticness.unwrap_or(d.acousticness),
            instrumentalness: entry.instrumentalness.unwrap_or(d.instrumentalness),
            liveness: entry.liveness.unwrap_or(d.liveness),
            valence: entry.valence.unwrap_or(d.valence),
            tempo: entry.tempo.unwrap_or(d.tempo),
            time_signature: entry
                .time_signature
                .map(|v| v as i64)
                .unwrap_or(d.time_signature),
        }
    }
}

/// Final exported unit: one track joined with its features and genre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedTrackRow {
    pub track: TrackRecord,
    pub features: AudioFeatureSet,
    pub genre: String,
}

// Last.fm

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartTopTracksResponse {
    #[serde(default)]
    pub tracks: Option<ChartTracks>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartTracks {
    #[serde(default)]
    pub track: Vec<ChartTrack>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartTrack {
    pub name: Option<String>,
    pub artist: Option<ChartArtist>,
    pub playcount: Option<serde_json::Value>,
    pub listeners: Option<serde_json::Value>,
    pub url: Option<String>,
}

/// Last.fm returns the artist either as an object or as a bare name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChartArtist {
    Object { name: Option<String> },
    Name(String),
}

#[derive(Tabled)]
pub struct PredictionTableRow {
    pub track_name: String,
    pub artists: String,
    pub is_hit: String,
    pub result: String,
    pub probability: String,
}

#[derive(Tabled)]
pub struct ImportanceTableRow {
    pub feature: String,
    pub importance: String,
}
