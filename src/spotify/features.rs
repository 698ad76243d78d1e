use std::{collections::HashMap, time::Duration};

use crate::{
    spotify::{SpotifyClient, pace},
    types::{AudioFeatureEntry, AudioFeatureSet, AudioFeaturesResponse},
    utils,
};

/// Requests audio features for one batch of track ids.
///
/// Null entries (no features available for that track) are dropped. A failed
/// request yields an empty list.
pub async fn get_audio_features(client: &SpotifyClient, track_ids: &[String]) -> Vec<AudioFeatureEntry> {
    if track_ids.is_empty() {
        return Vec::new();
    }

    let request = client.get("audio-features", &[("ids", utils::join_ids(track_ids))]);

    client
        .send_json::<AudioFeaturesResponse>(request, "Audio features")
        .await
        .map(|res| res.audio_features.into_iter().flatten().collect())
        .unwrap_or_default()
}

/// Fetches audio features for all `track_ids` in batches of `batch_size`.
///
/// Returns a lookup keyed by track id. Tracks missing from the lookup are
/// filled with [`AudioFeatureSet::default`] at join time.
pub async fn fetch_audio_features(
    client: &SpotifyClient,
    track_ids: &[String],
    batch_size: usize,
    pause: Duration,
) -> HashMap<String, AudioFeatureSet> {
    let mut lookup = HashMap::new();

    for batch in track_ids.chunks(batch_size.max(1)) {
        for entry in get_audio_features(client, batch).await {
            lookup.insert(entry.id.clone(), AudioFeatureSet::from(&entry));
        }
        pace(pause).await;
    }

    lookup
}
