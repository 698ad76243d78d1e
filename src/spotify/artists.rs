use std::{collections::HashMap, time::Duration};

use crate::{
    spotify::{SpotifyClient, pace},
    types::{ArtistEntry, ArtistsResponse},
    utils,
};

/// Looks up one sub-batch of artists (at most 50 ids).
///
/// Unknown or deleted ids come back as `null` and are dropped.
pub async fn get_artists(client: &SpotifyClient, artist_ids: &[String]) -> Vec<ArtistEntry> {
    if artist_ids.is_empty() {
        return Vec::new();
    }

    let request = client.get("artists", &[("ids", utils::join_ids(artist_ids))]);

    client
        .send_json::<ArtistsResponse>(request, "Artists")
        .await
        .map(|res| res.artists.into_iter().flatten().collect())
        .unwrap_or_default()
}

/// Resolves one representative genre per artist.
///
/// The genre is the first entry of the artist's genre list, or `"various"`
/// when the list is empty. Artists absent from every response are absent
/// from the map and fall back to `"various"` at join time.
pub async fn resolve_genres(
    client: &SpotifyClient,
    artist_ids: &[String],
    batch_size: usize,
    pause: Duration,
) -> HashMap<String, String> {
    let mut genres = HashMap::new();

    for batch in artist_ids.chunks(batch_size.clamp(1, 50)) {
        for artist in get_artists(client, batch).await {
            genres.insert(artist.id, utils::first_genre(&artist.genres));
        }
        pace(pause).await;
    }

    genres
}
