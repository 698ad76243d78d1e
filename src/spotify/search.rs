use crate::{
    config::IngestSettings,
    management::TrackCollection,
    spotify::{SpotifyClient, pace},
    types::{SearchResponse, TrackPage},
    warning,
};

/// Fetches one page of track search results for `query`.
///
/// Returns `None` when the request failed or the payload had no `tracks`
/// object; the caller skips that query.
pub async fn search_tracks(
    client: &SpotifyClient,
    query: &str,
    limit: u32,
    offset: u32,
) -> Option<TrackPage> {
    let request = client.get(
        "search",
        &[
            ("q", query.to_string()),
            ("type", "track".to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ],
    );

    client
        .send_json::<SearchResponse>(request, "Search")
        .await
        .and_then(|res| res.tracks)
}

/// Issues the configured queries in order and accumulates distinct tracks.
///
/// The first occurrence of a track id wins; later duplicates are ignored.
/// Collection stops as soon as `settings.track_quota` tracks are held, both
/// inside the current page and before the next query. Queries are paced by
/// `settings.pacing.query_pause`.
///
/// A failed or empty query is skipped without aborting the loop.
pub async fn collect_tracks(client: &SpotifyClient, settings: &IngestSettings) -> TrackCollection {
    let mut collection = TrackCollection::new(settings.track_quota);

    for (i, query) in settings.queries.iter().enumerate() {
        if collection.is_full() {
            break;
        }
        if i > 0 {
            pace(settings.pacing.query_pause).await;
        }

        let Some(page) =
            search_tracks(client, query, settings.search_limit, settings.search_offset).await
        else {
            warning!("No results for query \"{}\", skipping.", query);
            continue;
        };

        collection.admit_page(page.items.into_iter().flatten());
    }

    collection
}
