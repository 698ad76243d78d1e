use std::collections::{HashMap, HashSet};

use crate::types::{SearchTrack, TrackRecord};

/// Deduplicated, quota-capped accumulator for search results.
///
/// Keeps tracks in first-seen order and records every primary artist id
/// (also in first-seen order) for the genre lookup. Records are never
/// replaced once admitted.
#[derive(Debug, Clone)]
pub struct TrackCollection {
    quota: usize,
    order: Vec<String>,
    tracks: HashMap<String, TrackRecord>,
    artist_ids: Vec<String>,
    seen_artists: HashSet<String>,
}

impl TrackCollection {
    pub fn new(quota: usize) -> Self {
        Self {
            quota,
            order: Vec::new(),
            tracks: HashMap::new(),
            artist_ids: Vec::new(),
            seen_artists: HashSet::new(),
        }
    }

    /// Adds `track` unless its id is already present or the quota is reached.
    ///
    /// Returns `true` when the track was admitted.
    pub fn admit(&mut self, track: SearchTrack) -> bool {
        if self.is_full() || self.tracks.contains_key(&track.id) {
            return false;
        }

        let record = TrackRecord::from(track);
        if let Some(artist_id) = &record.first_artist_id {
            if self.seen_artists.insert(artist_id.clone()) {
                self.artist_ids.push(artist_id.clone());
            }
        }

        self.order.push(record.track_id.clone());
        self.tracks.insert(record.track_id.clone(), record);
        true
    }

    /// Admits tracks of one result page in order, stopping at the quota.
    ///
    /// Returns how many new tracks were admitted.
    pub fn admit_page<I>(&mut self, tracks: I) -> usize
    where
        I: IntoIterator<Item = SearchTrack>,
    {
        let mut admitted = 0;
        for track in tracks {
            if self.is_full() {
                break;
            }
            if self.admit(track) {
                admitted += 1;
            }
        }
        admitted
    }

    pub fn is_full(&self) -> bool {
        self.order.len() >= self.quota
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Track ids in first-seen order.
    pub fn track_ids(&self) -> &[String] {
        &self.order
    }

    /// Distinct primary artist ids in first-seen order.
    pub fn artist_ids(&self) -> &[String] {
        &self.artist_ids
    }

    pub fn get(&self, track_id: &str) -> Option<&TrackRecord> {
        self.tracks.get(track_id)
    }

    /// Records in first-seen order.
    pub fn records(&self) -> impl Iterator<Item = &TrackRecord> {
        self.order.iter().filter_map(|id| self.tracks.get(id))
    }
}
