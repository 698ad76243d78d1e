use std::path::PathBuf;

use crate::{config::LastFmConfig, error, lastfm, success, warning};

pub async fn lastfm(limit: u32, output: PathBuf) {
    let config = match LastFmConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("Missing Last.fm credentials: {}", e),
    };

    let tracks = match lastfm::get_chart_top_tracks(&config, limit).await {
        Ok(tracks) => tracks,
        Err(e) => {
            warning!("Error: {}", e);
            return;
        }
    };

    match lastfm::export_chart(&tracks, &output) {
        Ok(()) => success!("Saved {} tracks to {}", tracks.len(), output.display()),
        Err(e) => error!("{}", e),
    }
}
