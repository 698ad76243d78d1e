use crate::{
    config::{IngestSettings, SpotifyConfig},
    error, spotify, success,
};

pub async fn fetch(settings: IngestSettings) {
    let config = match SpotifyConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("Missing Spotify credentials: {}", e),
    };

    match spotify::run_ingest(&config, &settings).await {
        Ok(count) => success!(
            "Ingestion finished: {} tracks written to {}",
            count,
            settings.output.display()
        ),
        Err(e) => error!("{}", e),
    }
}
