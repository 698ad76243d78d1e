use std::sync::Arc;

use crate::{
    config::DashboardConfig, error, info, management::ModelManager, server, success, utils,
    warning,
};

pub async fn serve(config: DashboardConfig, open: bool) {
    // no dashboard without a model
    let manager = match ModelManager::load(&config.model_dir).await {
        Ok(manager) => manager,
        Err(e) => error!("Error loading model: {}", e),
    };

    success!("Model loaded: {}", manager.info().model_name);
    info!(
        "Accuracy: {} | F1 Score: {}",
        utils::format_percent(manager.info().test_accuracy),
        utils::format_percent(manager.info().test_f1_score)
    );

    if open {
        let url = format!("http://{}/", config.address);
        if webbrowser::open(&url).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                url
            )
        }
    }

    if let Err(e) = server::start_api_server(Arc::new(manager), &config.address).await {
        error!("Dashboard server stopped: {}", e);
    }
}
