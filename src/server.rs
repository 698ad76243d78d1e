use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::{net::SocketAddr, str::FromStr, sync::Arc};

use crate::{Res, api, info, management::ModelManager};

/// Largest accepted CSV upload.
pub const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

pub fn router(state: Arc<ModelManager>) -> Router {
    Router::new()
        .route("/", get(api::dashboard))
        .route("/health", get(api::health))
        .route("/api/model", get(api::model_info))
        .route("/api/importance", get(api::importance))
        .route("/api/predict", post(api::predict))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(Extension(state))
}

pub async fn start_api_server(state: Arc<ModelManager>, address: &str) -> Res<()> {
    let addr = SocketAddr::from_str(address)
        .map_err(|e| format!("Failed to parse server address {}: {}", address, e))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Dashboard listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
