use std::sync::Arc;

use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::management::ModelManager;

/// Liveness plus a short summary of the loaded model.
pub async fn health(Extension(state): Extension<Arc<ModelManager>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.model().kind(),
        "features": state.feature_columns().len(),
    }))
}
