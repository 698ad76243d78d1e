use std::sync::Arc;

use axum::{Extension, http::StatusCode, response::Json};
use serde_json::{Value, json};

use crate::{
    management::ModelManager,
    scoring::{self, ScoreReport, UploadedTable},
};

pub const TOP_FEATURES: usize = 10;

/// Scores a CSV request body.
///
/// Responds `400` only when the body is not CSV at all and `500` when the
/// model fails to run; missing feature columns are zero-filled.
pub async fn predict(
    Extension(state): Extension<Arc<ModelManager>>,
    body: String,
) -> Result<Json<ScoreReport>, (StatusCode, Json<Value>)> {
    let table = UploadedTable::from_reader(body.as_bytes()).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("invalid CSV: {}", e) })),
        )
    })?;

    let report = scoring::score_table(&table, state.model(), state.feature_columns()).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("prediction failed: {}", e) })),
        )
    })?;
    Ok(Json(report))
}

pub async fn model_info(Extension(state): Extension<Arc<ModelManager>>) -> Json<Value> {
    Json(json!({
        "info": state.info(),
        "kind": state.model().kind(),
        "feature_columns": state.feature_columns(),
    }))
}

pub async fn importance(Extension(state): Extension<Arc<ModelManager>>) -> Json<Value> {
    Json(json!(state.top_features(TOP_FEATURES)))
}
