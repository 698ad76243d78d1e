//! # API Module
//!
//! HTTP endpoints of the local prediction dashboard.
//!
//! ## Endpoints
//!
//! - [`dashboard`] - `GET /`, HTML page with model summary, CSV upload and the
//!   top feature importances
//! - [`health`] - `GET /health`, status, version and loaded model kind
//! - [`model_info`] - `GET /api/model`, contents of `model_info.json`, model
//!   kind and expected feature columns
//! - [`importance`] - `GET /api/importance`, top ten features
//! - [`predict`] - `POST /api/predict`, CSV body in, per-row predictions and
//!   (with an `is_hit` column) false positive / false negative counts out
//!
//! All handlers share one immutable [`crate::management::ModelManager`]
//! through an `Extension` layer.

mod dashboard;
mod health;
mod predict;

pub use dashboard::dashboard;
pub use health::health;
pub use predict::{TOP_FEATURES, importance, model_info, predict};
