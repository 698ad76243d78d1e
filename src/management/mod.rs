mod auth;
mod collection;
pub mod export;
mod model;

pub use auth::TokenManager;
pub use collection::TrackCollection;
pub use model::{
    FEATURE_COLUMNS_FILE, FEATURE_IMPORTANCE_FILE, FeatureImportance, MODEL_FILE,
    MODEL_INFO_FILE, ModelError, ModelInfo, ModelManager, parse_importance,
};
