use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::model::{Classifier, OnnxClassifier};

pub const MODEL_FILE: &str = "best_model.onnx";
pub const FEATURE_COLUMNS_FILE: &str = "feature_columns.json";
pub const MODEL_INFO_FILE: &str = "model_info.json";
pub const FEATURE_IMPORTANCE_FILE: &str = "feature_importance.csv";

#[derive(Debug)]
pub enum ModelError {
    IoError { path: PathBuf, source: std::io::Error },
    SerdeError { path: PathBuf, source: serde_json::Error },
    CsvError { path: PathBuf, source: csv::Error },
    CriticalError(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::IoError { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
            ModelError::SerdeError { path, source } => {
                write!(f, "cannot parse {}: {}", path.display(), source)
            }
            ModelError::CsvError { path, source } => {
                write!(f, "cannot parse {}: {}", path.display(), source)
            }
            ModelError::CriticalError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

/// Contents of `model_info.json`. Unknown keys are kept in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_name: String,
    pub test_accuracy: f64,
    pub test_f1_score: f64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    #[serde(rename = "Feature")]
    pub feature: String,
    #[serde(rename = "Importance")]
    pub importance: f64,
}

/// Everything the scoring path needs from the model directory.
pub struct ModelManager {
    model: Box<dyn Classifier>,
    feature_columns: Vec<String>,
    info: ModelInfo,
    importance: Vec<FeatureImportance>,
}

impl ModelManager {
    /// Bundles a classifier with its metadata.
    ///
    /// The classifier is run once on an all-zero row so that a model which
    /// does not accept `feature_columns.len()` inputs fails here and not on
    /// the first upload.
    pub fn new(
        model: Box<dyn Classifier>,
        feature_columns: Vec<String>,
        info: ModelInfo,
        importance: Vec<FeatureImportance>,
    ) -> Result<Self, ModelError> {
        let zero_row = vec![0.0; feature_columns.len()];
        model
            .predict(&[zero_row])
            .map_err(|e| {
                ModelError::CriticalError(format!(
                    "model does not accept the {} feature columns: {}",
                    feature_columns.len(),
                    e
                ))
            })?;
        Ok(Self {
            model,
            feature_columns,
            info,
            importance,
        })
    }

    /// Loads the four artifacts from `dir`.
    ///
    /// # Errors
    ///
    /// Any missing or unparsable file, or a model that cannot score rows of
    /// the listed feature columns.
    pub async fn load(dir: &Path) -> Result<Self, ModelError> {
        let model_path = dir.join(MODEL_FILE);
        async_fs::metadata(&model_path)
            .await
            .map_err(|source| ModelError::IoError {
                path: model_path.clone(),
                source,
            })?;
        let model = OnnxClassifier::load(&model_path).map_err(ModelError::CriticalError)?;

        let feature_columns: Vec<String> = read_json(&dir.join(FEATURE_COLUMNS_FILE)).await?;
        let info: ModelInfo = read_json(&dir.join(MODEL_INFO_FILE)).await?;

        let importance_path = dir.join(FEATURE_IMPORTANCE_FILE);
        let content = read_string(&importance_path).await?;
        let importance = parse_importance(&content).map_err(|source| ModelError::CsvError {
            path: importance_path,
            source,
        })?;

        Self::new(Box::new(model), feature_columns, info, importance)
    }

    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    /// The first `n` rows of the importance table, in file order.
    pub fn top_features(&self, n: usize) -> &[FeatureImportance] {
        &self.importance[..n.min(self.importance.len())]
    }
}

async fn read_string(path: &Path) -> Result<String, ModelError> {
    async_fs::read_to_string(path)
        .await
        .map_err(|source| ModelError::IoError {
            path: path.to_path_buf(),
            source,
        })
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let content = read_string(path).await?;
    serde_json::from_str(&content).map_err(|source| ModelError::SerdeError {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_importance(content: &str) -> Result<Vec<FeatureImportance>, csv::Error> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    rdr.deserialize().collect()
}
