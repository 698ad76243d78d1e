use std::{path::Path, sync::Mutex};

use ndarray::Array2;
use ort::{session::Session, value::Tensor};

use crate::model::{Classifier, Prediction, label_for};

const LABEL_OUTPUT: &str = "output_label";
const PROBABILITY_OUTPUT: &str = "output_probability";

/// A binary classifier exported to ONNX, e.g. by `skl2onnx` with
/// `options={"zipmap": False}`.
///
/// The first graph input takes a `float32 [N, n_features]` matrix. The
/// probabilities come from `output_probability` (`[N, 2]`, hit class in
/// column 1, or `[N, 1]`); labels come from `output_label` when the graph
/// has one and are derived from the probability otherwise.
pub struct OnnxClassifier {
    // `Session::run` needs exclusive access
    session: Mutex<Session>,
    input_name: String,
    probability_output: String,
    label_output: Option<String>,
}

impl OnnxClassifier {
    pub fn load(path: &Path) -> Result<Self, String> {
        let session = Session::builder()
            .and_then(|b| b.with_intra_threads(1))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| format!("Failed to load {}: {}", path.display(), e))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or("model has no input")?;

        let outputs: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        let label_output = outputs.iter().find(|name| *name == LABEL_OUTPUT).cloned();
        let probability_output = outputs
            .iter()
            .find(|name| *name == PROBABILITY_OUTPUT)
            .or_else(|| outputs.iter().find(|name| Some(*name) != label_output.as_ref()))
            .cloned()
            .ok_or("model has no probability output")?;

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            probability_output,
            label_output,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn kind(&self) -> &str {
        "onnx"
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<Prediction>, String> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let width = rows[0].len();
        let flat: Vec<f32> = rows
            .iter()
            .flat_map(|row| row.iter().map(|&v| v as f32))
            .collect();
        let input = Array2::from_shape_vec((rows.len(), width), flat)
            .map_err(|e| format!("Model input shape error: {}", e))?;
        let input_tensor =
            Tensor::from_array(input).map_err(|e| format!("Model tensor creation error: {}", e))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| "model session is poisoned".to_string())?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| format!("Model inference error: {}", e))?;

        let (_, probability_value) = outputs
            .iter()
            .find(|(name, _)| *name == self.probability_output)
            .ok_or("model produced no probabilities")?;
        let (_shape, probs) = probability_value
            .try_extract_tensor::<f32>()
            .map_err(|e| format!("Model probability extraction error: {}", e))?;

        let columns = probs.len() / rows.len();
        if columns == 0 || probs.len() % rows.len() != 0 {
            return Err(format!(
                "expected probabilities for {} rows, got {} values",
                rows.len(),
                probs.len()
            ));
        }
        // hit class is the last column
        let hit: Vec<f64> = probs
            .chunks(columns)
            .map(|chunk| f64::from(chunk[columns - 1]))
            .collect();

        let mut labels: Option<Vec<u8>> = None;
        if let Some(label_output) = &self.label_output {
            if let Some((_, value)) = outputs
                .iter()
                .find(|(name, _)| *name == label_output.as_str())
            {
                if let Ok((_shape, data)) = value.try_extract_tensor::<i64>() {
                    labels = Some(data.iter().map(|&l| u8::from(l == 1)).collect());
                }
            }
        }

        Ok(hit
            .iter()
            .enumerate()
            .map(|(i, &probability)| Prediction {
                label: labels
                    .as_ref()
                    .and_then(|l| l.get(i).copied())
                    .unwrap_or_else(|| label_for(probability)),
                probability,
            })
            .collect())
    }
}
