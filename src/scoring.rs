//! Batch scoring of uploaded tables.
//!
//! An uploaded CSV is coerced to exactly the feature columns the model was
//! trained on ([`FeatureFrame`]), scored in one batch, and, if the table
//! carries an `is_hit` column, compared against the ground truth. Missing
//! columns and unreadable cells become zero; only the classifier can fail.

use std::{collections::HashMap, io::Read};

use serde::Serialize;

use crate::{model::Classifier, utils};

pub const LABEL_COLUMN: &str = "is_hit";

/// A CSV table kept as raw strings.
#[derive(Debug, Clone, Default)]
pub struct UploadedTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl UploadedTable {
    /// Reads a headed CSV. Short rows are allowed; absent cells read as blank.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            rows.push(record?.iter().map(|c| c.to_string()).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell `column` of `row`, `None` if the column or cell does not exist.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|c| c.as_str())
    }

    fn named_cell(&self, row: usize, name: &str) -> Option<&str> {
        self.column_index(name).and_then(|c| self.cell(row, c))
    }
}

/// Numeric matrix with exactly the model's feature columns, in model order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureFrame {
    /// Selects each expected column from `table`, zero-filling absent ones.
    ///
    /// Extra columns of the table are dropped.
    pub fn from_table(table: &UploadedTable, expected: &[String]) -> Self {
        // a repeated header resolves to its first column
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for (i, h) in table.headers.iter().enumerate() {
            positions.entry(h.as_str()).or_insert(i);
        }

        let lookup: Vec<Option<usize>> = expected
            .iter()
            .map(|col| positions.get(col.as_str()).copied())
            .collect();

        let rows = (0..table.len())
            .map(|r| {
                lookup
                    .iter()
                    .map(|pos| {
                        pos.and_then(|c| table.cell(r, c))
                            .map(utils::coerce_number)
                            .unwrap_or(0.0)
                    })
                    .collect()
            })
            .collect();

        Self {
            columns: expected.to_vec(),
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let c = self.columns.iter().position(|h| h == name)?;
        Some(self.rows.iter().map(|r| r[c]).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRow {
    pub track_name: Option<String>,
    pub artists: Option<String>,
    /// Ground truth as found in the table, if any.
    pub is_hit: Option<String>,
    pub result: u8,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    /// Predicted hit, labelled otherwise.
    pub false_positive: usize,
    /// Predicted not hit, labelled otherwise.
    pub false_negative: usize,
    pub correct: usize,
    pub total: usize,
}

impl Evaluation {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub rows: Vec<ScoredRow>,
    pub evaluation: Option<Evaluation>,
}

/// Parses a label cell; blank or non-numeric cells have no class.
fn label_class(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|c| c.trim().parse::<f64>().ok())
}

/// Counts mismatches between predictions and the `is_hit` column.
///
/// A row whose label is missing or not a number counts as a mismatch.
pub fn evaluate(table: &UploadedTable, predictions: &[u8]) -> Option<Evaluation> {
    let label = table.column_index(LABEL_COLUMN)?;

    let mut false_positive = 0;
    let mut false_negative = 0;
    for (r, result) in predictions.iter().enumerate() {
        let truth = label_class(table.cell(r, label));
        if *result == 0 && truth != Some(0.0) {
            false_negative += 1;
        }
        if *result == 1 && truth != Some(1.0) {
            false_positive += 1;
        }
    }

    let total = predictions.len();
    Some(Evaluation {
        false_positive,
        false_negative,
        correct: total - (false_positive + false_negative),
        total,
    })
}

/// Scores every row of `table` with `model`.
///
/// # Errors
///
/// Only when the classifier itself fails to run.
pub fn score_table<C>(
    table: &UploadedTable,
    model: &C,
    feature_columns: &[String],
) -> Result<ScoreReport, String>
where
    C: Classifier + ?Sized,
{
    let frame = FeatureFrame::from_table(table, feature_columns);
    let predictions = model.predict(frame.rows())?;
    if predictions.len() != frame.rows().len() {
        return Err(format!(
            "model returned {} predictions for {} rows",
            predictions.len(),
            frame.rows().len()
        ));
    }

    let labels: Vec<u8> = predictions.iter().map(|p| p.label).collect();
    let rows = predictions
        .iter()
        .enumerate()
        .map(|(r, prediction)| ScoredRow {
            track_name: table.named_cell(r, "track_name").map(str::to_string),
            artists: table.named_cell(r, "artists").map(str::to_string),
            is_hit: table.named_cell(r, LABEL_COLUMN).map(str::to_string),
            result: prediction.label,
            probability: prediction.probability,
        })
        .collect();

    Ok(ScoreReport {
        rows,
        evaluation: evaluate(table, &labels),
    })
}

/// `Hit` / `Not Hit` for a label cell, or the raw cell if it is not 0/1.
pub fn display_label(cell: &str) -> String {
    match label_class(Some(cell)) {
        Some(v) if v == 1.0 => utils::hit_label(1).to_string(),
        Some(v) if v == 0.0 => utils::hit_label(0).to_string(),
        _ => cell.to_string(),
    }
}
