use std::{fs::File, path::PathBuf};

use tabled::Table;

use crate::{
    api::TOP_FEATURES,
    error, info,
    management::ModelManager,
    scoring::{self, ScoreReport, UploadedTable},
    success,
    types::{ImportanceTableRow, PredictionTableRow},
    utils, warning,
};

/// Terminal rendition of the dashboard: model summary, scored rows and the
/// top feature importances.
pub async fn predict(input: PathBuf, model_dir: PathBuf) {
    let manager = match ModelManager::load(&model_dir).await {
        Ok(manager) => manager,
        Err(e) => error!("Error loading model: {}", e),
    };

    let model_info = manager.info();
    success!("Model loaded: {}", model_info.model_name);
    info!(
        "Accuracy: {} | F1 Score: {}",
        utils::format_percent(model_info.test_accuracy),
        utils::format_percent(model_info.test_f1_score)
    );

    let table = match File::open(&input)
        .map_err(|e| e.to_string())
        .and_then(|f| UploadedTable::from_reader(f).map_err(|e| e.to_string()))
    {
        Ok(table) => table,
        Err(e) => error!("Cannot read {}: {}", input.display(), e),
    };

    let missing: Vec<&str> = manager
        .feature_columns()
        .iter()
        .filter(|c| table.column_index(c).is_none())
        .map(|c| c.as_str())
        .collect();
    if !missing.is_empty() {
        warning!("Columns filled with 0: {}", missing.join(", "));
    }

    match scoring::score_table(&table, manager.model(), manager.feature_columns()) {
        Ok(report) => print_report(&report),
        Err(e) => error!("Prediction failed: {}", e),
    }

    let importance: Vec<ImportanceTableRow> = manager
        .top_features(TOP_FEATURES)
        .iter()
        .map(|f| ImportanceTableRow {
            feature: f.feature.clone(),
            importance: format!("{:.4}", f.importance),
        })
        .collect();
    println!("Top {} Important Features\n{}", TOP_FEATURES, Table::new(importance));
}

fn print_report(report: &ScoreReport) {
    if let Some(evaluation) = &report.evaluation {
        info!("Predicted hit but not hit: {}", evaluation.false_positive);
        info!("Predicted not hit but hit: {}", evaluation.false_negative);
        info!(
            "Accuracy: {}/{} ({:.1}%)",
            evaluation.correct,
            evaluation.total,
            evaluation.accuracy() * 100.0
        );
    }

    let rows: Vec<PredictionTableRow> = report
        .rows
        .iter()
        .map(|r| PredictionTableRow {
            track_name: r.track_name.clone().unwrap_or_default(),
            artists: r.artists.clone().unwrap_or_default(),
            is_hit: r
                .is_hit
                .as_deref()
                .map(scoring::display_label)
                .unwrap_or_default(),
            result: utils::hit_label(r.result).to_string(),
            probability: format!("{:.4}", r.probability),
        })
        .collect();

    println!("{}", Table::new(rows));
}
