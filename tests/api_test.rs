mod common;

use std::sync::Arc;

use common::spawn;
use hitscout::{
    management::{ModelInfo, ModelManager, parse_importance},
    model::{Classifier, Prediction},
    server,
};
use serde_json::{Value, json};

/// sigmoid(10 * energy - 5) over (danceability, energy).
struct EnergyLogit;

impl Classifier for EnergyLogit {
    fn kind(&self) -> &str {
        "energy_logit"
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<Prediction>, String> {
        Ok(rows
            .iter()
            .map(|row| Prediction::from_probability(1.0 / (1.0 + (5.0 - 10.0 * row[1]).exp())))
            .collect())
    }
}

fn manager() -> ModelManager {
    let info: ModelInfo = serde_json::from_value(json!({
        "model_name": "Logistic <Regression>",
        "test_accuracy": 0.8123,
        "test_f1_score": 0.5
    }))
    .unwrap();
    let mut rows = String::from("Feature,Importance\n");
    for i in 0..12 {
        rows.push_str(&format!("f{},{}\n", i, 1.0 - i as f64 / 20.0));
    }

    ModelManager::new(
        Box::new(EnergyLogit),
        vec!["danceability".to_string(), "energy".to_string()],
        info,
        parse_importance(&rows).unwrap(),
    )
    .unwrap()
}

async fn dashboard_url() -> String {
    spawn(server::router(Arc::new(manager()))).await
}

#[tokio::test]
async fn test_health() {
    let base = dashboard_url().await;
    let body: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "energy_logit");
    assert_eq!(body["features"], 2);
}

#[tokio::test]
async fn test_dashboard_page() {
    let base = dashboard_url().await;
    let html = reqwest::get(format!("{}/", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains("Model loaded: Logistic &lt;Regression&gt;"));
    assert!(html.contains("Accuracy: 81.23% | F1 Score: 50.00%"));
    assert!(html.contains("<td>f9</td>"));
    assert!(!html.contains("<td>f10</td>"));
}

#[tokio::test]
async fn test_model_and_importance() {
    let base = dashboard_url().await;

    let model: Value = reqwest::get(format!("{}/api/model", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(model["kind"], "energy_logit");
    assert_eq!(model["feature_columns"], json!(["danceability", "energy"]));
    assert_eq!(model["info"]["model_name"], "Logistic <Regression>");

    let importance: Value = reqwest::get(format!("{}/api/importance", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let top = importance.as_array().unwrap();
    assert_eq!(top.len(), 10);
    assert_eq!(top[0]["Feature"], "f0");
}

#[tokio::test]
async fn test_predict_with_labels() {
    let base = dashboard_url().await;
    let csv = "track_name,artists,energy,is_hit\n\
               Loud,A,0.9,1\n\
               Quiet,B,0.1,1\n\
               Soft,C,0.2,0\n";

    let res = reqwest::Client::new()
        .post(format!("{}/api/predict", base))
        .body(csv)
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    let report: Value = res.json().await.unwrap();

    let rows = report["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["track_name"], "Loud");
    assert_eq!(rows[0]["result"], 1);
    assert_eq!(rows[1]["result"], 0);
    assert_eq!(rows[1]["is_hit"], "1");

    let evaluation = &report["evaluation"];
    assert_eq!(evaluation["false_positive"], 0);
    assert_eq!(evaluation["false_negative"], 1);
    assert_eq!(evaluation["correct"], 2);
}

#[tokio::test]
async fn test_predict_without_labels() {
    let base = dashboard_url().await;

    let report: Value = reqwest::Client::new()
        .post(format!("{}/api/predict", base))
        .body("track_name,energy\nOnly,0.8\n")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(report["evaluation"].is_null());
    assert!(report["rows"][0]["is_hit"].is_null());
    assert!(report["rows"][0]["artists"].is_null());
}

#[tokio::test]
async fn test_predict_accepts_large_upload() {
    let base = dashboard_url().await;
    let mut csv = String::from("track_name,artists,danceability,energy,is_hit\n");
    for i in 0..60_000 {
        csv.push_str(&format!("Track number {},Some artist,0.5,0.9,1\n", i));
    }
    assert!(csv.len() > 2 * 1024 * 1024);

    let res = reqwest::Client::new()
        .post(format!("{}/api/predict", base))
        .body(csv)
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());

    let report: Value = res.json().await.unwrap();
    assert_eq!(report["rows"].as_array().unwrap().len(), 60_000);
    assert_eq!(report["evaluation"]["correct"], 60_000);
}

