use std::sync::Arc;

use axum::{Extension, response::Html};

use crate::{api::predict::TOP_FEATURES, management::ModelManager, utils};

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn importance_bars(state: &ModelManager) -> String {
    let top = state.top_features(TOP_FEATURES);
    let max = top
        .iter()
        .map(|f| f.importance)
        .fold(0.0_f64, f64::max)
        .max(f64::EPSILON);

    top.iter()
        .map(|f| {
            format!(
                "<tr><td>{name}</td><td><div class=\"bar\" style=\"width:{width:.1}%\"></div></td><td>{value:.4}</td></tr>",
                name = escape(&f.feature),
                width = f.importance / max * 100.0,
                value = f.importance
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// Results are rendered client side from the /api/predict JSON.
const SCRIPT: &str = r#"
const label = v => v === 1 || v === "1" || v === "1.0" ? "Hit" : (v === 0 || v === "0" || v === "0.0" ? "Not Hit" : (v ?? ""));
const cls = l => l === "Hit" ? "hit" : (l === "Not Hit" ? "miss" : "");
document.getElementById("upload").addEventListener("change", async (ev) => {
  const file = ev.target.files[0];
  if (!file) return;
  const res = await fetch("/api/predict", { method: "POST", body: await file.text() });
  const out = document.getElementById("results");
  if (!res.ok) {
    const text = await res.text();
    let message = text;
    try { message = JSON.parse(text).error ?? text; } catch (_) {}
    out.textContent = `Upload failed (${res.status}): ${message}`;
    return;
  }
  const report = await res.json();
  let html = "";
  if (report.evaluation) {
    const e = report.evaluation;
    html += `<p>Predicted hit but not hit: ${e.false_positive}</p>`;
    html += `<p>Predicted not hit but hit: ${e.false_negative}</p>`;
    html += `<p><b>Accuracy:</b> ${e.correct}/${e.total} (${(e.total ? e.correct / e.total * 100 : 0).toFixed(1)}%)</p>`;
  }
  html += "<table><tr><th>track_name</th><th>artists</th><th>is_hit</th><th>result</th><th>probability</th></tr>";
  for (const r of report.rows) {
    const truth = r.is_hit === null ? "" : label(r.is_hit);
    const result = label(r.result);
    const esc = s => (s ?? "").replace(/[&<>"]/g, c => ({"&":"&amp;","<":"&lt;",">":"&gt;","\"":"&quot;"}[c]));
    html += `<tr><td>${esc(r.track_name)}</td><td>${esc(r.artists)}</td><td class="${cls(truth)}">${truth}</td><td class="${cls(result)}">${result}</td><td>${r.probability.toFixed(4)}</td></tr>`;
  }
  out.innerHTML = html + "</table>";
});
"#;

pub async fn dashboard(Extension(state): Extension<Arc<ModelManager>>) -> Html<String> {
    let info = state.info();
    Html(format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>Music Hit Prediction</title>
<style>
body {{ font-family: sans-serif; margin: 2rem auto; max-width: 960px; }}
table {{ border-collapse: collapse; }}
td, th {{ padding: 0.2rem 0.6rem; text-align: left; }}
.bar {{ background: #1f77b4; height: 0.9rem; min-width: 1px; }}
.hit {{ color: green; }}
.miss {{ color: red; }}
</style>
</head>
<body>
<h1>Music Hit Prediction</h1>
<h2>Load Model</h2>
<p>Model loaded: {name}</p>
<p>Accuracy: {accuracy} | F1 Score: {f1}</p>
<h2>Upload CSV File</h2>
<input type="file" id="upload" accept=".csv,text/csv">
<h2>Predictions</h2>
<div id="results"></div>
<h2>Feature Importance</h2>
<table style="width:100%">
{bars}
</table>
<script>{script}</script>
</body>
</html>"#,
        name = escape(&info.model_name),
        accuracy = utils::format_percent(info.test_accuracy),
        f1 = utils::format_percent(info.test_f1_score),
        bars = importance_bars(&state),
        script = SCRIPT,
    ))
}
