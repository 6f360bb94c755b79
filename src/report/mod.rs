//! Run report rendering: plotly figures plus a small HTML summary page.
pub mod plots;

use std::fs;
use std::path::{Path, PathBuf};

use maud::{html, Markup};

use crate::error::PipelineError;
use crate::evaluation::EvaluationReport;

fn render(report: &EvaluationReport, generated_at: &str) -> Markup {
    let metric_rows = [
        ("Accuracy", report.accuracy),
        ("Precision", report.precision),
        ("Recall", report.recall),
        ("F1-Score", report.f1),
        ("ROC-AUC", report.roc_auc),
        ("False Negative Rate", report.false_negative_rate),
    ];

    html! {
        html {
            head { title { "claimcast run report" } }
            body {
                h1 { "Claim-risk training report" }
                p { "Model: " (report.model) }
                p { "Generated: " (generated_at) }
                table border="1" cellpadding="4" {
                    tr { th { "Metric" } th { "Value" } }
                    @for (name, value) in &metric_rows {
                        tr {
                            td { (name) }
                            td { (format!("{:.4}", value)) }
                        }
                    }
                }
                p {
                    a href=(report.confusion_plot.display().to_string()) { "Confusion matrix" }
                    " | "
                    a href=(report.roc_plot.display().to_string()) { "ROC curve" }
                }
            }
        }
    }
}

/// Write the HTML run report next to the figures and return its path.
pub fn write_run_report(
    report: &EvaluationReport,
    output_dir: &Path,
) -> Result<PathBuf, PipelineError> {
    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let path = output_dir.join("report.html");
    fs::write(&path, render(report, &generated_at).into_string())?;
    Ok(path)
}
