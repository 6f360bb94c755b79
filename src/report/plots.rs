use plotly::common::{DashType, Line, Mode};
use plotly::layout::{Axis, Layout};
use plotly::{HeatMap, Plot, Scatter};

use crate::evaluation::ConfusionMatrix;

/// Plot the swept ROC curve with the chance diagonal for reference.
pub fn plot_roc_curve(points: &[(f64, f64)], auc: f64, model_name: &str) -> Plot {
    let fpr: Vec<f64> = points.iter().map(|p| p.0).collect();
    let tpr: Vec<f64> = points.iter().map(|p| p.1).collect();

    let curve = Scatter::new(fpr, tpr)
        .mode(Mode::Lines)
        .name(format!("{} (AUC = {:.3})", model_name, auc));

    let chance = Scatter::new(vec![0.0, 1.0], vec![0.0, 1.0])
        .mode(Mode::Lines)
        .name("Chance")
        .line(Line::new().color("red").dash(DashType::Dash));

    let layout = Layout::new()
        .title("ROC Curve")
        .x_axis(Axis::new().title("False Positive Rate"))
        .y_axis(Axis::new().title("True Positive Rate"));

    let mut plot = Plot::new();
    plot.add_trace(curve);
    plot.add_trace(chance);
    plot.set_layout(layout);
    plot
}

/// Render the confusion counts as a heat map, actual classes on rows.
pub fn plot_confusion_matrix(cm: &ConfusionMatrix, model_name: &str) -> Plot {
    let x = vec![
        "Predicted no claim".to_string(),
        "Predicted claim".to_string(),
    ];
    let y = vec!["Actual no claim".to_string(), "Actual claim".to_string()];
    let z = vec![
        vec![cm.tn as f64, cm.fp as f64],
        vec![cm.fn_ as f64, cm.tp as f64],
    ];

    let layout = Layout::new().title(format!("Confusion Matrix ({})", model_name));

    let mut plot = Plot::new();
    plot.add_trace(HeatMap::new(x, y, z));
    plot.set_layout(layout);
    plot
}
