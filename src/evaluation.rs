//! Metrics and evaluation artifacts for a trained classifier.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::data_handling::ClaimDataset;
use crate::error::PipelineError;
use crate::models::classifier_trait::ClassifierModel;
use crate::report::plots;

/// Binary confusion counts at a fixed decision threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &[i32], y_pred: &[i32]) -> Self {
        let mut cm = ConfusionMatrix {
            tp: 0,
            fp: 0,
            tn: 0,
            fn_: 0,
        };
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            match (t == 1, p == 1) {
                (true, true) => cm.tp += 1,
                (false, true) => cm.fp += 1,
                (false, false) => cm.tn += 1,
                (true, false) => cm.fn_ += 1,
            }
        }
        cm
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    pub fn accuracy(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        (self.tp + self.tn) as f64 / self.total() as f64
    }

    pub fn precision(&self) -> f64 {
        if self.tp + self.fp == 0 {
            return 0.0;
        }
        self.tp as f64 / (self.tp + self.fp) as f64
    }

    pub fn recall(&self) -> f64 {
        if self.tp + self.fn_ == 0 {
            return 0.0;
        }
        self.tp as f64 / (self.tp + self.fn_) as f64
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }

    /// Fraction of actual claims predicted as no-claim.
    pub fn false_negative_rate(&self) -> f64 {
        if self.fn_ + self.tp == 0 {
            return 0.0;
        }
        self.fn_ as f64 / (self.fn_ + self.tp) as f64
    }
}

/// Sweep the ROC curve over every observed score threshold.
///
/// Returns (FPR, TPR) points from (0, 0) to (1, 1); samples tied on the same
/// score move together so ties cannot inflate the curve.
pub fn roc_curve(y_true: &[i32], scores: &[f32]) -> Result<Vec<(f64, f64)>, PipelineError> {
    if y_true.len() != scores.len() {
        return Err(PipelineError::Evaluation(format!(
            "{} labels but {} scores",
            y_true.len(),
            scores.len()
        )));
    }
    let total_pos = y_true.iter().filter(|&&v| v == 1).count();
    let total_neg = y_true.len() - total_pos;
    if total_pos == 0 || total_neg == 0 {
        return Err(PipelineError::Evaluation(
            "ROC curve needs both classes in the evaluation labels".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut points = vec![(0.0, 0.0)];
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut i = 0;
    while i < order.len() {
        let threshold = scores[order[i]];
        while i < order.len() && scores[order[i]] == threshold {
            if y_true[order[i]] == 1 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        points.push((fp as f64 / total_neg as f64, tp as f64 / total_pos as f64));
    }
    Ok(points)
}

/// Trapezoidal area under a swept ROC curve.
pub fn roc_auc(points: &[(f64, f64)]) -> f64 {
    points
        .windows(2)
        .map(|w| (w[1].0 - w[0].0) * (w[1].1 + w[0].1) / 2.0)
        .sum()
}

/// Scalar metrics plus artifact locations for one evaluation run.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub model: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: f64,
    pub false_negative_rate: f64,
    pub confusion: ConfusionMatrix,
    #[serde(skip)]
    pub roc_points: Vec<(f64, f64)>,
    pub confusion_plot: PathBuf,
    pub roc_plot: PathBuf,
}

/// Evaluates a trained classifier on the held-out split and writes the
/// run's figures.
pub struct ModelEvaluator {
    output_dir: PathBuf,
}

impl ModelEvaluator {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        ModelEvaluator {
            output_dir: output_dir.into(),
        }
    }

    /// Compute metrics on the held-out split, then write both figures.
    ///
    /// Metrics are computed before anything touches the filesystem, so a
    /// degenerate evaluation set leaves no files behind.
    pub fn evaluate(
        &self,
        model: &dyn ClassifierModel,
        held_out: &ClaimDataset,
    ) -> Result<EvaluationReport, PipelineError> {
        let (negatives, positives) = held_out.class_counts();
        if positives == 0 || negatives == 0 {
            return Err(PipelineError::Evaluation(format!(
                "Held-out labels contain a single class ({} claim, {} no-claim); metrics are undefined",
                positives, negatives
            )));
        }

        let scores = model.predict_proba(&held_out.x)?;
        let predicted = model.predict(&held_out.x)?;
        let y_true = held_out.y.to_vec();

        let confusion = ConfusionMatrix::from_predictions(&y_true, &predicted);
        let roc_points = roc_curve(&y_true, &scores)?;
        let auc = roc_auc(&roc_points);

        fs::create_dir_all(&self.output_dir)?;
        let confusion_plot = self.output_dir.join("confusion_matrix.html");
        let roc_plot = self.output_dir.join("roc_curve.html");
        plots::plot_confusion_matrix(&confusion, model.name()).write_html(&confusion_plot);
        plots::plot_roc_curve(&roc_points, auc, model.name()).write_html(&roc_plot);

        let report = EvaluationReport {
            model: model.name().to_string(),
            accuracy: confusion.accuracy(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1: confusion.f1(),
            roc_auc: auc,
            false_negative_rate: confusion.false_negative_rate(),
            confusion,
            roc_points,
            confusion_plot,
            roc_plot,
        };

        println!("F1-Score: {:.4}", report.f1);
        println!("ROC-AUC:  {:.4}", report.roc_auc);
        println!("FNR:      {:.4}", report.false_negative_rate);

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};
    use std::path::Path;

    /// Test double that replays canned scores.
    struct ScoreModel {
        scores: Vec<f32>,
    }

    impl ClassifierModel for ScoreModel {
        fn fit(&mut self, _x: &Array2<f32>, _y: &[i32]) -> Result<(), PipelineError> {
            Ok(())
        }

        fn predict_proba(&self, _x: &Array2<f32>) -> Result<Vec<f32>, PipelineError> {
            Ok(self.scores.clone())
        }

        fn save(&self, _path: &Path) -> Result<(), PipelineError> {
            Ok(())
        }
    }

    fn dataset(y: Vec<i32>) -> ClaimDataset {
        let n = y.len();
        let x = Array2::<f32>::zeros((n, 1));
        ClaimDataset::new(x, Array1::from_vec(y), vec!["score".into()]).expect("valid dataset")
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("claimcast_eval_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        dir
    }

    #[test]
    fn known_confusion_matrix_yields_known_metrics() {
        // TP=8, FN=2, FP=3, TN=87.
        let mut y = vec![1; 10];
        y.extend(vec![0; 90]);
        let mut scores = vec![0.9f32; 8];
        scores.extend(vec![0.1; 2]);
        scores.extend(vec![0.9; 3]);
        scores.extend(vec![0.1; 87]);

        let model = ScoreModel {
            scores: scores.clone(),
        };
        let evaluator = ModelEvaluator::new(scratch_dir("known"));
        let report = evaluator.evaluate(&model, &dataset(y)).expect("evaluate");

        assert_eq!(report.confusion.tp, 8);
        assert_eq!(report.confusion.fn_, 2);
        assert_eq!(report.confusion.fp, 3);
        assert_eq!(report.confusion.tn, 87);
        assert!((report.false_negative_rate - 0.2).abs() < 1e-12);
        assert!((report.f1 - 16.0 / 21.0).abs() < 1e-12);
    }

    #[test]
    fn separable_scores_give_perfect_auc() {
        let y = vec![1, 1, 0, 0, 0];
        let scores = vec![0.9, 0.8, 0.3, 0.2, 0.1];
        let points = roc_curve(&y, &scores).expect("roc");
        assert_eq!(roc_auc(&points), 1.0);
    }

    #[test]
    fn tied_scores_give_chance_auc() {
        let y = vec![1, 0, 1, 0];
        let scores = vec![0.5, 0.5, 0.5, 0.5];
        let points = roc_curve(&y, &scores).expect("roc");
        assert!((roc_auc(&points) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn single_class_evaluation_set_is_rejected_without_side_effects() {
        let model = ScoreModel {
            scores: vec![0.5; 4],
        };
        let dir = scratch_dir("degenerate");
        let evaluator = ModelEvaluator::new(dir.clone());
        let err = evaluator
            .evaluate(&model, &dataset(vec![0, 0, 0, 0]))
            .expect_err("expected evaluation error");
        assert!(matches!(err, PipelineError::Evaluation(_)));
        assert!(!dir.join("confusion_matrix.html").exists());
        assert!(!dir.join("roc_curve.html").exists());
    }
}
