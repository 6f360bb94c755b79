//! Class-rebalancing strategies for the training split.
//!
//! Resampling is only ever applied to training data; held-out splits pass
//! around this stage untouched so evaluation stays unbiased. All strategies
//! are deterministic for a fixed seed.

use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::data_handling::ClaimDataset;
use crate::error::PipelineError;

/// Sampling selection, parsed from a configuration name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingStrategy {
    /// Pass-through.
    None,
    /// Duplicate minority rows with replacement up to the majority count.
    Oversample,
    /// Subsample majority rows without replacement down to the minority count.
    Undersample,
}

impl FromStr for SamplingStrategy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(SamplingStrategy::None),
            "oversample" => Ok(SamplingStrategy::Oversample),
            "undersample" => Ok(SamplingStrategy::Undersample),
            _ => Err(PipelineError::Config(format!(
                "Unknown sampling strategy: '{}'. Available strategies: none, oversample, undersample",
                s
            ))),
        }
    }
}

/// Rebalances a training split according to the selected strategy.
pub struct Sampler {
    strategy: SamplingStrategy,
    seed: u64,
}

impl Sampler {
    pub fn new(strategy: SamplingStrategy, seed: u64) -> Self {
        Sampler { strategy, seed }
    }

    pub fn strategy(&self) -> SamplingStrategy {
        self.strategy
    }

    /// Return a rebalanced copy of `train`.
    pub fn resample(&self, train: &ClaimDataset) -> Result<ClaimDataset, PipelineError> {
        match self.strategy {
            SamplingStrategy::None => Ok(train.clone()),
            SamplingStrategy::Oversample => self.oversample(train),
            SamplingStrategy::Undersample => self.undersample(train),
        }
    }

    fn oversample(&self, train: &ClaimDataset) -> Result<ClaimDataset, PipelineError> {
        let (minority, majority) = class_partitions(train)?;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut indices: Vec<usize> = (0..train.n_samples()).collect();
        let deficit = majority.len() - minority.len();
        for _ in 0..deficit {
            indices.push(minority[rng.gen_range(0..minority.len())]);
        }
        Ok(train.select_rows(&indices))
    }

    fn undersample(&self, train: &ClaimDataset) -> Result<ClaimDataset, PipelineError> {
        let (minority, majority) = class_partitions(train)?;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut indices: Vec<usize> = minority.clone();
        indices.extend(
            majority
                .choose_multiple(&mut rng, minority.len())
                .cloned(),
        );
        // Keep the original row order.
        indices.sort_unstable();
        Ok(train.select_rows(&indices))
    }
}

/// Row indices of the (minority, majority) classes.
fn class_partitions(train: &ClaimDataset) -> Result<(Vec<usize>, Vec<usize>), PipelineError> {
    let positives: Vec<usize> = train
        .y
        .iter()
        .enumerate()
        .filter_map(|(i, &v)| (v == 1).then_some(i))
        .collect();
    let negatives: Vec<usize> = train
        .y
        .iter()
        .enumerate()
        .filter_map(|(i, &v)| (v != 1).then_some(i))
        .collect();

    if positives.is_empty() || negatives.is_empty() {
        return Err(PipelineError::Data(
            "Cannot resample a single-class training split".to_string(),
        ));
    }
    if positives.len() <= negatives.len() {
        Ok((positives, negatives))
    } else {
        Ok((negatives, positives))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};

    fn imbalanced_dataset() -> ClaimDataset {
        // 8 no-claim rows, 2 claim rows.
        let n = 10;
        let x = Array2::from_shape_fn((n, 3), |(i, j)| (i * 3 + j) as f32);
        let y = Array1::from_vec(vec![0, 0, 0, 0, 1, 0, 0, 0, 1, 0]);
        ClaimDataset::new(x, y, vec!["a".into(), "b".into(), "c".into()]).expect("valid dataset")
    }

    #[test]
    fn unknown_strategy_name_is_a_config_error() {
        let err = "smote".parse::<SamplingStrategy>().expect_err("expected error");
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn oversampling_equalizes_class_counts() {
        let train = imbalanced_dataset();
        let resampled = Sampler::new(SamplingStrategy::Oversample, 7)
            .resample(&train)
            .expect("resample");
        let (negatives, positives) = resampled.class_counts();
        assert_eq!(negatives, 8);
        assert_eq!(positives, 8);
        assert_eq!(resampled.n_features(), train.n_features());
    }

    #[test]
    fn undersampling_equalizes_class_counts() {
        let train = imbalanced_dataset();
        let resampled = Sampler::new(SamplingStrategy::Undersample, 7)
            .resample(&train)
            .expect("resample");
        let (negatives, positives) = resampled.class_counts();
        assert_eq!(negatives, 2);
        assert_eq!(positives, 2);
    }

    #[test]
    fn resampling_is_deterministic_per_seed() {
        let train = imbalanced_dataset();
        let a = Sampler::new(SamplingStrategy::Oversample, 42)
            .resample(&train)
            .expect("resample");
        let b = Sampler::new(SamplingStrategy::Oversample, 42)
            .resample(&train)
            .expect("resample");
        assert_eq!(a.y, b.y);
        assert_eq!(a.x, b.x);
    }

    #[test]
    fn none_strategy_is_a_pass_through() {
        let train = imbalanced_dataset();
        let resampled = Sampler::new(SamplingStrategy::None, 0)
            .resample(&train)
            .expect("resample");
        assert_eq!(resampled.x, train.x);
        assert_eq!(resampled.y, train.y);
    }

    #[test]
    fn single_class_split_cannot_be_resampled() {
        let x = Array2::<f32>::zeros((3, 1));
        let y = Array1::from_vec(vec![0, 0, 0]);
        let train = ClaimDataset::new(x, y, vec!["a".into()]).expect("valid dataset");
        let err = Sampler::new(SamplingStrategy::Oversample, 0)
            .resample(&train)
            .expect_err("expected data error");
        assert!(matches!(err, PipelineError::Data(_)));
    }
}
