//! Per-fold evaluation and score reassembly.

use nalgebra::DVector;
use rayon::prelude::*;

use crate::crossval::folds::{Fold, FoldStrategy, folds_from_indexer};
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::metrics::{Aggregator, PredictionMetric};
use crate::model::{Model, Regressor};

/// Cross-validated evaluation of a model's current parameters.
///
/// Each fold fits a fresh clone of the model on the train split and scores
/// the prediction on the held-out rows. Folds only read the shared source
/// dataset, so they are evaluated in parallel; reassembly is index-addressed
/// and therefore independent of completion order.
pub struct CrossValidation<'a, M: Model> {
    model: &'a M,
}

impl<'a, M: Model> CrossValidation<'a, M> {
    pub(crate) fn new(model: &'a M) -> Self {
        Self { model }
    }
}

impl<M> CrossValidation<'_, M>
where
    M: Model + Send + Sync,
    M::Feature: Send + Sync,
{
    /// Cross-validated per-row scores, in the dataset's original order.
    pub fn scores<E>(
        &self,
        metric: &E,
        dataset: &Dataset<M::Feature>,
        strategy: &FoldStrategy<'_>,
    ) -> Result<DVector<f64>>
    where
        E: PredictionMetric + Sync,
    {
        let indexer = strategy.indexer(dataset.size())?;
        let folds = folds_from_indexer(dataset, &indexer)?;

        let per_group: Vec<(Vec<usize>, DVector<f64>)> = folds
            .par_iter()
            .map(|fold| -> Result<(Vec<usize>, DVector<f64>)> {
                let scores = self.score_fold(metric, fold)?;
                Ok((fold.test_indices.clone(), scores))
            })
            .collect::<Result<Vec<_>>>()?;

        scatter_scores(dataset.size(), &per_group)
    }

    fn score_fold<E>(&self, metric: &E, fold: &Fold<M::Feature>) -> Result<DVector<f64>>
    where
        E: PredictionMetric,
    {
        let mut regressor = Regressor::new(self.model.clone());
        regressor.fit(&fold.train.features, &fold.train.targets)?;
        let prediction = regressor.predict(&fold.test.features)?;
        let view: E::View = prediction.get()?;
        let scores = metric.score(&view, &fold.test.targets)?;
        if scores.len() != fold.test.size() {
            return Err(Error::IllegalState(format!(
                "Metric produced {} scores for {} held-out rows.",
                scores.len(),
                fold.test.size()
            )));
        }
        Ok(scores)
    }
}

/// Scatter per-group score vectors back into a full-length vector using the
/// original row indices.
///
/// Group rows are generally non-contiguous in the original ordering, so the
/// scores are placed, not concatenated. The result does not depend on the
/// order of `per_group`; every row must be covered exactly once.
pub fn scatter_scores(
    n: usize,
    per_group: &[(Vec<usize>, DVector<f64>)],
) -> Result<DVector<f64>> {
    let mut out = DVector::zeros(n);
    let mut filled = vec![false; n];
    for (indices, scores) in per_group {
        if indices.len() != scores.len() {
            return Err(Error::InvalidArgument(format!(
                "Group has {} indices but {} scores.",
                indices.len(),
                scores.len()
            )));
        }
        for (&idx, &score) in indices.iter().zip(scores.iter()) {
            if idx >= n {
                return Err(Error::InvalidArgument(format!(
                    "Score index {idx} outside 0..{n}."
                )));
            }
            if filled[idx] {
                return Err(Error::InvalidArgument(format!("Row {idx} scored twice.")));
            }
            out[idx] = score;
            filled[idx] = true;
        }
    }
    if let Some(missing) = filled.iter().position(|&f| !f) {
        return Err(Error::InvalidArgument(format!(
            "Row {missing} was never scored."
        )));
    }
    Ok(out)
}

/// Two-stage reduction for scores spanning several datasets.
///
/// Each dataset's score vector reduces to one scalar via `aggregator`, then
/// the per-dataset scalars reduce to their arithmetic mean. Both reductions
/// are order-independent.
pub fn aggregate_dataset_scores(per_dataset: &[DVector<f64>], aggregator: Aggregator) -> f64 {
    let sum: f64 = per_dataset.iter().map(|scores| aggregator(scores)).sum();
    sum / per_dataset.len() as f64
}
