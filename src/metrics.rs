//! Metrics mapping predictions and held-out targets to per-row scores.

use nalgebra::DVector;

use crate::distribution::MarginalDistribution;
use crate::error::{Error, Result};
use crate::model::PredictView;

/// Scores a prediction against held-out targets, one score per row.
///
/// The associated `View` names the prediction representation the metric
/// consumes; cross-validation extracts exactly that representation, so a
/// mean-only metric never pays for a covariance computation.
pub trait PredictionMetric {
    type View: PredictView;

    fn score(
        &self,
        prediction: &Self::View,
        targets: &MarginalDistribution,
    ) -> Result<DVector<f64>>;
}

/// Per-row Gaussian negative log-likelihood of the held-out targets under
/// the predictive marginal distribution.
///
/// Held-out target variance adds to the predictive variance, so noisy
/// observations are scored against a correspondingly wider distribution.
#[derive(Debug, Clone, Copy, Default)]
pub struct NegativeLogLikelihood;

impl PredictionMetric for NegativeLogLikelihood {
    type View = MarginalDistribution;

    fn score(
        &self,
        prediction: &MarginalDistribution,
        targets: &MarginalDistribution,
    ) -> Result<DVector<f64>> {
        check_sizes(prediction.size(), targets.size())?;
        let n = targets.size();
        let mut out = DVector::zeros(n);
        for i in 0..n {
            let variance = prediction.variance[i] + targets.variance[i];
            if !(variance.is_finite() && variance > 0.0) {
                return Err(Error::InvalidArgument(format!(
                    "Non-positive predictive variance at row {i}."
                )));
            }
            let residual = targets.mean[i] - prediction.mean[i];
            out[i] = 0.5
                * ((2.0 * std::f64::consts::PI * variance).ln() + residual * residual / variance);
        }
        Ok(out)
    }
}

/// Per-row squared error of the predictive mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredError;

impl PredictionMetric for SquaredError {
    type View = DVector<f64>;

    fn score(
        &self,
        prediction: &DVector<f64>,
        targets: &MarginalDistribution,
    ) -> Result<DVector<f64>> {
        check_sizes(prediction.len(), targets.size())?;
        let mut out = DVector::zeros(targets.size());
        for i in 0..targets.size() {
            let residual = targets.mean[i] - prediction[i];
            out[i] = residual * residual;
        }
        Ok(out)
    }
}

fn check_sizes(prediction: usize, targets: usize) -> Result<()> {
    if prediction != targets {
        return Err(Error::InvalidArgument(format!(
            "Prediction size ({prediction}) != held-out target size ({targets})."
        )));
    }
    Ok(())
}

/// Reduces a per-row score vector to one scalar.
pub type Aggregator = fn(&DVector<f64>) -> f64;

/// Arithmetic-mean reduction, the default aggregation policy.
pub fn mean_aggregator(scores: &DVector<f64>) -> f64 {
    scores.mean()
}
