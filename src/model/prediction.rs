//! Lazily evaluated predictions.

use nalgebra::DVector;

use crate::distribution::{JointDistribution, MarginalDistribution};
use crate::error::{Error, Result};
use crate::model::traits::Model;

/// A deferred prediction bound to a model, its fit state, and query
/// features.
///
/// Nothing is computed until a view is requested. Each view uses the
/// cheapest representation the model implements per
/// [`Model::predict_caps`]; missing representations are derived from the
/// joint result (the model's default impls flag that fallback).
#[derive(Debug)]
pub struct Prediction<'a, M: Model> {
    model: &'a M,
    fit: &'a M::FitState,
    features: Vec<M::Feature>,
}

impl<'a, M: Model> Prediction<'a, M> {
    pub(crate) fn new(model: &'a M, fit: &'a M::FitState, features: Vec<M::Feature>) -> Self {
        Self { model, fit, features }
    }

    pub fn size(&self) -> usize {
        self.features.len()
    }

    /// Predictive mean, one entry per query feature.
    pub fn mean(&self) -> Result<DVector<f64>> {
        let caps = self.model.predict_caps();
        let mean = if caps.mean {
            self.model.predict_mean_impl(self.fit, &self.features)?
        } else if caps.marginal {
            self.model.predict_marginal_impl(self.fit, &self.features)?.mean
        } else {
            self.model.predict_mean_impl(self.fit, &self.features)?
        };
        self.check_size(mean.len())?;
        Ok(mean)
    }

    /// Per-point predictive distribution.
    pub fn marginal(&self) -> Result<MarginalDistribution> {
        let marginal = self.model.predict_marginal_impl(self.fit, &self.features)?;
        self.check_size(marginal.size())?;
        Ok(marginal)
    }

    /// Full predictive distribution across all query features.
    pub fn joint(&self) -> Result<JointDistribution> {
        let joint = self.model.predict_joint_impl(self.fit, &self.features)?;
        self.check_size(joint.size())?;
        Ok(joint)
    }

    /// Extract a specific representation, e.g. `get::<JointDistribution>()`.
    pub fn get<V: PredictView>(&self) -> Result<V> {
        V::from_prediction(self)
    }

    fn check_size(&self, got: usize) -> Result<()> {
        if got != self.features.len() {
            return Err(Error::IllegalState(format!(
                "{}: prediction has size {got} for {} query features.",
                self.model.name(),
                self.features.len()
            )));
        }
        Ok(())
    }
}

/// A prediction representation extractable from a [`Prediction`].
///
/// Implemented for the mean vector, the marginal distribution, and the
/// joint distribution; generic code (metrics, cross-validation) names the
/// representation it needs through this trait.
pub trait PredictView: Sized {
    fn from_prediction<M: Model>(prediction: &Prediction<'_, M>) -> Result<Self>;
}

impl PredictView for DVector<f64> {
    fn from_prediction<M: Model>(prediction: &Prediction<'_, M>) -> Result<Self> {
        prediction.mean()
    }
}

impl PredictView for MarginalDistribution {
    fn from_prediction<M: Model>(prediction: &Prediction<'_, M>) -> Result<Self> {
        prediction.marginal()
    }
}

impl PredictView for JointDistribution {
    fn from_prediction<M: Model>(prediction: &Prediction<'_, M>) -> Result<Self> {
        prediction.joint()
    }
}
