//! The capability-polymorphic model interface.

use nalgebra::DVector;

use crate::distribution::{JointDistribution, MarginalDistribution};
use crate::error::Result;
use crate::params::ParameterStore;

/// Which prediction representations a model implements directly.
///
/// The joint representation is always available and has no flag. Composing
/// code uses this query to pick the cheapest path for a requested
/// representation; anything not implemented directly is derived from the
/// joint result, which is flagged with a warning because it is
/// asymptotically worse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PredictCaps {
    pub mean: bool,
    pub marginal: bool,
}

/// A regression model: named parameters plus fit/predict implementations.
///
/// `fit_impl` produces an opaque fit state; the `predict_*_impl` methods
/// compute a representation from that state and query features. Only the
/// joint prediction is required. The provided marginal/mean defaults extract
/// their result from the full joint computation and log the fallback; models
/// with a cheaper direct path override the method and advertise it in
/// [`Model::predict_caps`].
///
/// Cloning a model clones its parameters, never any fit state; fit state
/// lives in [`crate::model::Regressor`].
pub trait Model: Clone {
    type Feature: Clone;
    type FitState;

    /// Stable model name, used in equality checks and log messages.
    fn name(&self) -> &'static str;

    fn params(&self) -> &ParameterStore;

    fn params_mut(&mut self) -> &mut ParameterStore;

    fn fit_impl(
        &self,
        features: &[Self::Feature],
        targets: &MarginalDistribution,
    ) -> Result<Self::FitState>;

    fn predict_joint_impl(
        &self,
        fit: &Self::FitState,
        features: &[Self::Feature],
    ) -> Result<JointDistribution>;

    fn predict_marginal_impl(
        &self,
        fit: &Self::FitState,
        features: &[Self::Feature],
    ) -> Result<MarginalDistribution> {
        log::warn!(
            "{}: deriving a marginal prediction from the full joint computation",
            self.name()
        );
        Ok(self.predict_joint_impl(fit, features)?.marginal())
    }

    fn predict_mean_impl(
        &self,
        fit: &Self::FitState,
        features: &[Self::Feature],
    ) -> Result<DVector<f64>> {
        log::warn!(
            "{}: deriving a mean prediction from the full joint computation",
            self.name()
        );
        Ok(self.predict_joint_impl(fit, features)?.mean)
    }

    fn predict_caps(&self) -> PredictCaps {
        PredictCaps::default()
    }
}
