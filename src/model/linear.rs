//! Bayesian linear regression on scalar features.
//!
//! The crate's reference model. It implements all three prediction
//! representations directly, so composing code always has a cheap path, and
//! its closed-form weight posterior keeps fitting exact:
//!
//! - fit: `Sigma = (X^T W X + I / weight_variance)^-1`, `mu = Sigma X^T W y`
//! - predict: mean `X* mu`, covariance `X* Sigma X*^T + noise_variance I`
//!
//! where `W` weights each row by the inverse of (model noise + target
//! variance).

use nalgebra::{Cholesky, DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::distribution::{JointDistribution, MarginalDistribution};
use crate::error::{Error, Result};
use crate::model::traits::{Model, PredictCaps};
use crate::params::{Parameter, ParameterStore};

pub const NOISE_VARIANCE: &str = "noise_variance";
pub const WEIGHT_VARIANCE: &str = "weight_variance";

/// Number of weights: intercept plus slope.
const WEIGHT_LEN: usize = 2;

/// Fill a design row for a scalar feature: constant term first.
fn design_row(x: f64, out: &mut [f64]) {
    out[0] = 1.0;
    out[1] = x;
}

fn design_matrix(features: &[f64]) -> DMatrix<f64> {
    let mut m = DMatrix::zeros(features.len(), WEIGHT_LEN);
    let mut row = [0.0; WEIGHT_LEN];
    for (i, &x) in features.iter().enumerate() {
        design_row(x, &mut row);
        for (j, &v) in row.iter().enumerate() {
            m[(i, j)] = v;
        }
    }
    m
}

/// Linear model `y = w0 + w1 * x` with a Gaussian prior over the weights.
///
/// Parameters:
///
/// - `noise_variance`: observation noise, added to every predictive variance
/// - `weight_variance`: prior variance of the weights (larger = weaker
///   shrinkage toward zero)
#[derive(Debug, Clone)]
pub struct BayesLinear {
    params: ParameterStore,
}

impl BayesLinear {
    pub fn new(noise_variance: f64, weight_variance: f64) -> Self {
        let mut params = ParameterStore::new();
        params.insert(NOISE_VARIANCE, Parameter::positive(noise_variance));
        params.insert(WEIGHT_VARIANCE, Parameter::positive(weight_variance));
        Self { params }
    }

    fn noise_variance(&self) -> Result<f64> {
        let value = self.params.value(NOISE_VARIANCE)?;
        if !(value.is_finite() && value > 0.0) {
            return Err(Error::InvalidParameter {
                name: NOISE_VARIANCE.to_string(),
                value,
            });
        }
        Ok(value)
    }

    fn weight_variance(&self) -> Result<f64> {
        let value = self.params.value(WEIGHT_VARIANCE)?;
        if !(value.is_finite() && value > 0.0) {
            return Err(Error::InvalidParameter {
                name: WEIGHT_VARIANCE.to_string(),
                value,
            });
        }
        Ok(value)
    }
}

impl Default for BayesLinear {
    fn default() -> Self {
        Self::new(0.1, 10.0)
    }
}

/// Weight posterior produced by fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BayesLinearFit {
    /// Posterior mean of `[w0, w1]`.
    pub weight_mean: DVector<f64>,
    /// Posterior covariance of the weights.
    pub weight_cov: DMatrix<f64>,
}

impl Model for BayesLinear {
    type Feature = f64;
    type FitState = BayesLinearFit;

    fn name(&self) -> &'static str {
        "bayes_linear"
    }

    fn params(&self) -> &ParameterStore {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParameterStore {
        &mut self.params
    }

    fn fit_impl(
        &self,
        features: &[f64],
        targets: &MarginalDistribution,
    ) -> Result<BayesLinearFit> {
        let noise = self.noise_variance()?;
        let weight = self.weight_variance()?;

        if features.iter().any(|x| !x.is_finite()) {
            return Err(Error::InvalidArgument(
                "Non-finite feature in training data.".to_string(),
            ));
        }

        // Precision form of the posterior: A = X^T W X + I / weight_variance.
        let mut a = DMatrix::<f64>::identity(WEIGHT_LEN, WEIGHT_LEN) / weight;
        let mut b = DVector::<f64>::zeros(WEIGHT_LEN);
        let mut row = [0.0; WEIGHT_LEN];
        for (i, &x) in features.iter().enumerate() {
            design_row(x, &mut row);
            let xi = DVector::from_row_slice(&row);
            let s = noise + targets.variance[i];
            a += &xi * xi.transpose() / s;
            b += xi * (targets.mean[i] / s);
        }

        let chol = Cholesky::new(a).ok_or_else(|| {
            Error::InvalidArgument("Weight precision matrix is not positive definite.".to_string())
        })?;
        let weight_mean = chol.solve(&b);
        let weight_cov = chol.inverse();

        Ok(BayesLinearFit { weight_mean, weight_cov })
    }

    fn predict_joint_impl(
        &self,
        fit: &BayesLinearFit,
        features: &[f64],
    ) -> Result<JointDistribution> {
        let noise = self.noise_variance()?;
        let x = design_matrix(features);
        let mean = &x * &fit.weight_mean;
        let mut covariance = &x * &fit.weight_cov * x.transpose();
        for i in 0..features.len() {
            covariance[(i, i)] += noise;
        }
        JointDistribution::new(mean, covariance)
    }

    fn predict_marginal_impl(
        &self,
        fit: &BayesLinearFit,
        features: &[f64],
    ) -> Result<MarginalDistribution> {
        let noise = self.noise_variance()?;
        let mut mean = DVector::zeros(features.len());
        let mut variance = DVector::zeros(features.len());
        let mut row = [0.0; WEIGHT_LEN];
        for (i, &x) in features.iter().enumerate() {
            design_row(x, &mut row);
            let xi = DVector::from_row_slice(&row);
            mean[i] = xi.dot(&fit.weight_mean);
            variance[i] = (&fit.weight_cov * &xi).dot(&xi) + noise;
        }
        MarginalDistribution::new(mean, variance)
    }

    fn predict_mean_impl(&self, fit: &BayesLinearFit, features: &[f64]) -> Result<DVector<f64>> {
        Ok(&design_matrix(features) * &fit.weight_mean)
    }

    fn predict_caps(&self) -> PredictCaps {
        PredictCaps { mean: true, marginal: true }
    }
}
