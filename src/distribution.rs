//! Predictive and target distributions.
//!
//! Two representations appear throughout the crate:
//!
//! - [`MarginalDistribution`]: per-point mean and variance, ignoring
//!   cross-covariance between points
//! - [`JointDistribution`]: full mean vector plus covariance matrix
//!
//! A joint distribution always reduces to its marginal (the covariance
//! diagonal becomes the variances); the reverse direction is lossy and not
//! provided.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Per-point means and variances (a diagonal-covariance distribution).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginalDistribution {
    pub mean: DVector<f64>,
    pub variance: DVector<f64>,
}

impl MarginalDistribution {
    pub fn new(mean: DVector<f64>, variance: DVector<f64>) -> Result<Self> {
        if mean.len() != variance.len() {
            return Err(Error::InvalidArgument(format!(
                "Mean length ({}) != variance length ({}).",
                mean.len(),
                variance.len()
            )));
        }
        Ok(Self { mean, variance })
    }

    /// Point estimates carrying no uncertainty (zero variance).
    pub fn from_mean(mean: DVector<f64>) -> Self {
        let variance = DVector::zeros(mean.len());
        Self { mean, variance }
    }

    pub fn size(&self) -> usize {
        self.mean.len()
    }

    /// Rows at `indices`, in that order.
    pub fn subset(&self, indices: &[usize]) -> Result<Self> {
        let n = self.size();
        let mut mean = DVector::zeros(indices.len());
        let mut variance = DVector::zeros(indices.len());
        for (row, &idx) in indices.iter().enumerate() {
            if idx >= n {
                return Err(Error::InvalidArgument(format!(
                    "Subset index {idx} out of range for distribution of size {n}."
                )));
            }
            mean[row] = self.mean[idx];
            variance[row] = self.variance[idx];
        }
        Ok(Self { mean, variance })
    }
}

/// Full mean vector plus dense covariance across all queried points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointDistribution {
    pub mean: DVector<f64>,
    pub covariance: DMatrix<f64>,
}

impl JointDistribution {
    pub fn new(mean: DVector<f64>, covariance: DMatrix<f64>) -> Result<Self> {
        if covariance.nrows() != covariance.ncols() {
            return Err(Error::InvalidArgument(format!(
                "Covariance must be square, got {}x{}.",
                covariance.nrows(),
                covariance.ncols()
            )));
        }
        if mean.len() != covariance.nrows() {
            return Err(Error::InvalidArgument(format!(
                "Mean length ({}) != covariance dimension ({}).",
                mean.len(),
                covariance.nrows()
            )));
        }
        Ok(Self { mean, covariance })
    }

    pub fn size(&self) -> usize {
        self.mean.len()
    }

    /// Per-point view: the same mean, variances from the covariance diagonal.
    pub fn marginal(&self) -> MarginalDistribution {
        MarginalDistribution {
            mean: self.mean.clone(),
            variance: self.covariance.diagonal(),
        }
    }
}
