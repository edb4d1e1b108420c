//! Prior distributions over scalar parameters.

use serde::{Deserialize, Serialize};

/// A prior over a parameter's plausible values.
///
/// Priors play two roles during tuning: they define the support a candidate
/// value must lie in, and they contribute a log-likelihood term to the
/// objective. `Fixed` removes the parameter from the search vector entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prior {
    /// Hold the parameter constant at its current value.
    Fixed,
    /// Uninformative prior over `(0, +inf)`.
    Positive,
    /// Uniform prior over `[low, high]`.
    Uniform { low: f64, high: f64 },
    /// Normal prior with the given mean and standard deviation.
    Gaussian { mean: f64, sigma: f64 },
}

impl Prior {
    /// Whether `x` lies inside this prior's support.
    pub fn is_valid(&self, x: f64) -> bool {
        if !x.is_finite() {
            return false;
        }
        match self {
            Prior::Fixed => true,
            Prior::Positive => x > 0.0,
            Prior::Uniform { low, high } => x >= *low && x <= *high,
            Prior::Gaussian { .. } => true,
        }
    }

    /// Log-likelihood of `x` under this prior.
    ///
    /// Values outside the support map to negative infinity. Uninformative
    /// priors contribute a constant zero so they never tilt the objective.
    pub fn log_likelihood(&self, x: f64) -> f64 {
        if !self.is_valid(x) {
            return f64::NEG_INFINITY;
        }
        match self {
            Prior::Fixed | Prior::Positive => 0.0,
            Prior::Uniform { low, high } => -(high - low).ln(),
            Prior::Gaussian { mean, sigma } => {
                let z = (x - mean) / sigma;
                -0.5 * z * z - sigma.ln() - 0.5 * (2.0 * std::f64::consts::PI).ln()
            }
        }
    }

    /// Bounds of the support, used to constrain the optimizer's search.
    ///
    /// The lower bound of `Positive` is the smallest positive normal so that
    /// clamping a point onto the bound still yields a valid value.
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            Prior::Fixed => (f64::NEG_INFINITY, f64::INFINITY),
            Prior::Positive => (f64::MIN_POSITIVE, f64::INFINITY),
            Prior::Uniform { low, high } => (*low, *high),
            Prior::Gaussian { .. } => (f64::NEG_INFINITY, f64::INFINITY),
        }
    }

    /// Whether the parameter participates in tuning.
    pub fn is_tunable(&self) -> bool {
        !matches!(self, Prior::Fixed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero_and_below() {
        assert!(!Prior::Positive.is_valid(0.0));
        assert!(!Prior::Positive.is_valid(-1.0));
        assert!(Prior::Positive.is_valid(1e-12));
        assert!(!Prior::Positive.is_valid(f64::NAN));
    }

    #[test]
    fn uniform_support_is_inclusive() {
        let prior = Prior::Uniform { low: 1.0, high: 3.0 };
        assert!(prior.is_valid(1.0));
        assert!(prior.is_valid(3.0));
        assert!(!prior.is_valid(3.0 + 1e-12));
        assert_eq!(prior.bounds(), (1.0, 3.0));
    }

    #[test]
    fn gaussian_log_likelihood_peaks_at_the_mean() {
        let prior = Prior::Gaussian { mean: 2.0, sigma: 0.5 };
        let at_mean = prior.log_likelihood(2.0);
        assert!(at_mean > prior.log_likelihood(2.5));
        assert!(at_mean > prior.log_likelihood(1.5));
    }

    #[test]
    fn out_of_support_log_likelihood_is_negative_infinity() {
        assert_eq!(Prior::Positive.log_likelihood(-1.0), f64::NEG_INFINITY);
        let prior = Prior::Uniform { low: 0.0, high: 1.0 };
        assert_eq!(prior.log_likelihood(2.0), f64::NEG_INFINITY);
    }

    #[test]
    fn only_fixed_is_non_tunable() {
        assert!(!Prior::Fixed.is_tunable());
        assert!(Prior::Positive.is_tunable());
        assert!(Prior::Uniform { low: 0.0, high: 1.0 }.is_tunable());
        assert!(Prior::Gaussian { mean: 0.0, sigma: 1.0 }.is_tunable());
    }

    #[test]
    fn clamping_onto_positive_bounds_stays_valid() {
        let (low, _) = Prior::Positive.bounds();
        assert!(Prior::Positive.is_valid(low));
    }
}
