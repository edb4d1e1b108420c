//! `gpfit`: model fitting, cross-validation, and hyperparameter tuning for
//! regression models.
//!
//! Three coupled pieces:
//!
//! - a capability-polymorphic model interface ([`model::Model`]) with an
//!   immutable fit state ([`model::Regressor`]) and lazily evaluated
//!   predictions ([`model::Prediction`])
//! - a fold-based cross-validation engine that partitions a dataset, fits
//!   and predicts per fold, and reassembles per-row scores in the original
//!   row order ([`crossval`])
//! - a tuner that treats a cross-validated metric as an objective over the
//!   tunable parameters, constrained by their priors and delegated to a
//!   derivative-free optimizer ([`tune`])
//!
//! Covariance functions, persistence formats, samplers, and configuration
//! loading live elsewhere; this crate only assumes that models expose their
//! parameters through [`params::ParameterStore`] and their predictions
//! through the mean/marginal/joint representations.

pub mod crossval;
pub mod dataset;
pub mod distribution;
pub mod error;
pub mod metrics;
pub mod model;
pub mod params;
pub mod tune;
