//! Named parameters and their priors.
//!
//! Models expose every hyperparameter through a [`ParameterStore`]; the
//! tuner works exclusively through this interface. Priors define the valid
//! support of each parameter and contribute a log-likelihood regularization
//! term to the tuning objective.

pub mod prior;
pub mod store;

pub use prior::*;
pub use store::*;
