//! The model / fit / prediction triad.
//!
//! Responsibilities:
//!
//! - the capability-polymorphic [`Model`] interface (`traits`)
//! - fit-state management and the fit/predict lifecycle (`regressor`)
//! - lazily evaluated predictions with representation dispatch (`prediction`)
//! - the reference Bayesian linear model (`linear`)

pub mod linear;
pub mod prediction;
pub mod regressor;
pub mod traits;

pub use linear::*;
pub use prediction::*;
pub use regressor::*;
pub use traits::*;
