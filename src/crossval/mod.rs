//! Cross-validation.
//!
//! Responsibilities:
//!
//! - partition a dataset into named train/test folds (`folds`)
//! - fit and predict per fold, score per row, and reassemble the scores in
//!   the dataset's original order (`scores`)

pub mod folds;
pub mod scores;

pub use folds::*;
pub use scores::*;
