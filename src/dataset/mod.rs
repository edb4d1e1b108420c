//! Regression datasets.
//!
//! A [`Dataset`] pairs an ordered feature sequence with a target
//! distribution and a free-form metadata map. Feature types are opaque to
//! this crate; concrete models decide how to interpret them.

pub mod synthetic;

pub use synthetic::*;

use std::collections::BTreeMap;

use nalgebra::DVector;

use crate::distribution::MarginalDistribution;
use crate::error::{Error, Result};

/// An ordered collection of features regressed to scalar targets.
///
/// Invariant: the feature count equals the target count.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<F> {
    pub features: Vec<F>,
    pub targets: MarginalDistribution,
    pub metadata: BTreeMap<String, String>,
}

impl<F: Clone> Dataset<F> {
    pub fn new(features: Vec<F>, targets: MarginalDistribution) -> Result<Self> {
        if features.len() != targets.size() {
            return Err(Error::InvalidArgument(format!(
                "Feature count ({}) != target count ({}).",
                features.len(),
                targets.size()
            )));
        }
        Ok(Self {
            features,
            targets,
            metadata: BTreeMap::new(),
        })
    }

    /// Convenience constructor for targets with zero variance.
    pub fn from_mean(features: Vec<F>, targets: DVector<f64>) -> Result<Self> {
        Self::new(features, MarginalDistribution::from_mean(targets))
    }

    pub fn size(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Rows at `indices`, in that order. Metadata is carried over unchanged.
    pub fn subset(&self, indices: &[usize]) -> Result<Self> {
        let mut features = Vec::with_capacity(indices.len());
        for &idx in indices {
            let feature = self.features.get(idx).ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "Subset index {idx} out of range for dataset of size {}.",
                    self.size()
                ))
            })?;
            features.push(feature.clone());
        }
        let targets = self.targets.subset(indices)?;
        Ok(Self {
            features,
            targets,
            metadata: self.metadata.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_size_mismatch() {
        let targets = MarginalDistribution::from_mean(DVector::from_row_slice(&[1.0, 2.0]));
        assert!(Dataset::new(vec![0.5], targets).is_err());
    }

    #[test]
    fn subset_selects_rows_in_order() {
        let dataset = Dataset::from_mean(
            vec![10.0, 11.0, 12.0, 13.0],
            DVector::from_row_slice(&[0.0, 1.0, 2.0, 3.0]),
        )
        .unwrap();

        let sub = dataset.subset(&[3, 1]).unwrap();
        assert_eq!(sub.features, vec![13.0, 11.0]);
        assert_eq!(sub.targets.mean, DVector::from_row_slice(&[3.0, 1.0]));
    }

    #[test]
    fn metadata_survives_subsetting() {
        let mut dataset =
            Dataset::from_mean(vec![1.0, 2.0], DVector::from_row_slice(&[1.0, 2.0])).unwrap();
        dataset
            .metadata
            .insert("source".to_string(), "unit-test".to_string());

        let sub = dataset.subset(&[0]).unwrap();
        assert_eq!(sub.metadata.get("source").map(String::as_str), Some("unit-test"));
    }
}
