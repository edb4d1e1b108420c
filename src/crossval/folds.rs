//! Dataset partitioning into named folds.

use std::collections::BTreeMap;

use crate::dataset::Dataset;
use crate::error::{Error, Result};

pub type FoldName = String;

/// Ordered mapping from fold name to the row indices of that group.
///
/// Invariant: across all groups, every row index in `{0..n-1}` appears in
/// exactly one group, and no group is empty. The same indexer that builds
/// the folds is later used to scatter per-group results back into
/// full-length, originally ordered vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupIndexer {
    groups: BTreeMap<FoldName, Vec<usize>>,
    size: usize,
}

impl GroupIndexer {
    /// One group per row: the leave-one-out partitioning.
    pub fn leave_one_out(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidArgument(
                "Cannot partition an empty dataset.".to_string(),
            ));
        }
        let groups = (0..n).map(|i| (i.to_string(), vec![i])).collect();
        Ok(Self { groups, size: n })
    }

    /// One group per distinct key: leave-one-group-out. `keys[i]` names the
    /// group row `i` belongs to.
    pub fn from_keys(keys: &[String]) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::InvalidArgument(
                "Cannot partition an empty dataset.".to_string(),
            ));
        }
        let mut groups: BTreeMap<FoldName, Vec<usize>> = BTreeMap::new();
        for (i, key) in keys.iter().enumerate() {
            groups.entry(key.clone()).or_default().push(i);
        }
        Ok(Self { groups, size: keys.len() })
    }

    /// Validate an externally built grouping against the partition
    /// invariant: unique keys (guaranteed by the map), non-empty groups, and
    /// indices covering `{0..n-1}` exactly once.
    pub fn from_groups(groups: BTreeMap<FoldName, Vec<usize>>) -> Result<Self> {
        let size: usize = groups.values().map(Vec::len).sum();
        if size == 0 {
            return Err(Error::InvalidArgument(
                "Cannot partition an empty dataset.".to_string(),
            ));
        }
        let mut seen = vec![false; size];
        for (name, indices) in &groups {
            if indices.is_empty() {
                return Err(Error::InvalidArgument(format!("Group `{name}` is empty.")));
            }
            for &idx in indices {
                if idx >= size {
                    return Err(Error::InvalidArgument(format!(
                        "Group `{name}` holds index {idx}, outside 0..{size}."
                    )));
                }
                if seen[idx] {
                    return Err(Error::InvalidArgument(format!(
                        "Row {idx} appears in more than one group."
                    )));
                }
                seen[idx] = true;
            }
        }
        Ok(Self { groups, size })
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of rows across all groups.
    pub fn dataset_size(&self) -> usize {
        self.size
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FoldName, &Vec<usize>)> {
        self.groups.iter()
    }

    pub fn indices(&self, name: &str) -> Option<&[usize]> {
        self.groups.get(name).map(Vec::as_slice)
    }
}

/// How to group rows into folds.
#[derive(Debug, Clone)]
pub enum FoldStrategy<'a> {
    /// One fold per row.
    LeaveOneOut,
    /// One fold per distinct key; `keys[i]` is the group of row `i`.
    LeaveOneGroupOut(&'a [String]),
}

impl FoldStrategy<'_> {
    /// Build the indexer for a dataset of `n` rows.
    pub fn indexer(&self, n: usize) -> Result<GroupIndexer> {
        match self {
            FoldStrategy::LeaveOneOut => GroupIndexer::leave_one_out(n),
            FoldStrategy::LeaveOneGroupOut(keys) => {
                if keys.len() != n {
                    return Err(Error::InvalidArgument(format!(
                        "Group key count ({}) != dataset size ({n}).",
                        keys.len()
                    )));
                }
                GroupIndexer::from_keys(keys)
            }
        }
    }
}

/// One train/test split used for one round of cross-validation.
#[derive(Debug, Clone)]
pub struct Fold<F> {
    pub name: FoldName,
    /// All rows not in the group.
    pub train: Dataset<F>,
    /// The group's rows.
    pub test: Dataset<F>,
    /// Original positions of the test rows in the source dataset.
    pub test_indices: Vec<usize>,
}

/// Build the folds described by `indexer` over `dataset`.
pub fn folds_from_indexer<F: Clone>(
    dataset: &Dataset<F>,
    indexer: &GroupIndexer,
) -> Result<Vec<Fold<F>>> {
    if indexer.dataset_size() != dataset.size() {
        return Err(Error::InvalidArgument(format!(
            "Indexer covers {} rows but the dataset has {}.",
            indexer.dataset_size(),
            dataset.size()
        )));
    }

    let mut folds = Vec::with_capacity(indexer.len());
    for (name, test_indices) in indexer.iter() {
        let mut in_test = vec![false; dataset.size()];
        for &idx in test_indices {
            in_test[idx] = true;
        }
        let train_indices: Vec<usize> =
            (0..dataset.size()).filter(|&i| !in_test[i]).collect();
        if train_indices.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "Group `{name}` covers the entire dataset; nothing left to train on."
            )));
        }

        folds.push(Fold {
            name: name.clone(),
            train: dataset.subset(&train_indices)?,
            test: dataset.subset(test_indices)?,
            test_indices: test_indices.clone(),
        });
    }
    Ok(folds)
}
