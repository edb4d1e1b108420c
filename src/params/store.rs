//! Named parameter storage.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::params::prior::Prior;

/// A named scalar parameter: current value plus prior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub value: f64,
    pub prior: Prior,
}

impl Parameter {
    pub fn new(value: f64, prior: Prior) -> Self {
        Self { value, prior }
    }

    /// A variance-like parameter constrained to `(0, +inf)`.
    pub fn positive(value: f64) -> Self {
        Self::new(value, Prior::Positive)
    }

    /// A parameter held constant during tuning.
    pub fn fixed(value: f64) -> Self {
        Self::new(value, Prior::Fixed)
    }

    pub fn is_valid(&self) -> bool {
        self.prior.is_valid(self.value)
    }
}

/// Ordered mapping from parameter name to [`Parameter`].
///
/// Iteration follows name order, which also defines the layout of the
/// tunable search vector handed to the optimizer: the i-th tunable name
/// always corresponds to the i-th search coordinate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterStore {
    params: BTreeMap<String, Parameter>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, param: Parameter) {
        self.params.insert(name.into(), param);
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.get(name)
    }

    /// Current value of a parameter, failing on unknown names.
    pub fn value(&self, name: &str) -> Result<f64> {
        self.params
            .get(name)
            .map(|p| p.value)
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown parameter `{name}`.")))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Parameter)> {
        self.params.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.params.keys()
    }

    /// Replace the named parameters with those from `other`.
    ///
    /// Every name in `other` must already exist here; the whole parameter
    /// (value and prior) is replaced. `set_params(&get_params())` is a no-op.
    pub fn set_params(&mut self, other: &ParameterStore) -> Result<()> {
        for (name, param) in other.iter() {
            self.replace(name, param.clone())?;
        }
        Ok(())
    }

    /// Set the value of an existing parameter, keeping its prior.
    pub fn set_param(&mut self, name: &str, value: f64) -> Result<()> {
        let param = self
            .params
            .get_mut(name)
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown parameter `{name}`.")))?;
        param.value = value;
        Ok(())
    }

    /// Replace an existing parameter wholesale (value and prior).
    pub fn replace(&mut self, name: &str, param: Parameter) -> Result<()> {
        let slot = self
            .params
            .get_mut(name)
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown parameter `{name}`.")))?;
        *slot = param;
        Ok(())
    }

    /// Attach a prior to an existing parameter, keeping its value.
    pub fn set_prior(&mut self, name: &str, prior: Prior) -> Result<()> {
        let param = self
            .params
            .get_mut(name)
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown parameter `{name}`.")))?;
        param.prior = prior;
        Ok(())
    }

    /// Whether every parameter lies inside its prior's support.
    pub fn params_are_valid(&self) -> bool {
        self.params.values().all(Parameter::is_valid)
    }

    /// Validity check that names the first offending parameter.
    pub fn check_params(&self) -> Result<()> {
        for (name, param) in self.iter() {
            if !param.is_valid() {
                return Err(Error::InvalidParameter {
                    name: name.clone(),
                    value: param.value,
                });
            }
        }
        Ok(())
    }

    /// Sum of prior log-likelihoods over all parameters.
    ///
    /// `Fixed` and `Positive` contribute zero, so the sum only moves when
    /// informative priors are attached.
    pub fn prior_log_likelihood(&self) -> f64 {
        self.params
            .values()
            .map(|p| p.prior.log_likelihood(p.value))
            .sum()
    }

    /// Names of the tunable parameters, in search-vector order.
    pub fn tunable_names(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|(_, p)| p.prior.is_tunable())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Current values of the tunable parameters, in search-vector order.
    pub fn tunable_values(&self) -> Vec<f64> {
        self.params
            .values()
            .filter(|p| p.prior.is_tunable())
            .map(|p| p.value)
            .collect()
    }

    /// Support bounds of the tunable parameters, in search-vector order.
    pub fn tunable_bounds(&self) -> Vec<(f64, f64)> {
        self.params
            .values()
            .filter(|p| p.prior.is_tunable())
            .map(|p| p.prior.bounds())
            .collect()
    }

    /// Write a search vector back into the tunable parameters.
    pub fn set_tunable_values(&mut self, values: &[f64]) -> Result<()> {
        let tunable = self
            .params
            .values_mut()
            .filter(|p| p.prior.is_tunable())
            .collect::<Vec<_>>();
        if tunable.len() != values.len() {
            return Err(Error::InvalidArgument(format!(
                "Search vector length ({}) != tunable parameter count ({}).",
                values.len(),
                tunable.len()
            )));
        }
        for (param, &value) in tunable.into_iter().zip(values) {
            param.value = value;
        }
        Ok(())
    }
}

impl fmt::Display for ParameterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, param) in self.iter() {
            writeln!(f, "{name}: {}", param.value)?;
        }
        Ok(())
    }
}
