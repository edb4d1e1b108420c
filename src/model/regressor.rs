//! Fit-state management for models.

use std::fmt;

use nalgebra::DVector;

use crate::crossval::CrossValidation;
use crate::dataset::Dataset;
use crate::distribution::MarginalDistribution;
use crate::error::{Error, Result};
use crate::model::prediction::Prediction;
use crate::model::traits::Model;
use crate::params::{Parameter, ParameterStore, Prior};

/// Pairs a model with its fit state.
///
/// The pairing is the sole handle used for prediction: `fit` produces the
/// state (replacing any previous one), `predict` requires it, and the state
/// is never mutated after being produced. The only state transition is
/// Unfit -> Fit.
pub struct Regressor<M: Model> {
    model: M,
    fit_state: Option<M::FitState>,
}

impl<M: Model> Regressor<M> {
    pub fn new(model: M) -> Self {
        Self { model, fit_state: None }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn has_been_fit(&self) -> bool {
        self.fit_state.is_some()
    }

    /// Fit the model, validating inputs first.
    ///
    /// Re-fitting replaces the previous fit state.
    pub fn fit(&mut self, features: &[M::Feature], targets: &MarginalDistribution) -> Result<()> {
        if features.is_empty() {
            return Err(Error::InvalidArgument(
                "Cannot fit on an empty feature set.".to_string(),
            ));
        }
        if features.len() != targets.size() {
            return Err(Error::InvalidArgument(format!(
                "Feature count ({}) != target count ({}).",
                features.len(),
                targets.size()
            )));
        }
        let state = self.model.fit_impl(features, targets)?;
        self.fit_state = Some(state);
        Ok(())
    }

    /// Convenience overload assuming zero target variance.
    pub fn fit_mean(&mut self, features: &[M::Feature], targets: &DVector<f64>) -> Result<()> {
        self.fit(features, &MarginalDistribution::from_mean(targets.clone()))
    }

    /// Convenience overload unpacking a dataset into features and targets.
    pub fn fit_dataset(&mut self, dataset: &Dataset<M::Feature>) -> Result<()> {
        self.fit(&dataset.features, &dataset.targets)
    }

    /// A lazy prediction for the given query features.
    ///
    /// Fails with `IllegalState` before fitting. Does not mutate the model.
    pub fn predict(&self, features: &[M::Feature]) -> Result<Prediction<'_, M>> {
        let Some(fit) = self.fit_state.as_ref() else {
            return Err(Error::IllegalState(
                "predict called before fit".to_string(),
            ));
        };
        Ok(Prediction::new(&self.model, fit, features.to_vec()))
    }

    /// Prediction for a single query feature.
    pub fn predict_one(&self, feature: &M::Feature) -> Result<Prediction<'_, M>> {
        self.predict(std::slice::from_ref(feature))
    }

    /// Functionally equivalent to `fit` followed by `predict`.
    pub fn fit_and_predict(
        &mut self,
        train_features: &[M::Feature],
        train_targets: &MarginalDistribution,
        test_features: &[M::Feature],
    ) -> Result<Prediction<'_, M>> {
        self.fit(train_features, train_targets)?;
        self.predict(test_features)
    }

    /// Equality on name, parameter values, and fitted flag.
    ///
    /// Refused once either side has been fit: fit state may carry
    /// model-specific internals with no generic comparison semantics.
    /// Models needing a working post-fit equality must compare their fit
    /// states themselves.
    pub fn try_eq(&self, other: &Regressor<M>) -> Result<bool> {
        if self.has_been_fit() || other.has_been_fit() {
            return Err(Error::IllegalState(
                "Cannot compare models once either side has been fit.".to_string(),
            ));
        }
        Ok(self.model.name() == other.model.name()
            && self.model.params() == other.model.params())
    }

    /// Cross-validated evaluation of this model's current parameters.
    pub fn cross_validate(&self) -> CrossValidation<'_, M> {
        CrossValidation::new(&self.model)
    }

    pub fn get_params(&self) -> ParameterStore {
        self.model.params().clone()
    }

    pub fn set_params(&mut self, params: &ParameterStore) -> Result<()> {
        self.model.params_mut().set_params(params)
    }

    pub fn set_param(&mut self, name: &str, value: f64) -> Result<()> {
        self.model.params_mut().set_param(name, value)
    }

    pub fn set_parameter(&mut self, name: &str, param: Parameter) -> Result<()> {
        self.model.params_mut().replace(name, param)
    }

    pub fn set_prior(&mut self, name: &str, prior: Prior) -> Result<()> {
        self.model.params_mut().set_prior(name, prior)
    }

    pub fn params_are_valid(&self) -> bool {
        self.model.params().params_are_valid()
    }

    pub fn prior_log_likelihood(&self) -> f64 {
        self.model.params().prior_log_likelihood()
    }
}

impl<M: Model> fmt::Display for Regressor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.model.name())?;
        write!(f, "{}", self.model.params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::make_toy_linear_data;
    use crate::model::linear::BayesLinear;

    #[test]
    fn fit_rejects_empty_and_mismatched_inputs() {
        let mut regressor = Regressor::new(BayesLinear::default());

        let empty: Vec<f64> = Vec::new();
        let err = regressor
            .fit(&empty, &MarginalDistribution::from_mean(DVector::zeros(0)))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = regressor
            .fit(&[1.0, 2.0], &MarginalDistribution::from_mean(DVector::zeros(3)))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(!regressor.has_been_fit());
    }

    #[test]
    fn predict_before_fit_is_an_illegal_state() {
        let regressor = Regressor::new(BayesLinear::default());
        let err = regressor.predict(&[1.0]).unwrap_err();
        assert!(matches!(err, Error::IllegalState(_)));
    }

    #[test]
    fn prediction_mean_has_one_entry_per_feature() {
        let dataset = make_toy_linear_data(2.0, 4.0, 0.2, 15, 3).unwrap();
        let mut regressor = Regressor::new(BayesLinear::default());
        regressor.fit_dataset(&dataset).unwrap();

        let mean = regressor.predict(&dataset.features).unwrap().mean().unwrap();
        assert_eq!(mean.len(), dataset.size());
    }

    #[test]
    fn fit_and_predict_matches_sequential_fit_then_predict() {
        let dataset = make_toy_linear_data(1.5, -2.0, 0.1, 12, 9).unwrap();
        let query = [0.0, 5.0, 10.0];

        let mut sequential = Regressor::new(BayesLinear::default());
        sequential.fit_dataset(&dataset).unwrap();
        let expected = sequential.predict(&query).unwrap().joint().unwrap();

        let mut combined = Regressor::new(BayesLinear::default());
        let got = combined
            .fit_and_predict(&dataset.features, &dataset.targets, &query)
            .unwrap()
            .joint()
            .unwrap();

        assert_eq!(got, expected);
    }

    #[test]
    fn refitting_replaces_the_fit_state() {
        let first = make_toy_linear_data(2.0, 0.0, 0.0, 10, 1).unwrap();
        let second = make_toy_linear_data(-3.0, 1.0, 0.0, 10, 2).unwrap();
        let query = [1.0, 2.0];

        let mut regressor = Regressor::new(BayesLinear::default());
        regressor.fit_dataset(&first).unwrap();
        let before = regressor.predict(&query).unwrap().mean().unwrap();

        regressor.fit_dataset(&second).unwrap();
        let after = regressor.predict(&query).unwrap().mean().unwrap();

        assert!((before - after).norm() > 1.0);
    }

    #[test]
    fn equality_checks_name_and_params_until_fit() {
        let a = Regressor::new(BayesLinear::new(0.1, 10.0));
        let b = Regressor::new(BayesLinear::new(0.1, 10.0));
        let c = Regressor::new(BayesLinear::new(0.2, 10.0));

        assert!(a.try_eq(&b).unwrap());
        assert!(!a.try_eq(&c).unwrap());
    }

    #[test]
    fn equality_is_refused_after_fitting() {
        let dataset = make_toy_linear_data(1.0, 0.0, 0.1, 8, 5).unwrap();
        let mut fitted = Regressor::new(BayesLinear::default());
        fitted.fit_dataset(&dataset).unwrap();

        let unfit = Regressor::new(BayesLinear::default());
        assert!(matches!(fitted.try_eq(&unfit), Err(Error::IllegalState(_))));
        assert!(matches!(unfit.try_eq(&fitted), Err(Error::IllegalState(_))));
    }

    #[test]
    fn set_params_of_own_params_leaves_predictions_unchanged() {
        let dataset = make_toy_linear_data(2.0, 4.0, 0.2, 10, 11).unwrap();
        let mut regressor = Regressor::new(BayesLinear::default());
        regressor.fit_dataset(&dataset).unwrap();

        let query = [1.0, 3.0, 7.0];
        let before = regressor.predict(&query).unwrap().joint().unwrap();
        let params = regressor.get_params();

        regressor.set_params(&params).unwrap();
        assert_eq!(regressor.get_params(), params);

        let after = regressor.predict(&query).unwrap().joint().unwrap();
        assert_eq!(before, after);
    }
}
