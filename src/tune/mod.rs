//! Hyperparameter tuning over cross-validated objectives.
//!
//! Responsibilities:
//!
//! - turn (model, datasets, metric, aggregator) into a scalar objective over
//!   the model's tunable parameters
//! - map out-of-support candidates to a NaN sentinel so the search survives
//!   them
//! - delegate minimization to a derivative-free [`Optimizer`]

pub mod optimizer;

pub use optimizer::*;

use std::io::Write;

use crate::crossval::{CrossValidation, FoldStrategy, aggregate_dataset_scores};
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::metrics::{Aggregator, PredictionMetric};
use crate::model::Model;
use crate::params::ParameterStore;

/// Tunes a model's parameters by minimizing a cross-validated metric,
/// regularized by the parameters' priors.
///
/// The `optimizer` field is public so callers can configure the evaluation
/// budget (`tuner.optimizer.set_maxeval(n)`); the tuner forwards the
/// configured optimizer to the search unchanged.
///
/// The tuner owns a private model copy whose parameter store is mutated in
/// place on every objective evaluation; a single tuner must therefore not
/// run concurrent searches. The caller's model is never touched.
pub struct Tuner<M: Model, E, W, O = NelderMead> {
    model: M,
    datasets: Vec<Dataset<M::Feature>>,
    metric: E,
    aggregator: Aggregator,
    pub optimizer: O,
    sink: W,
}

/// Configured tuner over a single dataset with the default optimizer.
pub fn get_tuner<M, E, W>(
    model: M,
    metric: E,
    dataset: Dataset<M::Feature>,
    aggregator: Aggregator,
    sink: W,
) -> Result<Tuner<M, E, W>>
where
    M: Model,
{
    Tuner::new(model, metric, vec![dataset], aggregator, sink)
}

/// Configured tuner over several datasets with the default optimizer.
///
/// Every objective evaluation fits once per dataset, in exchange for one
/// parameter set that has to generalize across all of them.
pub fn get_tuner_multi<M, E, W>(
    model: M,
    metric: E,
    datasets: Vec<Dataset<M::Feature>>,
    aggregator: Aggregator,
    sink: W,
) -> Result<Tuner<M, E, W>>
where
    M: Model,
{
    Tuner::new(model, metric, datasets, aggregator, sink)
}

impl<M: Model, E, W> Tuner<M, E, W, NelderMead> {
    pub fn new(
        model: M,
        metric: E,
        datasets: Vec<Dataset<M::Feature>>,
        aggregator: Aggregator,
        sink: W,
    ) -> Result<Self> {
        Self::with_optimizer(model, metric, datasets, aggregator, NelderMead::default(), sink)
    }
}

impl<M: Model, E, W, O> Tuner<M, E, W, O> {
    pub fn with_optimizer(
        model: M,
        metric: E,
        datasets: Vec<Dataset<M::Feature>>,
        aggregator: Aggregator,
        optimizer: O,
        sink: W,
    ) -> Result<Self> {
        if datasets.is_empty() {
            return Err(Error::InvalidArgument(
                "At least one dataset is required for tuning.".to_string(),
            ));
        }
        for (i, dataset) in datasets.iter().enumerate() {
            if dataset.size() < 2 {
                return Err(Error::InvalidArgument(format!(
                    "Dataset {i} has {} rows; leave-one-out needs at least 2.",
                    dataset.size()
                )));
            }
        }
        if model.params().tunable_names().is_empty() {
            return Err(Error::InvalidArgument(
                "Model has no tunable parameters.".to_string(),
            ));
        }
        Ok(Self { model, datasets, metric, aggregator, optimizer, sink })
    }

    /// Run the search and return the best parameters found.
    ///
    /// The search is seeded from the model's current parameter values,
    /// clamped into the prior-derived bounds so a start that violates a
    /// newly attached prior is still recoverable. The best point is written
    /// into a freshly copied parameter store; on total failure to find any
    /// valid point the error is `OptimizationFailure`.
    pub fn tune(&mut self) -> Result<ParameterStore>
    where
        M: Send + Sync,
        M::Feature: Send + Sync,
        E: PredictionMetric + Sync,
        W: Write,
        O: Optimizer,
    {
        let Tuner { model, datasets, metric, aggregator, optimizer, sink } = self;
        let aggregator = *aggregator;

        let bounds = model.params().tunable_bounds();
        for &(low, high) in &bounds {
            if !(low <= high) {
                return Err(Error::InvalidArgument(format!(
                    "Parameter prior yields invalid bounds [{low}, {high}]."
                )));
            }
        }
        let mut start = model.params().tunable_values();
        for (value, &(low, high)) in start.iter_mut().zip(&bounds) {
            *value = value.clamp(low, high);
        }

        let mut iteration = 0usize;
        let mut objective = |v: &[f64]| -> f64 {
            let value = evaluate_candidate(model, datasets, metric, aggregator, v);
            iteration += 1;
            // Observational only; sink failures never affect the search.
            let _ = writeln!(sink, "{iteration}, {value}, {v:?}");
            value
        };

        let best = optimizer.minimize(&mut objective, &start, &bounds)?;

        let mut params = model.params().clone();
        params.set_tunable_values(&best)?;
        if !params.params_are_valid() {
            return Err(Error::OptimizationFailure(
                "Best point lies outside the prior support.".to_string(),
            ));
        }
        Ok(params)
    }
}

/// One objective evaluation: cross-validated loss plus negative log-prior.
///
/// Any out-of-support parameter, and any numerical failure triggered by an
/// extreme candidate, yields NaN: a rejection the optimizer searches past,
/// never an abort.
fn evaluate_candidate<M, E>(
    model: &mut M,
    datasets: &[Dataset<M::Feature>],
    metric: &E,
    aggregator: Aggregator,
    v: &[f64],
) -> f64
where
    M: Model + Send + Sync,
    M::Feature: Send + Sync,
    E: PredictionMetric + Sync,
{
    if model.params_mut().set_tunable_values(v).is_err() {
        return f64::NAN;
    }
    if !model.params().params_are_valid() {
        return f64::NAN;
    }

    let mut per_dataset = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        match CrossValidation::new(model).scores(metric, dataset, &FoldStrategy::LeaveOneOut) {
            Ok(scores) => per_dataset.push(scores),
            Err(_) => return f64::NAN,
        }
    }

    let loss = aggregate_dataset_scores(&per_dataset, aggregator);
    loss - model.params().prior_log_likelihood()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::make_toy_linear_data;
    use crate::metrics::{NegativeLogLikelihood, mean_aggregator};
    use crate::model::{BayesLinear, NOISE_VARIANCE, Regressor, WEIGHT_VARIANCE};
    use crate::params::{Parameter, Prior};

    #[test]
    fn tuning_improves_the_cross_validated_score() {
        let dataset = make_toy_linear_data(2.0, 4.0, 0.2, 12, 41).unwrap();
        // Deliberately mis-set: huge noise, crushing shrinkage.
        let model = BayesLinear::new(5.0, 0.01);
        let mut regressor = Regressor::new(model.clone());

        let before = regressor
            .cross_validate()
            .scores(&NegativeLogLikelihood, &dataset, &FoldStrategy::LeaveOneOut)
            .unwrap();

        let mut tuner =
            get_tuner(model, NegativeLogLikelihood, dataset.clone(), mean_aggregator, std::io::sink())
                .unwrap();
        tuner.optimizer.set_maxeval(200);
        let params = tuner.tune().unwrap();

        regressor.set_params(&params).unwrap();
        let after = regressor
            .cross_validate()
            .scores(&NegativeLogLikelihood, &dataset, &FoldStrategy::LeaveOneOut)
            .unwrap();

        assert!(after.mean() < before.mean());
    }

    #[test]
    fn tuning_recovers_when_current_params_violate_a_new_prior() {
        let dataset = make_toy_linear_data(2.0, 4.0, 0.2, 10, 43).unwrap();
        let mut model = BayesLinear::new(5.0, 50.0);
        model
            .params_mut()
            .set_prior(NOISE_VARIANCE, Prior::Uniform { low: 0.01, high: 1.0 })
            .unwrap();
        assert!(!model.params().params_are_valid());

        let mut tuner =
            get_tuner(model, NegativeLogLikelihood, dataset, mean_aggregator, std::io::sink()).unwrap();
        tuner.optimizer.set_maxeval(100);
        let params = tuner.tune().unwrap();

        assert!(params.params_are_valid());
        let noise = params.value(NOISE_VARIANCE).unwrap();
        assert!((0.01..=1.0).contains(&noise));
    }

    #[test]
    fn search_survives_near_degenerate_starts() {
        let dataset = make_toy_linear_data(2.0, 4.0, 0.2, 10, 47).unwrap();
        let mut model = BayesLinear::default();
        for name in [NOISE_VARIANCE, WEIGHT_VARIANCE] {
            model
                .params_mut()
                .replace(name, Parameter::positive(1e-8))
                .unwrap();
        }

        let mut tuner =
            get_tuner(model, NegativeLogLikelihood, dataset, mean_aggregator, std::io::sink()).unwrap();
        tuner.optimizer.set_maxeval(100);
        let params = tuner.tune().unwrap();
        assert!(params.params_are_valid());
    }

    #[test]
    fn informative_priors_pull_the_solution() {
        let dataset = make_toy_linear_data(2.0, 4.0, 0.2, 10, 53).unwrap();
        let base = BayesLinear::new(0.1, 10.0);

        let mut plain = get_tuner(
            base.clone(),
            NegativeLogLikelihood,
            dataset.clone(),
            mean_aggregator,
            std::io::sink(),
        )
        .unwrap();
        plain.optimizer.set_maxeval(150);
        let params_no_prior = plain.tune().unwrap();

        // A tight prior centered away from the current value; the other
        // parameter is held fixed.
        let mut with_priors = base.clone();
        with_priors
            .params_mut()
            .set_prior(NOISE_VARIANCE, Prior::Gaussian { mean: 0.2, sigma: 0.001 })
            .unwrap();
        with_priors
            .params_mut()
            .set_prior(WEIGHT_VARIANCE, Prior::Fixed)
            .unwrap();
        assert_eq!(with_priors.params().tunable_names(), vec![NOISE_VARIANCE]);

        let mut tuner = get_tuner(
            with_priors.clone(),
            NegativeLogLikelihood,
            dataset,
            mean_aggregator,
            std::io::sink(),
        )
        .unwrap();
        tuner.optimizer.set_maxeval(300);
        let params = tuner.tune().unwrap();

        // Evaluate both solutions under the same priors.
        let mut reference = Regressor::new(with_priors);
        reference.set_params(&params).unwrap();
        let ll_with_prior = reference.prior_log_likelihood();

        for (name, param) in params_no_prior.iter() {
            reference.set_param(name, param.value).unwrap();
        }
        assert!(ll_with_prior > reference.prior_log_likelihood());
    }

    #[test]
    fn joint_tuning_over_two_datasets_completes() {
        let one = make_toy_linear_data(2.0, 4.0, 0.2, 10, 59).unwrap();
        let another = make_toy_linear_data(1.0, 5.0, 0.1, 10, 61).unwrap();

        let mut sink = Vec::new();
        let mut tuner = get_tuner_multi(
            BayesLinear::default(),
            NegativeLogLikelihood,
            vec![one, another],
            mean_aggregator,
            &mut sink,
        )
        .unwrap();
        tuner.optimizer.set_maxeval(100);
        let params = tuner.tune().unwrap();

        // One shared parameter set for both datasets.
        assert!(params.params_are_valid());
        assert_eq!(params.tunable_values().len(), 2);

        drop(tuner);
        let text = String::from_utf8(sink).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(!lines.is_empty());
        assert!(lines[0].starts_with("1, "));
        // Candidates are clamped into the positive support, so the search
        // never even produces an undefined objective here.
        assert!(!text.contains("NaN"));
    }

    #[test]
    fn progress_lines_count_the_evaluations() {
        let dataset = make_toy_linear_data(1.0, 2.0, 0.1, 8, 67).unwrap();
        let mut sink = Vec::new();
        let mut tuner = get_tuner(
            BayesLinear::default(),
            NegativeLogLikelihood,
            dataset,
            mean_aggregator,
            &mut sink,
        )
        .unwrap();
        tuner.optimizer.set_maxeval(25);
        tuner.tune().unwrap();

        drop(tuner);
        let text = String::from_utf8(sink).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines.len() <= 25);
        for (i, line) in lines.iter().enumerate() {
            assert!(line.starts_with(&format!("{}, ", i + 1)));
        }
    }

    #[test]
    fn misconfigured_tuners_are_rejected() {
        let dataset = make_toy_linear_data(1.0, 2.0, 0.1, 8, 71).unwrap();

        let empty: Vec<Dataset<f64>> = Vec::new();
        assert!(
            get_tuner_multi(
                BayesLinear::default(),
                NegativeLogLikelihood,
                empty,
                mean_aggregator,
                std::io::sink()
            )
            .is_err()
        );

        let tiny = make_toy_linear_data(1.0, 2.0, 0.1, 1, 73).unwrap();
        assert!(
            get_tuner(
                BayesLinear::default(),
                NegativeLogLikelihood,
                tiny,
                mean_aggregator,
                std::io::sink()
            )
            .is_err()
        );

        let mut all_fixed = BayesLinear::default();
        for name in [NOISE_VARIANCE, WEIGHT_VARIANCE] {
            all_fixed.params_mut().set_prior(name, Prior::Fixed).unwrap();
        }
        assert!(
            get_tuner(
                all_fixed,
                NegativeLogLikelihood,
                dataset,
                mean_aggregator,
                std::io::sink()
            )
            .is_err()
        );
    }
}
