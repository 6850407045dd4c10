//! Property-based tests for the genetic order search.
//!
//! A cheap synthetic fitter stands in for SARIMA so that many random
//! domains, seeds and population sizes can be explored quickly.

use proptest::prelude::*;
use sarima_evolve::core::{ForecastBands, TimeSeries};
use sarima_evolve::models::arima::EstimationMethod;
use sarima_evolve::search::{
    Bounds, CostFunction, CrossoverKind, FittedModel, GeneticOptimizer, GeneticParams,
    HyperparameterVector, ModelFitter, SearchConfig, SearchSpace, DIMENSIONS, SENTINEL_COST,
};
use sarima_evolve::{ForecastError, Result};
use std::sync::{Arc, Mutex};

/// Deterministic landscape: a weighted hash of the genes, with every vector
/// whose `p` is odd failing to fit.
#[derive(Clone)]
struct LandscapeFitter;

struct LandscapeModel(f64);

impl FittedModel for LandscapeModel {
    fn forecast(&self, horizon: usize) -> Result<ForecastBands> {
        Ok(ForecastBands::point_only(vec![self.0; horizon]))
    }

    fn bic(&self) -> Option<f64> {
        Some(self.0)
    }
}

impl ModelFitter for LandscapeFitter {
    type Model = LandscapeModel;

    fn fit(
        &self,
        _series: &TimeSeries,
        order: (usize, usize, usize),
        seasonal_order: (usize, usize, usize, usize),
        _method: EstimationMethod,
    ) -> Result<LandscapeModel> {
        if order.0 % 2 == 1 {
            return Err(ForecastError::ConvergenceFailure { iterations: 0 });
        }
        let genes = [
            order.0,
            order.1,
            order.2,
            seasonal_order.0,
            seasonal_order.1,
            seasonal_order.2,
        ];
        let cost = genes
            .iter()
            .enumerate()
            .map(|(i, g)| ((g * 7 + i * 3) % 11) as f64)
            .sum::<f64>();
        Ok(LandscapeModel(cost))
    }
}

/// [`LandscapeFitter`] that remembers every vector it was asked to fit.
#[derive(Clone, Default)]
struct RecordingFitter {
    seen: Arc<Mutex<Vec<HyperparameterVector>>>,
}

impl RecordingFitter {
    fn seen(&self) -> Vec<HyperparameterVector> {
        self.seen.lock().unwrap().clone()
    }
}

impl ModelFitter for RecordingFitter {
    type Model = LandscapeModel;

    fn fit(
        &self,
        series: &TimeSeries,
        order: (usize, usize, usize),
        seasonal_order: (usize, usize, usize, usize),
        method: EstimationMethod,
    ) -> Result<LandscapeModel> {
        let (p, d, q) = order;
        let (cap_p, cap_d, cap_q, _) = seasonal_order;
        self.seen
            .lock()
            .unwrap()
            .push(HyperparameterVector::new(p, d, q, cap_p, cap_d, cap_q));
        LandscapeFitter.fit(series, order, seasonal_order, method)
    }
}

fn series() -> (TimeSeries, TimeSeries) {
    let train = TimeSeries::monthly(2000, 1, vec![1.0; 36]).unwrap();
    let validation = TimeSeries::monthly(2003, 1, vec![1.0; 6]).unwrap();
    (train, validation)
}

/// Random search space where every dimension allows zero, so the landscape
/// always has a fittable point.
fn space_strategy() -> impl Strategy<Value = SearchSpace> {
    prop::collection::vec((0usize..3, 0usize..3), DIMENSIONS).prop_map(|pairs| {
        let mut bounds = [Bounds::new(0, 0); DIMENSIONS];
        for (i, (lower, width)) in pairs.into_iter().enumerate() {
            let lower = if i == 0 { 0 } else { lower };
            bounds[i] = Bounds::new(lower, lower + width);
        }
        SearchSpace::new(bounds)
    })
}

fn crossover_strategy() -> impl Strategy<Value = CrossoverKind> {
    prop_oneof![
        Just(CrossoverKind::Uniform),
        Just(CrossoverKind::OnePoint),
        Just(CrossoverKind::TwoPoint),
    ]
}

/// Every gene at its lower bound; `p` starts at zero, so this always fits.
fn lower_corner(space: &SearchSpace) -> HyperparameterVector {
    let mut genes = [0; DIMENSIONS];
    for (g, b) in genes.iter_mut().zip(space.bounds()) {
        *g = b.lower;
    }
    HyperparameterVector(genes)
}

fn config(
    space: SearchSpace,
    seed: u64,
    population: usize,
    generations: usize,
    crossover: CrossoverKind,
) -> SearchConfig {
    SearchConfig::default()
        .with_space(space)
        .with_start_vector(lower_corner(&space))
        .with_seed(seed)
        .with_population_size(population)
        .with_max_generations(generations)
        .with_cost_function(CostFunction::Bic)
        .with_workers(2)
        .with_genetic_params(GeneticParams {
            mutation_probability: 0.3,
            crossover,
            ..Default::default()
        })
}

// =============================================================================
// Property: every evaluated individual lies inside the search space
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn every_individual_is_within_bounds(
        space in space_strategy(),
        seed in any::<u64>(),
        population in 2usize..12,
        generations in 1usize..8,
        crossover in crossover_strategy(),
    ) {
        let (train, validation) = series();
        let fitter = RecordingFitter::default();
        let optimizer = GeneticOptimizer::with_fitter(
            config(space, seed, population, generations, crossover),
            fitter.clone(),
        );

        let report = optimizer.optimize(&train, &validation).unwrap();
        let seen = fitter.seen();

        prop_assert_eq!(seen.len(), report.evaluations);
        for vector in &seen {
            prop_assert!(space.contains(vector), "{} outside the space", vector);
        }
        prop_assert!(space.contains(&report.best_vector()));
        prop_assert!(report.best_cost() < SENTINEL_COST);
        prop_assert!(report.generations <= generations);
    }
}

// =============================================================================
// Property: best-ever cost is non-increasing across generations
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn best_cost_is_monotone(
        space in space_strategy(),
        seed in any::<u64>(),
        population in 2usize..12,
        generations in 2usize..10,
        crossover in crossover_strategy(),
    ) {
        let (train, validation) = series();
        let optimizer = GeneticOptimizer::with_fitter(
            config(space, seed, population, generations, crossover),
            LandscapeFitter,
        );

        let report = optimizer.optimize(&train, &validation).unwrap();
        for pair in report.history.windows(2) {
            prop_assert!(pair[1].best_cost <= pair[0].best_cost);
        }
        let last = report.history.last().unwrap();
        prop_assert_eq!(last.best_cost, report.best_cost());
    }
}

// =============================================================================
// Property: a fixed seed reproduces the whole run
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn runs_are_reproducible(
        space in space_strategy(),
        seed in any::<u64>(),
        workers in 1usize..5,
    ) {
        let (train, validation) = series();
        let run = |workers: usize| {
            GeneticOptimizer::with_fitter(
                config(space, seed, 8, 5, CrossoverKind::Uniform).with_workers(workers),
                LandscapeFitter,
            )
            .optimize(&train, &validation)
        };

        // Worker count changes scheduling, never results
        prop_assert_eq!(run(workers), run(1));
    }
}

// =============================================================================
// Property: the seeded start vector is never lost
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn result_is_no_worse_than_start_vector(
        seed in any::<u64>(),
        genes in prop::collection::vec(0usize..3, DIMENSIONS),
    ) {
        let mut genes: [usize; DIMENSIONS] = genes.try_into().unwrap();
        genes[0] = 0;
        let start = HyperparameterVector(genes);
        let (train, validation) = series();
        let start_cost = LandscapeFitter
            .fit(&train, start.order(), start.seasonal_order(12), EstimationMethod::MaximumLikelihood)
            .unwrap()
            .0;

        let report = GeneticOptimizer::with_fitter(
            config(SearchSpace::symmetric(2, 2), seed, 6, 4, CrossoverKind::OnePoint)
                .with_start_vector(start),
            LandscapeFitter,
        )
        .optimize(&train, &validation)
        .unwrap();

        prop_assert!(report.best_cost() <= start_cost);
    }
}
