//! Genetic search over SARIMA orders.

use crate::core::{ForecastBands, TimeSeries};
use crate::error::{SearchError, SearchResult};
use crate::search::config::{CrossoverKind, SearchConfig};
use crate::search::cost::{is_sentinel, CostFunction};
use crate::search::fitter::{refit_and_forecast, ModelFitter, SarimaFitter};
use crate::search::pool::{EvaluationContext, EvaluationPool};
use crate::search::space::{Candidate, HyperparameterVector, DIMENSIONS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;
use tracing::{debug, info};

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The hard generation limit was reached.
    GenerationLimit,
    /// The best cost did not improve for the configured patience.
    NoImprovement,
}

/// Summary of one evaluated generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStats {
    /// 1-based generation index; the initial population is generation 1.
    pub generation: usize,
    /// Best cost seen so far in the run.
    pub best_cost: f64,
    /// Best cost within this generation.
    pub generation_best: f64,
    /// Mean cost over individuals that did not score the sentinel.
    pub mean_cost: Option<f64>,
    /// Individuals scoring the sentinel.
    pub sentinel_count: usize,
    /// Cost evaluations performed in this generation.
    pub evaluations: usize,
}

/// Outcome of a successful search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    /// Best candidate observed in any generation.
    pub best: Candidate,
    pub history: Vec<GenerationStats>,
    pub evaluations: usize,
    pub generations: usize,
    pub termination: Termination,
    /// Evaluations that panicked.
    pub worker_failures: usize,
    pub cost_function: CostFunction,
}

impl SearchReport {
    pub fn best_vector(&self) -> HyperparameterVector {
        self.best.vector
    }

    pub fn best_cost(&self) -> f64 {
        self.best.cost
    }
}

/// Genetic optimizer for SARIMA orders.
///
/// # Example
///
/// ```no_run
/// use sarima_evolve::core::TimeSeries;
/// use sarima_evolve::search::{CostFunction, GeneticOptimizer, SearchConfig};
///
/// # fn load() -> (TimeSeries, TimeSeries) { unimplemented!() }
/// let (train, validation) = load();
/// let config = SearchConfig::default()
///     .with_cost_function(CostFunction::PenalizedRmse { max_order: 5 })
///     .with_max_generations(20);
///
/// let report = GeneticOptimizer::new(config).optimize(&train, &validation)?;
/// println!("best {} -> {:.3}", report.best_vector(), report.best_cost());
/// # Ok::<(), sarima_evolve::SearchError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GeneticOptimizer<F = SarimaFitter> {
    config: SearchConfig,
    fitter: F,
}

impl GeneticOptimizer<SarimaFitter> {
    /// Create an optimizer using the built-in SARIMA fitter.
    pub fn new(config: SearchConfig) -> Self {
        Self::with_fitter(config, SarimaFitter)
    }
}

impl<F: ModelFitter + Clone> GeneticOptimizer<F> {
    /// Create an optimizer with a custom fitter.
    pub fn with_fitter(config: SearchConfig, fitter: F) -> Self {
        Self { config, fitter }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run the search.
    ///
    /// Returns [`SearchError::InvalidConfig`] before any evaluation when the
    /// configuration or inputs are malformed, and
    /// [`SearchError::SearchExhausted`] when no candidate beat the sentinel.
    pub fn optimize(
        &self,
        train: &TimeSeries,
        validation: &TimeSeries,
    ) -> SearchResult<SearchReport> {
        let config = &self.config;
        config.validate()?;

        if train.is_empty() {
            return Err(SearchError::InvalidConfig(
                "training series is empty".to_string(),
            ));
        }
        let horizon = config.horizon.unwrap_or(validation.len());
        if horizon == 0 && config.cost_function != CostFunction::Bic {
            return Err(SearchError::InvalidConfig(
                "validation series is empty and no horizon was given".to_string(),
            ));
        }

        let context = EvaluationContext {
            train: train.clone(),
            validation: validation.clone(),
            horizon,
            period: config.seasonal_period,
            cost_function: config.cost_function,
            method: config.estimation_method,
            fitter: self.fitter.clone(),
        };
        let pool = EvaluationPool::new(context, config.workers)?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let started = Instant::now();

        info!(
            cost = config.cost_function.name(),
            space_size = config.space.cardinality(),
            population = config.population_size,
            max_generations = config.max_generations,
            workers = pool.workers(),
            "starting SARIMA order search"
        );

        let vectors = self.initial_population(&mut rng);
        let costs = pool.evaluate(&vectors);
        let mut population: Vec<Candidate> = vectors
            .into_iter()
            .zip(costs)
            .map(|(v, c)| Candidate::new(v, c))
            .collect();

        let mut best = best_of(&population);
        let mut evaluations = population.len();
        let mut history = vec![generation_stats(1, &population, best.cost, population.len())];
        let mut stale = 0;
        let mut termination = Termination::GenerationLimit;

        let elite_count = config.genetic.elite_count(config.population_size);

        for generation in 2..=config.max_generations {
            if let Some(patience) = config.patience {
                if stale >= patience {
                    termination = Termination::NoImprovement;
                    break;
                }
            }

            population.sort_by(|a, b| a.cost.total_cmp(&b.cost));
            let offspring = self.breed(&population, elite_count, &mut rng);
            let costs = pool.evaluate(&offspring);
            evaluations += offspring.len();

            let mut next: Vec<Candidate> = population[..elite_count].to_vec();
            next.extend(
                offspring
                    .into_iter()
                    .zip(costs)
                    .map(|(v, c)| Candidate::new(v, c)),
            );
            population = next;

            let generation_best = best_of(&population);
            if generation_best.cost < best.cost {
                best = generation_best;
                stale = 0;
            } else {
                stale += 1;
            }

            let stats = generation_stats(
                generation,
                &population,
                best.cost,
                config.population_size - elite_count,
            );
            debug!(
                generation,
                best_cost = stats.best_cost,
                generation_best = stats.generation_best,
                sentinels = stats.sentinel_count,
                "generation evaluated"
            );
            history.push(stats);
        }

        let generations = history.len();
        info!(
            best = %best.vector,
            cost = best.cost,
            generations,
            evaluations,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "SARIMA order search finished"
        );

        if is_sentinel(best.cost) {
            return Err(SearchError::SearchExhausted {
                generations,
                evaluations,
            });
        }

        Ok(SearchReport {
            best,
            history,
            evaluations,
            generations,
            termination,
            worker_failures: pool.failures(),
            cost_function: config.cost_function,
        })
    }

    /// Refit `vector` on `series` and forecast `horizon` steps, for plotting
    /// the winner of a search.
    pub fn forecast_best(
        &self,
        series: &TimeSeries,
        vector: &HyperparameterVector,
        horizon: usize,
    ) -> SearchResult<ForecastBands> {
        refit_and_forecast(
            &self.fitter,
            series,
            vector,
            self.config.seasonal_period,
            horizon,
            self.config.estimation_method,
        )
    }

    /// Start vector (if any) followed by uniform samples.
    fn initial_population(&self, rng: &mut StdRng) -> Vec<HyperparameterVector> {
        let config = &self.config;
        let mut population = Vec::with_capacity(config.population_size);
        if let Some(start) = config.start_vector {
            population.push(start);
        }
        while population.len() < config.population_size {
            population.push(config.space.sample(rng));
        }
        population
    }

    /// Offspring filling the population after `elite_count` elites.
    ///
    /// `population` must be sorted by ascending cost.
    fn breed(
        &self,
        population: &[Candidate],
        elite_count: usize,
        rng: &mut StdRng,
    ) -> Vec<HyperparameterVector> {
        let wanted = self.config.population_size - elite_count;
        let mut offspring = Vec::with_capacity(wanted);

        while offspring.len() < wanted {
            let first = self.tournament_select(population, rng);
            let second = self.tournament_select(population, rng);

            let (mut a, mut b) = if rng.gen::<f64>() < self.config.genetic.crossover_probability {
                self.crossover(&first, &second, rng)
            } else {
                (first, second)
            };
            self.mutate(&mut a, rng);
            self.mutate(&mut b, rng);

            offspring.push(a);
            if offspring.len() < wanted {
                offspring.push(b);
            }
        }
        offspring
    }

    /// Lowest-cost individual among `tournament_size` uniform draws.
    fn tournament_select(&self, population: &[Candidate], rng: &mut StdRng) -> HyperparameterVector {
        let mut winner = &population[rng.gen_range(0..population.len())];
        for _ in 1..self.config.genetic.tournament_size {
            let challenger = &population[rng.gen_range(0..population.len())];
            if challenger.cost < winner.cost {
                winner = challenger;
            }
        }
        winner.vector
    }

    fn crossover(
        &self,
        first: &HyperparameterVector,
        second: &HyperparameterVector,
        rng: &mut StdRng,
    ) -> (HyperparameterVector, HyperparameterVector) {
        let mut a = first.0;
        let mut b = second.0;

        let swapped: Vec<usize> = match self.config.genetic.crossover {
            CrossoverKind::Uniform => (0..DIMENSIONS).filter(|_| rng.gen_bool(0.5)).collect(),
            CrossoverKind::OnePoint => {
                let cut = rng.gen_range(1..DIMENSIONS);
                (cut..DIMENSIONS).collect()
            }
            CrossoverKind::TwoPoint => {
                let start = rng.gen_range(1..DIMENSIONS - 1);
                let end = rng.gen_range(start + 1..DIMENSIONS);
                (start..end).collect()
            }
        };
        for i in swapped {
            std::mem::swap(&mut a[i], &mut b[i]);
        }

        (HyperparameterVector(a), HyperparameterVector(b))
    }

    /// Per gene: with `mutation_probability`, either step by one or redraw.
    fn mutate(&self, vector: &mut HyperparameterVector, rng: &mut StdRng) {
        let space = &self.config.space;
        let rate = self.config.genetic.mutation_probability;

        for (gene, bounds) in vector.0.iter_mut().zip(space.bounds()) {
            if bounds.width() == 1 || rng.gen::<f64>() >= rate {
                continue;
            }
            *gene = if rng.gen_bool(0.5) {
                let up = *gene == bounds.lower || (*gene < bounds.upper && rng.gen_bool(0.5));
                if up {
                    *gene + 1
                } else {
                    *gene - 1
                }
            } else {
                bounds.sample(rng)
            };
        }
        *vector = space.clamp(*vector);
    }
}

fn best_of(population: &[Candidate]) -> Candidate {
    population
        .iter()
        .copied()
        .min_by(|a, b| a.cost.total_cmp(&b.cost))
        .unwrap_or(Candidate::new(
            HyperparameterVector([0; DIMENSIONS]),
            f64::INFINITY,
        ))
}

fn generation_stats(
    generation: usize,
    population: &[Candidate],
    best_cost: f64,
    evaluations: usize,
) -> GenerationStats {
    let finite: Vec<f64> = population
        .iter()
        .map(|c| c.cost)
        .filter(|c| !is_sentinel(*c))
        .collect();
    let mean_cost = if finite.is_empty() {
        None
    } else {
        Some(finite.iter().sum::<f64>() / finite.len() as f64)
    };

    GenerationStats {
        generation,
        best_cost,
        generation_best: best_of(population).cost,
        mean_cost,
        sentinel_count: population.len() - finite.len(),
        evaluations,
    }
}
