//! Search configuration.

use crate::error::{SearchError, SearchResult};
use crate::models::arima::EstimationMethod;
use crate::search::cost::CostFunction;
use crate::search::space::{HyperparameterVector, SearchSpace, GENE_NAMES};

/// How two parents are recombined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossoverKind {
    /// Each gene comes from either parent with equal probability.
    #[default]
    Uniform,
    /// Genes before a random cut come from the first parent.
    OnePoint,
    /// Genes between two random cuts come from the second parent.
    TwoPoint,
}

/// Parameters of the genetic operators.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneticParams {
    /// Per-gene mutation probability.
    pub mutation_probability: f64,
    /// Probability that a parent pair is recombined rather than copied.
    pub crossover_probability: f64,
    /// Share of the population carried over unchanged; any positive ratio
    /// keeps at least one elite.
    pub elite_ratio: f64,
    /// Individuals drawn per tournament.
    pub tournament_size: usize,
    pub crossover: CrossoverKind,
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self {
            mutation_probability: 0.1,
            crossover_probability: 0.5,
            elite_ratio: 0.01,
            tournament_size: 3,
            crossover: CrossoverKind::Uniform,
        }
    }
}

impl GeneticParams {
    /// Number of elites for a population of `population_size`.
    pub fn elite_count(&self, population_size: usize) -> usize {
        if self.elite_ratio <= 0.0 {
            return 0;
        }
        let count = (population_size as f64 * self.elite_ratio).round() as usize;
        count.max(1).min(population_size)
    }
}

/// Configuration for a genetic order search.
///
/// Build with [`SearchConfig::default`] and the `with_*` methods; the
/// optimizer calls [`SearchConfig::validate`] before evaluating anything.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Bounds on `[p, d, q, P, D, Q]`.
    pub space: SearchSpace,
    /// Individuals per generation.
    pub population_size: usize,
    /// Hard cap on generations.
    pub max_generations: usize,
    /// Stop after this many generations without improving the best cost.
    pub patience: Option<usize>,
    /// Seeded into the first population when present.
    pub start_vector: Option<HyperparameterVector>,
    /// Genes are integers; must stay `true`.
    pub integer_only: bool,
    pub cost_function: CostFunction,
    /// Seasonal period `s`, at least 2; fixed, not searched.
    pub seasonal_period: usize,
    /// Forecast horizon; the validation length when `None`.
    pub horizon: Option<usize>,
    pub estimation_method: EstimationMethod,
    /// Seed of the single random stream driving the search.
    pub seed: u64,
    /// Size of the evaluation thread pool.
    pub workers: usize,
    pub genetic: GeneticParams,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            space: SearchSpace::default(),
            population_size: 50,
            max_generations: 100,
            patience: None,
            start_vector: None,
            integer_only: true,
            cost_function: CostFunction::Rmse,
            seasonal_period: 12,
            horizon: None,
            estimation_method: EstimationMethod::MaximumLikelihood,
            seed: 42,
            workers: 8,
            genetic: GeneticParams::default(),
        }
    }
}

impl SearchConfig {
    pub fn with_space(mut self, space: SearchSpace) -> Self {
        self.space = space;
        self
    }

    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    /// Stop early after `generations` without improvement.
    pub fn with_patience(mut self, generations: usize) -> Self {
        self.patience = Some(generations);
        self
    }

    pub fn with_start_vector(mut self, vector: HyperparameterVector) -> Self {
        self.start_vector = Some(vector);
        self
    }

    pub fn with_integer_only(mut self, integer_only: bool) -> Self {
        self.integer_only = integer_only;
        self
    }

    pub fn with_cost_function(mut self, cost: CostFunction) -> Self {
        self.cost_function = cost;
        self
    }

    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }

    pub fn with_estimation_method(mut self, method: EstimationMethod) -> Self {
        self.estimation_method = method;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_genetic_params(mut self, params: GeneticParams) -> Self {
        self.genetic = params;
        self
    }

    /// Reject malformed configurations. Nothing is clamped.
    pub fn validate(&self) -> SearchResult<()> {
        for (name, bounds) in GENE_NAMES.iter().zip(self.space.bounds()) {
            if !bounds.is_valid() {
                return Err(invalid(format!(
                    "bounds for {name} are reversed: {} > {}",
                    bounds.lower, bounds.upper
                )));
            }
        }
        if self.population_size == 0 {
            return Err(invalid("population size must be positive"));
        }
        if self.max_generations == 0 {
            return Err(invalid("generation limit must be positive"));
        }
        if self.patience == Some(0) {
            return Err(invalid("patience must be positive"));
        }
        if self.workers == 0 {
            return Err(invalid("worker count must be positive"));
        }
        if !self.integer_only {
            return Err(invalid("SARIMA orders are integers; integer_only must be set"));
        }
        if self.seasonal_period < 2 {
            return Err(invalid(format!(
                "seasonal period must be at least 2, got {}",
                self.seasonal_period
            )));
        }
        if self.horizon == Some(0) {
            return Err(invalid("forecast horizon must be positive"));
        }
        if let Some(start) = self.start_vector {
            if !self.space.contains(&start) {
                return Err(invalid(format!(
                    "start vector {start} lies outside the search space"
                )));
            }
        }

        let g = &self.genetic;
        for (name, p) in [
            ("mutation probability", g.mutation_probability),
            ("crossover probability", g.crossover_probability),
            ("elite ratio", g.elite_ratio),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(format!("{name} must be in [0, 1], got {p}")));
            }
        }
        if g.tournament_size == 0 {
            return Err(invalid("tournament size must be positive"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> SearchError {
    SearchError::InvalidConfig(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::space::Bounds;

    fn assert_invalid(config: SearchConfig, fragment: &str) {
        match config.validate() {
            Err(SearchError::InvalidConfig(message)) => {
                assert!(message.contains(fragment), "unexpected message: {message}")
            }
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(SearchConfig::default().validate().is_ok());
    }

    #[test]
    fn reversed_bounds_are_rejected() {
        let mut bounds = *SearchSpace::default().bounds();
        bounds[4] = Bounds::new(2, 1);
        let config = SearchConfig::default().with_space(SearchSpace::new(bounds));
        assert_invalid(config, "bounds for D");
    }

    #[test]
    fn non_positive_sizes_are_rejected() {
        assert_invalid(
            SearchConfig::default().with_population_size(0),
            "population size",
        );
        assert_invalid(
            SearchConfig::default().with_max_generations(0),
            "generation limit",
        );
        assert_invalid(SearchConfig::default().with_workers(0), "worker count");
        assert_invalid(SearchConfig::default().with_patience(0), "patience");
        assert_invalid(SearchConfig::default().with_horizon(0), "horizon");
        assert_invalid(
            SearchConfig::default().with_seasonal_period(0),
            "seasonal period",
        );
        assert_invalid(
            SearchConfig::default().with_seasonal_period(1),
            "seasonal period",
        );
        assert!(SearchConfig::default()
            .with_seasonal_period(4)
            .validate()
            .is_ok());
    }

    #[test]
    fn continuous_search_is_rejected() {
        assert_invalid(
            SearchConfig::default().with_integer_only(false),
            "integer_only",
        );
    }

    #[test]
    fn start_vector_must_be_in_space() {
        let config = SearchConfig::default().with_start_vector(HyperparameterVector::new(
            4, 0, 0, 0, 0, 0,
        ));
        assert_invalid(config, "start vector");

        let config = SearchConfig::default().with_start_vector(HyperparameterVector::new(
            1, 0, 2, 2, 1, 0,
        ));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn probabilities_must_be_in_unit_interval() {
        let params = GeneticParams {
            mutation_probability: 1.5,
            ..Default::default()
        };
        assert_invalid(
            SearchConfig::default().with_genetic_params(params),
            "mutation probability",
        );

        let params = GeneticParams {
            tournament_size: 0,
            ..Default::default()
        };
        assert_invalid(
            SearchConfig::default().with_genetic_params(params),
            "tournament size",
        );
    }

    #[test]
    fn elite_count_rounds_with_floor_of_one() {
        let params = GeneticParams::default();
        assert_eq!(params.elite_count(50), 1);
        assert_eq!(params.elite_count(300), 3);

        let params = GeneticParams {
            elite_ratio: 0.0,
            ..Default::default()
        };
        assert_eq!(params.elite_count(50), 0);

        let params = GeneticParams {
            elite_ratio: 1.0,
            ..Default::default()
        };
        assert_eq!(params.elite_count(4), 4);
    }
}
