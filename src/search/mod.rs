//! Genetic search over seasonal ARIMA orders.
//!
//! A candidate is a vector `[p, d, q, P, D, Q]` of bounded integers. Each
//! generation is scored in parallel by fitting a model per candidate and
//! applying a [`CostFunction`]; candidates whose fit fails score
//! [`SENTINEL_COST`] and are simply out-competed.

mod config;
mod cost;
mod fitter;
mod genetic;
mod pool;
mod space;

pub use config::{CrossoverKind, GeneticParams, SearchConfig};
pub use cost::{is_sentinel, mean_error_magnitude, CostFunction, SENTINEL_COST};
pub use fitter::{refit_and_forecast, FittedModel, ModelFitter, SarimaFitter};
pub use genetic::{GenerationStats, GeneticOptimizer, SearchReport, Termination};
pub use pool::{EvaluationContext, EvaluationPool};
pub use space::{Bounds, Candidate, HyperparameterVector, SearchSpace, DIMENSIONS, GENE_NAMES};
