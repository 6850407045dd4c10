//! # sarima-evolve
//!
//! Seasonal ARIMA order selection by genetic search.
//!
//! The crate fits SARIMA(p,d,q)(P,D,Q)s models and searches the six integer
//! orders with a seeded genetic algorithm, scoring each candidate on a
//! validation window or by BIC. Candidates are evaluated on a fixed worker
//! pool; a failed fit is never an error, only a poor score.
//!
//! ```no_run
//! use sarima_evolve::prelude::*;
//!
//! # fn load() -> (TimeSeries, TimeSeries) { unimplemented!() }
//! let (train, validation) = load();
//! let config = SearchConfig::default()
//!     .with_start_vector(HyperparameterVector::new(1, 0, 2, 2, 1, 0))
//!     .with_max_generations(100);
//!
//! let optimizer = GeneticOptimizer::new(config);
//! let report = optimizer.optimize(&train, &validation)?;
//! let bands = optimizer.forecast_best(&train, &report.best_vector(), 24)?;
//! # Ok::<(), SearchError>(())
//! ```

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod error;
pub mod models;
pub mod search;
pub mod utils;

pub use error::{ForecastError, Result, SearchError, SearchResult};

pub mod prelude {
    pub use crate::core::{Forecast, ForecastBands, TimeSeries};
    pub use crate::error::{ForecastError, Result, SearchError, SearchResult};
    pub use crate::models::arima::{EstimationMethod, SARIMASpec, SARIMA};
    pub use crate::models::Forecaster;
    pub use crate::search::{
        CostFunction, GeneticOptimizer, HyperparameterVector, SearchConfig, SearchReport,
        SearchSpace,
    };
}
