//! Parallel evaluation of one generation.

use crate::core::TimeSeries;
use crate::error::{SearchError, SearchResult};
use crate::models::arima::EstimationMethod;
use crate::search::cost::{CostFunction, SENTINEL_COST};
use crate::search::fitter::ModelFitter;
use crate::search::space::HyperparameterVector;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Read-only inputs shared by every worker for the whole search.
#[derive(Debug)]
pub struct EvaluationContext<F> {
    pub train: TimeSeries,
    pub validation: TimeSeries,
    pub horizon: usize,
    pub period: usize,
    pub cost_function: CostFunction,
    pub method: EstimationMethod,
    pub fitter: F,
}

impl<F: ModelFitter> EvaluationContext<F> {
    /// Score one vector. Fit failures are already folded into the sentinel.
    pub fn evaluate(&self, vector: &HyperparameterVector) -> f64 {
        self.cost_function.evaluate(
            &self.fitter,
            vector,
            &self.train,
            &self.validation,
            self.horizon,
            self.period,
            self.method,
        )
    }
}

/// Fixed-size worker pool bound to one [`EvaluationContext`].
pub struct EvaluationPool<F> {
    pool: ThreadPool,
    context: Arc<EvaluationContext<F>>,
    failures: AtomicUsize,
}

impl<F: ModelFitter> EvaluationPool<F> {
    /// Spawn `workers` threads sharing `context`.
    pub fn new(context: EvaluationContext<F>, workers: usize) -> SearchResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("sarima-eval-{i}"))
            .build()
            .map_err(|e| SearchError::WorkerPool(e.to_string()))?;

        Ok(Self {
            pool,
            context: Arc::new(context),
            failures: AtomicUsize::new(0),
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Evaluations that panicked so far.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Score every vector; `result[i]` belongs to `vectors[i]`.
    ///
    /// Blocks until the whole batch is done.
    pub fn evaluate(&self, vectors: &[HyperparameterVector]) -> Vec<f64> {
        let context = Arc::clone(&self.context);
        let failures = &self.failures;

        self.pool.install(|| {
            vectors
                .par_iter()
                .map(|vector| {
                    let outcome = catch_unwind(AssertUnwindSafe(|| context.evaluate(vector)));
                    match outcome {
                        Ok(cost) => cost,
                        Err(payload) => {
                            failures.fetch_add(1, Ordering::Relaxed);
                            warn!(
                                %vector,
                                reason = panic_message(payload.as_ref()),
                                "cost evaluation panicked; using sentinel"
                            );
                            SENTINEL_COST
                        }
                    }
                })
                .collect()
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ForecastBands;
    use crate::error::Result;
    use crate::search::fitter::FittedModel;

    struct ConstantModel(f64);

    impl FittedModel for ConstantModel {
        fn forecast(&self, horizon: usize) -> Result<ForecastBands> {
            Ok(ForecastBands::point_only(vec![self.0; horizon]))
        }

        fn bic(&self) -> Option<f64> {
            Some(self.0)
        }
    }

    /// BIC equals `p * 10 + q`; panics when `d == 2`, NaN when `D == 2`.
    struct ScriptedFitter;

    impl ModelFitter for ScriptedFitter {
        type Model = ConstantModel;

        fn fit(
            &self,
            _series: &TimeSeries,
            order: (usize, usize, usize),
            seasonal_order: (usize, usize, usize, usize),
            _method: EstimationMethod,
        ) -> Result<ConstantModel> {
            if order.1 == 2 {
                panic!("simulated worker fault");
            }
            if seasonal_order.1 == 2 {
                return Ok(ConstantModel(f64::NAN));
            }
            Ok(ConstantModel((order.0 * 10 + order.2) as f64))
        }
    }

    fn pool(workers: usize) -> EvaluationPool<ScriptedFitter> {
        let series = TimeSeries::monthly(2000, 1, vec![1.0; 12]).unwrap();
        let context = EvaluationContext {
            train: series.clone(),
            validation: series,
            horizon: 12,
            period: 12,
            cost_function: CostFunction::Bic,
            method: EstimationMethod::MaximumLikelihood,
            fitter: ScriptedFitter,
        };
        EvaluationPool::new(context, workers).unwrap()
    }

    #[test]
    fn results_follow_input_order() {
        let pool = pool(4);
        let vectors: Vec<_> = (0..40)
            .map(|i| HyperparameterVector::new(i % 4, 0, i / 4, 0, 0, 0))
            .collect();

        let costs = pool.evaluate(&vectors);

        assert_eq!(costs.len(), vectors.len());
        for (v, c) in vectors.iter().zip(&costs) {
            let (p, _, q) = v.order();
            assert_eq!(*c, (p * 10 + q) as f64);
        }
        assert_eq!(pool.workers(), 4);
    }

    #[test]
    fn panicking_evaluation_is_isolated() {
        let pool = pool(2);
        let vectors = vec![
            HyperparameterVector::new(1, 0, 1, 0, 0, 0),
            HyperparameterVector::new(1, 2, 1, 0, 0, 0),
            HyperparameterVector::new(2, 0, 3, 0, 0, 0),
        ];

        let costs = pool.evaluate(&vectors);

        assert_eq!(costs, vec![11.0, SENTINEL_COST, 23.0]);
        assert_eq!(pool.failures(), 1);
    }

    #[test]
    fn nan_score_is_a_poor_fit_not_a_worker_failure() {
        let pool = pool(2);
        let costs = pool.evaluate(&[
            HyperparameterVector::new(0, 0, 0, 0, 2, 0),
            HyperparameterVector::new(1, 2, 0, 0, 0, 0),
        ]);
        assert_eq!(costs, vec![SENTINEL_COST, SENTINEL_COST]);
        // Only the panic counts against the workers
        assert_eq!(pool.failures(), 1);
    }

    #[test]
    fn empty_batch_returns_nothing() {
        assert!(pool(1).evaluate(&[]).is_empty());
    }
}
