//! Cost functions scoring one hyperparameter vector.

use crate::core::TimeSeries;
use crate::models::arima::EstimationMethod;
use crate::search::fitter::{FittedModel, ModelFitter};
use crate::search::space::HyperparameterVector;

/// Cost assigned to a vector whose model could not be fitted or scored.
///
/// This is a point in the fitness landscape, not an error code: it is large
/// enough that any fitted model beats it, yet finite so candidates remain
/// comparable with plain `<`. A search whose best cost is still this value
/// found no viable model.
pub const SENTINEL_COST: f64 = 9_999_999.0;

/// Returns `true` when `cost` is the sentinel.
pub fn is_sentinel(cost: f64) -> bool {
    cost >= SENTINEL_COST
}

/// Selects how a fitted model is scored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CostFunction {
    /// Magnitude of the mean forecast error on the validation series.
    #[default]
    Rmse,
    /// Bayesian information criterion of the training fit.
    Bic,
    /// [`CostFunction::Rmse`], but orders with `p + q + P + Q > max_order`
    /// score the sentinel without being fitted.
    PenalizedRmse { max_order: usize },
}

impl CostFunction {
    pub fn name(&self) -> &'static str {
        match self {
            CostFunction::Rmse => "rmse",
            CostFunction::Bic => "bic",
            CostFunction::PenalizedRmse { .. } => "penalized_rmse",
        }
    }

    /// Score `vector`. Fit or forecast failures yield [`SENTINEL_COST`].
    pub fn evaluate<F: ModelFitter>(
        &self,
        fitter: &F,
        vector: &HyperparameterVector,
        train: &TimeSeries,
        validation: &TimeSeries,
        horizon: usize,
        period: usize,
        method: EstimationMethod,
    ) -> f64 {
        if let CostFunction::PenalizedRmse { max_order } = *self {
            if vector.arma_order_sum() > max_order {
                return SENTINEL_COST;
            }
        }

        let model = match fitter.fit(
            train,
            vector.order(),
            vector.seasonal_order(period),
            method,
        ) {
            Ok(model) => model,
            Err(_) => return SENTINEL_COST,
        };

        let cost = match self {
            CostFunction::Bic => model.bic(),
            CostFunction::Rmse | CostFunction::PenalizedRmse { .. } => model
                .point_forecast(horizon)
                .ok()
                .and_then(|point| mean_error_magnitude(&point, validation.primary_values())),
        };

        match cost {
            Some(c) if c.is_finite() => c.min(SENTINEL_COST),
            _ => SENTINEL_COST,
        }
    }
}

/// `sqrt(mean(forecast - actual)^2)`, i.e. `|mean(forecast - actual)|`.
///
/// This squares the mean error rather than averaging squared errors, so
/// over- and under-forecasts cancel. Only the overlapping prefix of the two
/// slices is used; `None` when there is no overlap.
pub fn mean_error_magnitude(forecast: &[f64], actual: &[f64]) -> Option<f64> {
    let n = forecast.len().min(actual.len());
    if n == 0 {
        return None;
    }

    let mean_error = forecast
        .iter()
        .zip(actual)
        .map(|(f, a)| f - a)
        .sum::<f64>()
        / n as f64;

    Some((mean_error * mean_error).sqrt())
}
