//! Model fitting seam between the search and the statistical model.
//!
//! The search never names a concrete model. It asks a [`ModelFitter`] for a
//! [`FittedModel`] and reads a forecast or a BIC from it. [`SarimaFitter`]
//! is the default, backed by the crate's own [`SARIMA`].

use crate::core::{ForecastBands, TimeSeries};
use crate::error::{Result, SearchResult};
use crate::models::arima::{EstimationMethod, SARIMASpec, SARIMA};
use crate::models::Forecaster;
use crate::search::space::HyperparameterVector;

/// Result of a successful fit. Owned by one evaluation and dropped after use.
pub trait FittedModel {
    /// Point forecasts with 80% and 95% bands.
    fn forecast(&self, horizon: usize) -> Result<ForecastBands>;

    /// Point forecasts only.
    fn point_forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        Ok(self.forecast(horizon)?.point)
    }

    /// Bayesian information criterion of the fit, if available.
    fn bic(&self) -> Option<f64>;
}

/// Fits a seasonal ARIMA model for one order combination.
///
/// Implementations are shared by every worker and must not keep mutable
/// state between calls. Non-convergence is reported as an error, never as a
/// panic.
pub trait ModelFitter: Send + Sync {
    type Model: FittedModel;

    fn fit(
        &self,
        series: &TimeSeries,
        order: (usize, usize, usize),
        seasonal_order: (usize, usize, usize, usize),
        method: EstimationMethod,
    ) -> Result<Self::Model>;
}

/// Default fitter backed by [`SARIMA`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SarimaFitter;

impl ModelFitter for SarimaFitter {
    type Model = SARIMA;

    fn fit(
        &self,
        series: &TimeSeries,
        order: (usize, usize, usize),
        seasonal_order: (usize, usize, usize, usize),
        method: EstimationMethod,
    ) -> Result<SARIMA> {
        let (p, d, q) = order;
        let (cap_p, cap_d, cap_q, s) = seasonal_order;
        let spec = SARIMASpec::new(p, d, q, cap_p, cap_d, cap_q, s);

        let mut model = SARIMA::from_spec(spec).with_method(method);
        model.fit(series)?;
        Ok(model)
    }
}

impl FittedModel for SARIMA {
    fn forecast(&self, horizon: usize) -> Result<ForecastBands> {
        let at_80 = self.predict_with_intervals(horizon, 0.80)?;
        let at_95 = self.predict_with_intervals(horizon, 0.95)?;
        ForecastBands::from_intervals(&at_80, &at_95)
    }

    fn point_forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        Ok(self.predict(horizon)?.primary().to_vec())
    }

    fn bic(&self) -> Option<f64> {
        SARIMA::bic(self)
    }
}

/// Refit the winning orders on `series` and forecast `horizon` steps ahead.
///
/// Unlike evaluations inside the search, a failed fit here is returned to
/// the caller.
pub fn refit_and_forecast<F: ModelFitter>(
    fitter: &F,
    series: &TimeSeries,
    vector: &HyperparameterVector,
    period: usize,
    horizon: usize,
    method: EstimationMethod,
) -> SearchResult<ForecastBands> {
    let model = fitter.fit(
        series,
        vector.order(),
        vector.seasonal_order(period),
        method,
    )?;
    Ok(model.forecast(horizon)?)
}
