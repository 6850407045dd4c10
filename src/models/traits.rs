//! Fit/predict interface implemented by the statistical models.

use crate::core::{Forecast, TimeSeries};
use crate::error::Result;

/// A model that is fitted once on a series and then forecasts from its end.
///
/// Object-safe, so models can be held as `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Estimate the model on `series`, replacing any previous fit.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Point forecasts for `horizon` steps past the end of the fitted series.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Generate predictions with a central interval at `level` (e.g. 0.95).
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let _ = level;
        self.predict(horizon)
    }

    /// One-step in-sample predictions; `None` before fitting.
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Innovations of the fit.
    fn residuals(&self) -> Option<&[f64]>;

    fn name(&self) -> &str;

    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}
