//! Forecast result structures for holding predictions.

use crate::error::{ForecastError, Result};

/// A forecast result containing point predictions and an optional interval.
#[derive(Debug, Clone, Default)]
pub struct Forecast {
    /// Point predictions, one per step.
    point: Vec<f64>,
    /// Lower prediction interval bounds (optional)
    lower: Option<Vec<f64>>,
    /// Upper prediction interval bounds (optional)
    upper: Option<Vec<f64>>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            point: values,
            lower: None,
            upper: None,
        }
    }

    /// Create a forecast with prediction intervals.
    pub fn from_values_with_intervals(
        values: Vec<f64>,
        lower: Vec<f64>,
        upper: Vec<f64>,
    ) -> Self {
        Self {
            point: values,
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    /// Check if forecast is empty.
    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Get the point predictions.
    pub fn primary(&self) -> &[f64] {
        &self.point
    }

    /// Check if lower interval is available.
    pub fn has_lower(&self) -> bool {
        self.lower.is_some()
    }

    /// Check if upper interval is available.
    pub fn has_upper(&self) -> bool {
        self.upper.is_some()
    }

    /// Get the lower interval bounds.
    pub fn lower_series(&self) -> Result<&[f64]> {
        self.lower.as_deref().ok_or_else(|| {
            ForecastError::InvalidParameter("forecast has no lower interval".to_string())
        })
    }

    /// Get the upper interval bounds.
    pub fn upper_series(&self) -> Result<&[f64]> {
        self.upper.as_deref().ok_or_else(|| {
            ForecastError::InvalidParameter("forecast has no upper interval".to_string())
        })
    }
}

/// Point forecasts with 80% and 95% prediction bands.
///
/// This is the shape consumed by plotting code after the final refit.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastBands {
    pub point: Vec<f64>,
    pub lower_80: Vec<f64>,
    pub upper_80: Vec<f64>,
    pub lower_95: Vec<f64>,
    pub upper_95: Vec<f64>,
}

impl ForecastBands {
    /// Assemble bands from an 80% and a 95% interval forecast of the same model.
    pub fn from_intervals(at_80: &Forecast, at_95: &Forecast) -> Result<Self> {
        if at_80.horizon() != at_95.horizon() {
            return Err(ForecastError::DimensionMismatch {
                expected: at_80.horizon(),
                got: at_95.horizon(),
            });
        }

        Ok(Self {
            point: at_80.primary().to_vec(),
            lower_80: at_80.lower_series()?.to_vec(),
            upper_80: at_80.upper_series()?.to_vec(),
            lower_95: at_95.lower_series()?.to_vec(),
            upper_95: at_95.upper_series()?.to_vec(),
        })
    }

    /// Bands with no width, for models that only produce point forecasts.
    pub fn point_only(point: Vec<f64>) -> Self {
        Self {
            lower_80: point.clone(),
            upper_80: point.clone(),
            lower_95: point.clone(),
            upper_95: point.clone(),
            point,
        }
    }

    /// Get the forecast horizon.
    pub fn horizon(&self) -> usize {
        self.point.len()
    }
}
