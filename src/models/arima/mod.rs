//! Seasonal ARIMA models.
//!
//! This module provides:
//! - SARIMA(p, d, q)(P, D, Q)\[s\] estimation by conditional or full
//!   Gaussian likelihood
//! - Regular and seasonal differencing with their inverses

mod diff;
mod model;

pub use diff::{difference, integrate, seasonal_difference, seasonal_integrate};
pub use model::{EstimationMethod, SARIMASpec, SARIMA};
