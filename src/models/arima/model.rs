//! Seasonal ARIMA (SARIMA) model.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{difference, integrate, seasonal_difference, seasonal_integrate};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::{mean, quantile_normal};

/// Coefficient bound keeping each AR/MA term inside the unit interval.
const COEFFICIENT_BOUND: f64 = 0.99;

/// SARIMA(p, d, q)(P, D, Q)\[s\] model specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SARIMASpec {
    /// Non-seasonal AR order.
    pub p: usize,
    /// Non-seasonal differencing order.
    pub d: usize,
    /// Non-seasonal MA order.
    pub q: usize,
    /// Seasonal AR order.
    pub cap_p: usize,
    /// Seasonal differencing order.
    pub cap_d: usize,
    /// Seasonal MA order.
    pub cap_q: usize,
    /// Seasonal period.
    pub s: usize,
}

impl SARIMASpec {
    /// Create a new SARIMA specification.
    pub fn new(
        p: usize,
        d: usize,
        q: usize,
        cap_p: usize,
        cap_d: usize,
        cap_q: usize,
        s: usize,
    ) -> Self {
        Self {
            p,
            d,
            q,
            cap_p,
            cap_d,
            cap_q,
            s,
        }
    }

    /// Non-seasonal ARIMA(p, d, q).
    pub fn arima(p: usize, d: usize, q: usize) -> Self {
        Self::new(p, d, q, 0, 0, 0, 0)
    }

    /// Check if this is a seasonal model.
    pub fn is_seasonal(&self) -> bool {
        self.s > 1 && (self.cap_p > 0 || self.cap_d > 0 || self.cap_q > 0)
    }

    /// A constant is estimated only for undifferenced models.
    pub fn has_intercept(&self) -> bool {
        self.d + self.seasonal_d() == 0
    }

    /// Number of estimated mean-equation parameters.
    pub fn num_params(&self) -> usize {
        let seasonal = if self.s > 1 {
            self.cap_p + self.cap_q
        } else {
            0
        };
        self.p + self.q + seasonal + usize::from(self.has_intercept())
    }

    /// Largest lag of the expanded AR polynomial.
    pub fn max_ar_lag(&self) -> usize {
        self.p + self.seasonal_ar_order() * self.s
    }

    /// Largest lag of the expanded MA polynomial.
    pub fn max_ma_lag(&self) -> usize {
        self.q + self.seasonal_ma_order() * self.s
    }

    /// Minimum series length needed to estimate this model.
    pub fn min_observations(&self) -> usize {
        let lost = self.d + self.seasonal_d() * self.s;
        lost + self.max_ar_lag().max(self.max_ma_lag()) + self.num_params() + 2
    }

    fn seasonal_ar_order(&self) -> usize {
        if self.s > 1 {
            self.cap_p
        } else {
            0
        }
    }

    fn seasonal_ma_order(&self) -> usize {
        if self.s > 1 {
            self.cap_q
        } else {
            0
        }
    }

    fn seasonal_d(&self) -> usize {
        if self.s > 1 {
            self.cap_d
        } else {
            0
        }
    }
}

impl Default for SARIMASpec {
    fn default() -> Self {
        // The classic airline model.
        Self::new(0, 1, 1, 0, 1, 1, 12)
    }
}

/// How the SARIMA parameters are estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EstimationMethod {
    /// Gaussian likelihood over every differenced observation, with
    /// pre-sample values and innovations set to zero.
    #[default]
    MaximumLikelihood,
    /// Conditional sum of squares, skipping the first `max_ar_lag` observations.
    ConditionalSumOfSquares,
}

/// Estimated SARIMA coefficients.
#[derive(Debug, Clone, Default)]
struct Coefficients {
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
    intercept: f64,
}

impl Coefficients {
    fn from_params(spec: &SARIMASpec, params: &[f64]) -> Self {
        let mut rest = params;
        let intercept = if spec.has_intercept() {
            let value = rest[0];
            rest = &rest[1..];
            value
        } else {
            0.0
        };
        let (ar, rest) = rest.split_at(spec.p);
        let (ma, rest) = rest.split_at(spec.q);
        let (seasonal_ar, rest) = rest.split_at(spec.seasonal_ar_order());
        let seasonal_ma = &rest[..spec.seasonal_ma_order()];

        Self {
            ar: ar.to_vec(),
            ma: ma.to_vec(),
            seasonal_ar: seasonal_ar.to_vec(),
            seasonal_ma: seasonal_ma.to_vec(),
            intercept,
        }
    }

    /// Coefficients `c` of `w_t = sum_k c_k w_{t-k} + ...` after multiplying
    /// out the seasonal and non-seasonal AR polynomials.
    fn expanded_ar(&self, s: usize) -> Vec<f64> {
        let phi = lag_polynomial(&self.ar, 1, -1.0);
        let seasonal_phi = lag_polynomial(&self.seasonal_ar, s, -1.0);
        poly_mul(&phi, &seasonal_phi)
            .iter()
            .skip(1)
            .map(|c| -c)
            .collect()
    }

    /// Coefficients of the multiplied-out MA polynomial, lag 1 onward.
    fn expanded_ma(&self, s: usize) -> Vec<f64> {
        let theta = lag_polynomial(&self.ma, 1, 1.0);
        let seasonal_theta = lag_polynomial(&self.seasonal_ma, s, 1.0);
        poly_mul(&theta, &seasonal_theta)[1..].to_vec()
    }
}

/// Seasonal ARIMA forecasting model.
///
/// SARIMA(p, d, q)(P, D, Q)\[s\] applies `d` regular and `D` seasonal
/// differences, then fits a multiplicative ARMA:
///
/// `phi(B) Phi(B^s) (w_t - mu) = theta(B) Theta(B^s) e_t`
///
/// The constant `mu` is only estimated when no differencing is applied.
#[derive(Debug, Clone)]
pub struct SARIMA {
    spec: SARIMASpec,
    method: EstimationMethod,
    coefficients: Coefficients,
    /// Original series (for integration).
    original: Option<Vec<f64>>,
    /// Series after regular differencing only.
    regular_diff: Option<Vec<f64>>,
    /// Series after regular and seasonal differencing.
    differenced: Option<Vec<f64>>,
    /// Fitted values on the differenced scale.
    fitted_diff: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    residual_variance: Option<f64>,
    log_likelihood: Option<f64>,
    aic: Option<f64>,
    bic: Option<f64>,
    /// Number of observations entering the likelihood.
    n_obs: usize,
}

impl SARIMA {
    /// Create a new SARIMA model.
    pub fn new(
        p: usize,
        d: usize,
        q: usize,
        cap_p: usize,
        cap_d: usize,
        cap_q: usize,
        s: usize,
    ) -> Self {
        Self::from_spec(SARIMASpec::new(p, d, q, cap_p, cap_d, cap_q, s))
    }

    /// Create a model from a specification.
    pub fn from_spec(spec: SARIMASpec) -> Self {
        Self {
            spec,
            method: EstimationMethod::default(),
            coefficients: Coefficients::default(),
            original: None,
            regular_diff: None,
            differenced: None,
            fitted_diff: None,
            residuals: None,
            residual_variance: None,
            log_likelihood: None,
            aic: None,
            bic: None,
            n_obs: 0,
        }
    }

    /// Choose the estimation method.
    pub fn with_method(mut self, method: EstimationMethod) -> Self {
        self.method = method;
        self
    }

    /// Get the model specification.
    pub fn spec(&self) -> SARIMASpec {
        self.spec
    }

    /// Get the estimation method.
    pub fn method(&self) -> EstimationMethod {
        self.method
    }

    /// Get non-seasonal AR coefficients.
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.coefficients.ar
    }

    /// Get non-seasonal MA coefficients.
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.coefficients.ma
    }

    /// Get seasonal AR coefficients.
    pub fn seasonal_ar_coefficients(&self) -> &[f64] {
        &self.coefficients.seasonal_ar
    }

    /// Get seasonal MA coefficients.
    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        &self.coefficients.seasonal_ma
    }

    /// Get the intercept (zero for differenced models).
    pub fn intercept(&self) -> f64 {
        self.coefficients.intercept
    }

    /// Get the innovation variance estimate.
    pub fn residual_variance(&self) -> Option<f64> {
        self.residual_variance
    }

    /// Get the maximised log-likelihood.
    pub fn log_likelihood(&self) -> Option<f64> {
        self.log_likelihood
    }

    /// Get AIC.
    pub fn aic(&self) -> Option<f64> {
        self.aic
    }

    /// Get BIC.
    pub fn bic(&self) -> Option<f64> {
        self.bic
    }

    /// First index of `w` whose residual enters the likelihood.
    fn likelihood_start(&self) -> usize {
        match self.method {
            EstimationMethod::MaximumLikelihood => 0,
            EstimationMethod::ConditionalSumOfSquares => self.spec.max_ar_lag(),
        }
    }

    /// Innovations implied by `coefficients`, with zero pre-sample values.
    fn innovations(&self, w: &[f64], coefficients: &Coefficients, start: usize) -> Vec<f64> {
        let ar = coefficients.expanded_ar(self.spec.s);
        let ma = coefficients.expanded_ma(self.spec.s);
        let mu = coefficients.intercept;
        let mut residuals = vec![0.0; w.len()];

        for t in start..w.len() {
            let mut pred = mu;
            for (k, c) in ar.iter().enumerate() {
                if t > k {
                    pred += c * (w[t - 1 - k] - mu);
                }
            }
            for (k, m) in ma.iter().enumerate() {
                if t > k {
                    pred += m * residuals[t - 1 - k];
                }
            }
            residuals[t] = w[t] - pred;
        }
        residuals
    }

    /// Sum of squared innovations from `start`.
    fn sum_of_squares(&self, w: &[f64], coefficients: &Coefficients, start: usize) -> f64 {
        self.innovations(w, coefficients, start)[start..]
            .iter()
            .map(|e| e * e)
            .sum()
    }

    /// Estimate the coefficients by minimising the concentrated negative
    /// log-likelihood `0.5 * n * ln(css / n)`.
    fn estimate_parameters(&mut self, w: &[f64]) -> Result<()> {
        let spec = self.spec;
        let start = self.likelihood_start();
        let n_eff = (w.len() - start) as f64;
        let n_params = spec.num_params();

        if n_params == 0 {
            self.coefficients = Coefficients::default();
            return Ok(());
        }

        let mut initial = Vec::with_capacity(n_params);
        let mut bounds = Vec::with_capacity(n_params);
        if spec.has_intercept() {
            initial.push(mean(w));
            bounds.push((f64::NEG_INFINITY, f64::INFINITY));
        }
        let orders = [
            spec.p,
            spec.q,
            spec.seasonal_ar_order(),
            spec.seasonal_ma_order(),
        ];
        for order in orders {
            for i in 0..order {
                initial.push(0.1 / (i + 1) as f64);
                bounds.push((-COEFFICIENT_BOUND, COEFFICIENT_BOUND));
            }
        }

        let config = NelderMeadConfig {
            max_iter: 500 * (n_params + 1),
            tolerance: 1e-7,
            ..Default::default()
        };

        let result = nelder_mead(
            |params| {
                let coefficients = Coefficients::from_params(&spec, params);
                let css = self.sum_of_squares(w, &coefficients, start);
                if css.is_finite() && css > 0.0 {
                    0.5 * n_eff * (css / n_eff).ln()
                } else {
                    f64::INFINITY
                }
            },
            &initial,
            Some(&bounds),
            config,
        );

        if !result.optimal_value.is_finite() {
            return Err(ForecastError::ComputationError(
                "likelihood is not finite at any visited point".to_string(),
            ));
        }
        if !result.converged {
            return Err(ForecastError::ConvergenceFailure {
                iterations: result.iterations,
            });
        }

        self.coefficients = Coefficients::from_params(&spec, &result.optimal_point);
        Ok(())
    }

    /// Calculate fitted values, residuals and information criteria.
    fn calculate_fitted(&mut self, w: &[f64]) -> Result<()> {
        let start = self.likelihood_start();
        let residuals = self.innovations(w, &self.coefficients, start);
        let fitted: Vec<f64> = w
            .iter()
            .zip(&residuals)
            .enumerate()
            .map(|(t, (x, e))| if t < start { f64::NAN } else { x - e })
            .collect();

        let used = &residuals[start..];
        let n_eff = used.len() as f64;
        let variance = used.iter().map(|e| e * e).sum::<f64>() / n_eff;

        if !variance.is_finite() || variance <= 0.0 {
            return Err(ForecastError::ComputationError(format!(
                "degenerate innovation variance {variance}"
            )));
        }

        // Parameters counted for the criteria include the innovation variance.
        let k = (self.spec.num_params() + 1) as f64;
        let ll = -0.5 * n_eff * (1.0 + variance.ln() + (2.0 * std::f64::consts::PI).ln());

        self.n_obs = used.len();
        self.residual_variance = Some(variance);
        self.log_likelihood = Some(ll);
        self.aic = Some(-2.0 * ll + 2.0 * k);
        self.bic = Some(-2.0 * ll + k * n_eff.ln());
        self.fitted_diff = Some(fitted);
        self.residuals = Some(residuals);
        Ok(())
    }

    /// Psi weights of the full model including the differencing operators.
    fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        let s = self.spec.s;
        let mut ar_full = vec![1.0];
        ar_full.extend(self.coefficients.expanded_ar(s).iter().map(|c| -c));
        for _ in 0..self.spec.d {
            ar_full = poly_mul(&ar_full, &[1.0, -1.0]);
        }
        for _ in 0..self.spec.seasonal_d() {
            ar_full = poly_mul(&ar_full, &lag_polynomial(&[1.0], s, -1.0));
        }
        let ma = self.coefficients.expanded_ma(s);

        let mut psi = Vec::with_capacity(horizon);
        for j in 0..horizon {
            let mut value = if j == 0 {
                1.0
            } else {
                ma.get(j - 1).copied().unwrap_or(0.0)
            };
            for k in 1..=j.min(ar_full.len() - 1) {
                value -= ar_full[k] * psi[j - k];
            }
            psi.push(value);
        }
        psi
    }
}

impl Default for SARIMA {
    fn default() -> Self {
        Self::from_spec(SARIMASpec::default())
    }
}

impl Forecaster for SARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.primary_values();
        if values.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        if series.has_missing_values() {
            return Err(ForecastError::InvalidParameter(
                "series contains non-finite values".to_string(),
            ));
        }

        let min_len = self.spec.min_observations();
        if values.len() < min_len {
            return Err(ForecastError::InsufficientData {
                needed: min_len,
                got: values.len(),
            });
        }

        let regular = difference(values, self.spec.d);
        let w = seasonal_difference(&regular, self.spec.seasonal_d(), self.spec.s);

        self.estimate_parameters(&w)?;
        self.calculate_fitted(&w)?;

        self.original = Some(values.to_vec());
        self.regular_diff = Some(regular);
        self.differenced = Some(w);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let original = self.original.as_ref().ok_or(ForecastError::FitRequired)?;
        let regular = self
            .regular_diff
            .as_ref()
            .ok_or(ForecastError::FitRequired)?;
        let w = self.differenced.as_ref().ok_or(ForecastError::FitRequired)?;
        let residuals = self.residuals.as_ref().ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let ar = self.coefficients.expanded_ar(self.spec.s);
        let ma = self.coefficients.expanded_ma(self.spec.s);
        let mu = self.coefficients.intercept;

        let mut extended = w.clone();
        let mut extended_residuals = residuals.clone();
        for _ in 0..horizon {
            let t = extended.len();
            let mut pred = mu;
            for (k, c) in ar.iter().enumerate() {
                if t > k {
                    pred += c * (extended[t - 1 - k] - mu);
                }
            }
            for (k, m) in ma.iter().enumerate() {
                if t > k {
                    pred += m * extended_residuals[t - 1 - k];
                }
            }
            extended.push(pred);
            extended_residuals.push(0.0);
        }

        let forecast_diff = &extended[w.len()..];
        let seasonal_restored =
            seasonal_integrate(forecast_diff, regular, self.spec.seasonal_d(), self.spec.s);
        let predictions = integrate(&seasonal_restored, original, self.spec.d);

        if predictions.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ComputationError(
                "forecast diverged".to_string(),
            ));
        }

        Ok(Forecast::from_values(predictions))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        if !(0.0..1.0).contains(&level) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval level must be in [0, 1), got {level}"
            )));
        }

        let forecast = self.predict(horizon)?;
        if horizon == 0 {
            return Ok(forecast);
        }

        let variance = self.residual_variance.ok_or(ForecastError::FitRequired)?;
        let z = quantile_normal((1.0 + level) / 2.0);
        let psi = self.psi_weights(horizon);
        let preds = forecast.primary();

        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        let mut cumulative = 0.0;
        for (h, weight) in psi.iter().enumerate() {
            cumulative += weight * weight;
            let se = (variance * cumulative).sqrt();
            lower.push(preds[h] - z * se);
            upper.push(preds[h] + z * se);
        }

        Ok(Forecast::from_values_with_intervals(
            preds.to_vec(),
            lower,
            upper,
        ))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted_diff.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        if self.spec.is_seasonal() {
            "SARIMA"
        } else {
            "ARIMA"
        }
    }
}

/// `1 + sign * sum_i coefficients[i] * B^{(i+1) * step}` as a dense vector.
fn lag_polynomial(coefficients: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefficients.len() * step + 1];
    poly[0] = 1.0;
    for (i, c) in coefficients.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}
