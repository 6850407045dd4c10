//! Differencing utilities for SARIMA models.

/// Apply differencing to a time series.
///
/// # Arguments
/// * `series` - The input series
/// * `d` - Differencing order (number of times to difference)
///
/// # Returns
/// The differenced series, `d` observations shorter.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply seasonal differencing to a time series.
///
/// # Arguments
/// * `series` - The input series
/// * `d` - Seasonal differencing order
/// * `period` - Seasonal period
///
/// # Returns
/// The seasonally differenced series, `d * period` observations shorter.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if d == 0 || period == 0 {
        return series.to_vec();
    }

    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            return Vec::new();
        }
        result = result
            .iter()
            .skip(period)
            .zip(result.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Integrate (reverse differencing) a differenced forecast.
///
/// # Arguments
/// * `differenced` - Values following the end of `original` on the differenced scale
/// * `original` - The undifferenced history
/// * `d` - Differencing order used
pub fn integrate(differenced: &[f64], original: &[f64], d: usize) -> Vec<f64> {
    if d == 0 || differenced.is_empty() {
        return differenced.to_vec();
    }

    let mut result = differenced.to_vec();
    for level in (0..d).rev() {
        let history = difference(original, level);
        let mut cumsum = history.last().copied().unwrap_or(0.0);
        for value in result.iter_mut() {
            cumsum += *value;
            *value = cumsum;
        }
    }
    result
}

/// Reverse seasonal differencing of a forecast.
///
/// Each level adds back the value one period earlier, drawing on the
/// history first and on already-integrated forecasts once the horizon
/// exceeds the period.
pub fn seasonal_integrate(
    differenced: &[f64],
    original: &[f64],
    d: usize,
    period: usize,
) -> Vec<f64> {
    if d == 0 || period == 0 || differenced.is_empty() {
        return differenced.to_vec();
    }

    let mut result = differenced.to_vec();
    for level in (0..d).rev() {
        let mut extended = seasonal_difference(original, level, period);
        let start = extended.len();
        for &value in &result {
            let t = extended.len();
            let lagged = if t >= period { extended[t - period] } else { 0.0 };
            extended.push(value + lagged);
        }
        result = extended.split_off(start);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn difference_order_0() {
        let series = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(difference(&series, 0), series);
    }

    #[test]
    fn difference_order_2() {
        let series = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        // First diff: [2, 3, 4, 5]; second: [1, 1, 1]
        assert_eq!(difference(&series, 2), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn difference_too_short_is_empty() {
        assert!(difference(&[1.0], 1).is_empty());
        assert!(difference(&[], 1).is_empty());
    }

    #[test]
    fn seasonal_difference_basic() {
        let series = vec![
            100.0, 120.0, 80.0, 90.0, // Year 1
            110.0, 130.0, 90.0, 100.0, // Year 2
        ];
        assert_eq!(
            seasonal_difference(&series, 1, 4),
            vec![10.0, 10.0, 10.0, 10.0]
        );
    }

    #[test]
    fn seasonal_difference_too_short_is_empty() {
        assert!(seasonal_difference(&[1.0, 2.0], 1, 4).is_empty());
        assert_eq!(seasonal_difference(&[1.0, 2.0], 0, 4), vec![1.0, 2.0]);
    }

    #[test]
    fn integrate_reverses_difference() {
        let original = vec![10.0, 12.0, 15.0, 19.0, 24.0];
        let integrated = integrate(&[6.0, 7.0], &original, 1);

        assert_relative_eq!(integrated[0], 30.0, epsilon = 1e-10);
        assert_relative_eq!(integrated[1], 37.0, epsilon = 1e-10);
    }

    #[test]
    fn integrate_order_2_continues_quadratic() {
        // Second differences of i^2 are constant 2
        let original: Vec<f64> = (0..6).map(|i| (i * i) as f64).collect();
        let integrated = integrate(&[2.0, 2.0], &original, 2);

        assert_relative_eq!(integrated[0], 36.0, epsilon = 1e-10);
        assert_relative_eq!(integrated[1], 49.0, epsilon = 1e-10);
    }

    #[test]
    fn seasonal_integrate_repeats_pattern() {
        let original = vec![1.0, 5.0, 3.0, 2.0, 6.0, 4.0];
        // Seasonal differences of +1 per year
        let integrated = seasonal_integrate(&[1.0, 1.0, 1.0, 1.0], &original, 1, 3);

        assert_eq!(integrated, vec![3.0, 7.0, 5.0, 4.0]);
    }

    #[test]
    fn seasonal_integrate_inverts_seasonal_difference() {
        let full: Vec<f64> = (0..24)
            .map(|i| 10.0 + i as f64 + [0.0, 3.0, -2.0, 1.0][i % 4])
            .collect();
        let (history, future) = full.split_at(16);

        let future_diff = seasonal_difference(&full, 2, 4)[history.len() - 8..].to_vec();
        let restored = seasonal_integrate(&future_diff, history, 2, 4);

        for (r, f) in restored.iter().zip(future) {
            assert_relative_eq!(r, f, epsilon = 1e-9);
        }
    }
}
