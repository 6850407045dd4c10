//! TimeSeries data structure for representing temporal data.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, Months, TimeZone, Utc};

/// Sampling frequency of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Frequency {
    /// One observation per calendar month.
    #[default]
    Monthly,
    /// One observation per quarter.
    Quarterly,
    /// Anything else; timestamps are kept but not interpreted.
    Irregular,
}

impl Frequency {
    /// Natural seasonal period for this frequency (0 when there is none).
    pub fn seasonal_period(&self) -> usize {
        match self {
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
            Frequency::Irregular => 0,
        }
    }
}

/// A univariate time series with timestamps and values.
///
/// Series handed to the search are read-only; nothing in the crate mutates
/// a `TimeSeries` after construction.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    frequency: Frequency,
}

impl TimeSeries {
    /// Create a univariate series from explicit timestamps.
    ///
    /// Timestamps must be strictly increasing and match the number of values.
    pub fn univariate(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        for i in 1..timestamps.len() {
            if timestamps[i] <= timestamps[i - 1] {
                return Err(ForecastError::TimestampError(
                    "timestamps must be strictly increasing".to_string(),
                ));
            }
        }

        let frequency = infer_frequency(&timestamps);

        Ok(Self {
            timestamps,
            values,
            frequency,
        })
    }

    /// Create a monthly series starting at the first day of `year`-`month`.
    pub fn monthly(year: i32, month: u32, values: Vec<f64>) -> Result<Self> {
        let start = Utc
            .with_ymd_and_hms(year, month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| {
                ForecastError::TimestampError(format!("invalid start month {year}-{month}"))
            })?;

        let timestamps = (0..values.len())
            .map(|i| {
                start
                    .checked_add_months(Months::new(i as u32))
                    .ok_or_else(|| ForecastError::TimestampError("month overflow".to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            timestamps,
            values,
            frequency: Frequency::Monthly,
        })
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the observation values.
    pub fn primary_values(&self) -> &[f64] {
        &self.values
    }

    /// Get the timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Get the detected sampling frequency.
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Check for NaN or infinite observations.
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Timestamps for the `horizon` observations that would follow this series.
    ///
    /// Only monthly and quarterly series can be extended; irregular series
    /// return an error.
    pub fn future_timestamps(&self, horizon: usize) -> Result<Vec<DateTime<Utc>>> {
        let step = match self.frequency {
            Frequency::Monthly => 1,
            Frequency::Quarterly => 3,
            Frequency::Irregular => {
                return Err(ForecastError::FrequencyInference(
                    "cannot extend an irregular series".to_string(),
                ))
            }
        };
        let last = *self.timestamps.last().ok_or(ForecastError::EmptyData)?;

        (1..=horizon)
            .map(|h| {
                last.checked_add_months(Months::new((h * step) as u32))
                    .ok_or_else(|| ForecastError::TimestampError("month overflow".to_string()))
            })
            .collect()
    }
}

fn infer_frequency(timestamps: &[DateTime<Utc>]) -> Frequency {
    if timestamps.len() < 2 {
        return Frequency::Irregular;
    }

    let month_index = |t: &DateTime<Utc>| t.year() as i64 * 12 + t.month0() as i64;
    let steps: Vec<i64> = timestamps
        .windows(2)
        .map(|w| month_index(&w[1]) - month_index(&w[0]))
        .collect();
    let same_day = timestamps.iter().all(|t| t.day() == timestamps[0].day());

    if !same_day {
        Frequency::Irregular
    } else if steps.iter().all(|&s| s == 1) {
        Frequency::Monthly
    } else if steps.iter().all(|&s| s == 3) {
        Frequency::Quarterly
    } else {
        Frequency::Irregular
    }
}
