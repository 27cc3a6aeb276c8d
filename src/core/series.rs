//! TimeSeries data structure for representing dated observations.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Duration, NaiveDate};

/// Resampling frequency for a regularly spaced series.
///
/// Buckets are labeled by their period end, so monthly data lands on the
/// last day of each month and weekly data on the closing Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// Parse a single-letter frequency code (D, W, M, Q, Y).
    pub fn parse(code: &str) -> Result<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "D" => Ok(Self::Daily),
            "W" => Ok(Self::Weekly),
            "M" => Ok(Self::Monthly),
            "Q" => Ok(Self::Quarterly),
            "Y" => Ok(Self::Yearly),
            other => Err(ForecastError::InvalidConfig(format!(
                "unknown frequency code: {other:?} (expected D, W, M, Q or Y)"
            ))),
        }
    }

    /// The single-letter code for this frequency.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Daily => "D",
            Self::Weekly => "W",
            Self::Monthly => "M",
            Self::Quarterly => "Q",
            Self::Yearly => "Y",
        }
    }

    /// Map a date onto its bucket label (the period end containing it).
    pub fn bucket(&self, date: NaiveDate) -> Result<NaiveDate> {
        let label = match self {
            Self::Daily => Some(date),
            Self::Weekly => {
                let to_sunday = (7 - date.weekday().num_days_from_sunday()) % 7;
                date.checked_add_signed(Duration::days(i64::from(to_sunday)))
            }
            Self::Monthly => month_end(date.year(), date.month()),
            Self::Quarterly => {
                let quarter_month = ((date.month() - 1) / 3) * 3 + 3;
                month_end(date.year(), quarter_month)
            }
            Self::Yearly => NaiveDate::from_ymd_opt(date.year(), 12, 31),
        };
        label.ok_or_else(|| ForecastError::TimestampError(format!("date out of range: {date}")))
    }

    /// The label of the bucket immediately after `label`.
    pub fn next_bucket(&self, label: NaiveDate) -> Result<NaiveDate> {
        let day_after = label
            .succ_opt()
            .ok_or_else(|| ForecastError::TimestampError(format!("date out of range: {label}")))?;
        self.bucket(day_after)
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Last calendar day of the given month.
fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// A univariate time series: dated observations in strictly increasing
/// order, optionally carrying the frequency it was resampled to.
///
/// Values may contain NaN only as leading entries of a freshly
/// preprocessed series whose first buckets could not be filled.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
    frequency: Option<Frequency>,
}

impl TimeSeries {
    /// Create a new series, validating that dates are strictly increasing.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: dates.len(),
                got: values.len(),
            });
        }
        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(ForecastError::TimestampError(
                    "dates must be strictly increasing".to_string(),
                ));
            }
        }
        Ok(Self {
            dates,
            values,
            frequency: None,
        })
    }

    /// Attach the frequency this series is spaced at.
    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Observation dates.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Observation values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Declared frequency, if the series has been resampled.
    pub fn frequency(&self) -> Option<Frequency> {
        self.frequency
    }

    /// Whether any value is NaN or infinite.
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Extract the half-open range `[start, end)` as a new series.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(ForecastError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.len(),
                got: end,
            });
        }
        Ok(TimeSeries {
            dates: self.dates[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
            frequency: self.frequency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_daily(n: usize) -> Vec<NaiveDate> {
        (0..n)
            .map(|i| date(2024, 1, 1) + Duration::days(i as i64))
            .collect()
    }

    #[test]
    fn series_constructs_and_exposes_data() {
        let dates = make_daily(4);
        let values = vec![1.0, 2.0, 3.0, 4.0];
        let ts = TimeSeries::new(dates.clone(), values.clone()).unwrap();

        assert_eq!(ts.len(), 4);
        assert!(!ts.is_empty());
        assert_eq!(ts.dates(), &dates);
        assert_eq!(ts.values(), &values);
        assert!(ts.frequency().is_none());
    }

    #[test]
    fn series_rejects_non_increasing_dates() {
        let dates = vec![date(2024, 1, 2), date(2024, 1, 1)];
        let result = TimeSeries::new(dates, vec![1.0, 2.0]);
        assert!(matches!(result, Err(ForecastError::TimestampError(_))));

        let dates = vec![date(2024, 1, 1), date(2024, 1, 1)];
        let result = TimeSeries::new(dates, vec![1.0, 2.0]);
        assert!(matches!(result, Err(ForecastError::TimestampError(_))));
    }

    #[test]
    fn series_rejects_length_mismatch() {
        let result = TimeSeries::new(make_daily(3), vec![1.0, 2.0]);
        assert!(matches!(
            result,
            Err(ForecastError::DimensionMismatch { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn series_slice_preserves_frequency() {
        let ts = TimeSeries::new(make_daily(5), vec![1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap()
            .with_frequency(Frequency::Daily);

        let sliced = ts.slice(1, 4).unwrap();
        assert_eq!(sliced.len(), 3);
        assert_eq!(sliced.values(), &[2.0, 3.0, 4.0]);
        assert_eq!(sliced.frequency(), Some(Frequency::Daily));

        assert!(ts.slice(3, 2).is_err());
        assert!(ts.slice(0, 6).is_err());
    }

    #[test]
    fn series_detects_missing_values() {
        let ts = TimeSeries::new(make_daily(3), vec![1.0, f64::NAN, 3.0]).unwrap();
        assert!(ts.has_missing_values());

        let ts = TimeSeries::new(make_daily(2), vec![1.0, 2.0]).unwrap();
        assert!(!ts.has_missing_values());
    }

    #[test]
    fn frequency_parses_codes() {
        assert_eq!(Frequency::parse("D").unwrap(), Frequency::Daily);
        assert_eq!(Frequency::parse("w").unwrap(), Frequency::Weekly);
        assert_eq!(Frequency::parse(" M ").unwrap(), Frequency::Monthly);
        assert_eq!(Frequency::parse("Q").unwrap(), Frequency::Quarterly);
        assert_eq!(Frequency::parse("Y").unwrap(), Frequency::Yearly);
        assert!(matches!(
            Frequency::parse("H"),
            Err(ForecastError::InvalidConfig(_))
        ));
    }

    #[test]
    fn daily_buckets_are_identity() {
        let d = date(2024, 3, 15);
        assert_eq!(Frequency::Daily.bucket(d).unwrap(), d);
        assert_eq!(
            Frequency::Daily.next_bucket(d).unwrap(),
            date(2024, 3, 16)
        );
    }

    #[test]
    fn weekly_buckets_close_on_sunday() {
        // 2024-01-01 is a Monday; its week closes on Sunday the 7th.
        assert_eq!(
            Frequency::Weekly.bucket(date(2024, 1, 1)).unwrap(),
            date(2024, 1, 7)
        );
        // A Sunday is its own label.
        assert_eq!(
            Frequency::Weekly.bucket(date(2024, 1, 7)).unwrap(),
            date(2024, 1, 7)
        );
        assert_eq!(
            Frequency::Weekly.next_bucket(date(2024, 1, 7)).unwrap(),
            date(2024, 1, 14)
        );
    }

    #[test]
    fn monthly_buckets_land_on_month_end() {
        assert_eq!(
            Frequency::Monthly.bucket(date(2024, 2, 10)).unwrap(),
            date(2024, 2, 29)
        );
        assert_eq!(
            Frequency::Monthly.next_bucket(date(2024, 2, 29)).unwrap(),
            date(2024, 3, 31)
        );
    }

    #[test]
    fn quarterly_and_yearly_buckets() {
        assert_eq!(
            Frequency::Quarterly.bucket(date(2024, 5, 20)).unwrap(),
            date(2024, 6, 30)
        );
        assert_eq!(
            Frequency::Quarterly.next_bucket(date(2024, 6, 30)).unwrap(),
            date(2024, 9, 30)
        );
        assert_eq!(
            Frequency::Yearly.bucket(date(2024, 5, 20)).unwrap(),
            date(2024, 12, 31)
        );
        assert_eq!(
            Frequency::Yearly.next_bucket(date(2024, 12, 31)).unwrap(),
            date(2025, 12, 31)
        );
    }
}
