//! Turn a raw table into a clean, regularly spaced univariate series.

use crate::core::{Frequency, TimeSeries};
use crate::data::table::RawTable;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeMap;

/// Width of the trailing window used to fill empty buckets.
const FILL_WINDOW: usize = 3;

/// Column selection and parsing options for preprocessing.
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Name of the column holding dates.
    pub date_column: String,
    /// Name of the column holding the target value.
    pub target_column: String,
    /// chrono format string for the date column, e.g. `%Y-%m-%d`.
    pub date_format: String,
    /// Frequency the series is resampled to.
    pub frequency: Frequency,
}

/// Build a clean series from an uploaded table.
///
/// The policy, in order: parse dates and coerce targets, dropping any row
/// where either fails; sum rows sharing a timestamp (several transactions
/// on one day collapse into one observation); bucket to the requested
/// frequency, summing within each bucket; fill empty buckets with the
/// trailing rolling mean of the previous [`FILL_WINDOW`] values. A gap at
/// the very start has nothing behind it and stays NaN.
pub fn preprocess(table: &RawTable, config: &PreprocessConfig) -> Result<TimeSeries> {
    let date_index = table
        .column_index(&config.date_column)
        .ok_or_else(|| ForecastError::ColumnNotFound(config.date_column.clone()))?;
    let target_index = table
        .column_index(&config.target_column)
        .ok_or_else(|| ForecastError::ColumnNotFound(config.target_column.clone()))?;

    // Parse, coerce, and drop in a single pass. Rows are keyed directly by
    // their bucket label so duplicate timestamps and same-bucket rows are
    // summed together.
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut dropped = 0usize;
    for row in table.rows() {
        let date = row
            .get(date_index)
            .and_then(|cell| NaiveDate::parse_from_str(cell.trim(), &config.date_format).ok());
        let value = row
            .get(target_index)
            .and_then(|cell| cell.trim().parse::<f64>().ok());
        match (date, value) {
            (Some(date), Some(value)) => {
                *buckets.entry(config.frequency.bucket(date)?).or_insert(0.0) += value;
            }
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!("dropped {dropped} rows with unparseable date or target");
    }

    let (first, last) = match (buckets.keys().next(), buckets.keys().next_back()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Err(ForecastError::EmptyData),
    };

    // Lay the buckets out on a dense grid; slots with no source rows are
    // NaN until filled below.
    let mut dates = Vec::new();
    let mut values = Vec::new();
    let mut cursor = first;
    loop {
        dates.push(cursor);
        values.push(buckets.get(&cursor).copied().unwrap_or(f64::NAN));
        if cursor == last {
            break;
        }
        cursor = config.frequency.next_bucket(cursor)?;
    }

    let filled = fill_gaps(&mut values);
    if filled > 0 {
        debug!(
            "filled {filled} empty {} buckets with trailing rolling mean",
            config.frequency
        );
    }

    Ok(TimeSeries::new(dates, values)?.with_frequency(config.frequency))
}

/// Fill NaN slots with the mean of the up-to-`FILL_WINDOW` preceding
/// values, filled slots included. At least one valid predecessor is
/// required, so leading NaN slots stay NaN.
fn fill_gaps(values: &mut [f64]) -> usize {
    let mut filled = 0;
    for i in 0..values.len() {
        if !values[i].is_nan() {
            continue;
        }
        let window = &values[i.saturating_sub(FILL_WINDOW)..i];
        let valid: Vec<f64> = window.iter().copied().filter(|v| !v.is_nan()).collect();
        if !valid.is_empty() {
            values[i] = valid.iter().sum::<f64>() / valid.len() as f64;
            filled += 1;
        }
    }
    filled
}
