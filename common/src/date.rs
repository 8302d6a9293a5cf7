use chrono::{Local, NaiveDate};

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y%m%d";

/// The day that date features are measured against.
///
/// `Today` reproduces the age-in-days behaviour: every train and predict call
/// resolves the wall clock anew, so a model trained yesterday and queried
/// today sees all date features shifted by one day. `Fixed` pins the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceDate {
    /// The local calendar date at the time of the call
    #[default]
    Today,
    /// A fixed calendar date
    Fixed(NaiveDate),
}

impl ReferenceDate {
    /// Resolve to a concrete calendar date
    pub fn resolve(&self) -> NaiveDate {
        match self {
            ReferenceDate::Today => Local::now().date_naive(),
            ReferenceDate::Fixed(date) => *date,
        }
    }
}

/// Parse an 8-digit YYYYMMDD value.
/// Integral numeric renderings such as "20170508.0" are accepted as well.
pub fn parse_yyyymmdd(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    let digits = match trimmed.contains('.').then(|| trimmed.parse::<f64>()) {
        Some(Ok(v)) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => format!("{:.0}", v),
        _ => trimmed.to_string(),
    };
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::MalformedDate(raw.to_string()));
    }

    NaiveDate::parse_from_str(&digits, DATE_FORMAT).map_err(|_| Error::MalformedDate(raw.to_string()))
}

/// Render a date back into its YYYYMMDD form
pub fn to_yyyymmdd(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Number of whole days from `date` until `reference`, negative for future dates
#[inline(always)]
pub fn days_between(date: &NaiveDate, reference: &NaiveDate) -> i64 {
    reference.signed_duration_since(*date).num_days()
}

/// Every day from `start` to `end`, both inclusive. Empty if `start` is after `end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}
