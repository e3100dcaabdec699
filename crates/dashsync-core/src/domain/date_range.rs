use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, Duration};

use crate::ValidationError;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Window covered by queries that take no explicit range.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Inclusive reporting window sent as `startDate` / `endDate`.
///
/// Ordering of the two bounds is not checked; the backend decides what an
/// inverted range means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(with = "iso_date")]
    pub start_date: Date,
    #[serde(with = "iso_date")]
    pub end_date: Date,
}

impl DateRange {
    pub const fn new(start_date: Date, end_date: Date) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// Parses a pair of `YYYY-MM-DD` strings.
    pub fn parse(start_date: &str, end_date: &str) -> Result<Self, ValidationError> {
        Ok(Self::new(parse_date(start_date)?, parse_date(end_date)?))
    }

    /// Builds a range from optional halves; a range needs both or neither.
    pub fn from_parts(
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Option<Self>, ValidationError> {
        match (start_date, end_date) {
            (Some(start), Some(end)) => Self::parse(start, end).map(Some),
            (None, None) => Ok(None),
            _ => Err(ValidationError::IncompleteDateRange),
        }
    }

    /// The window ending on `today` and starting `days` earlier.
    pub fn trailing_days(today: Date, days: i64) -> Self {
        let start_date = today
            .checked_sub(Duration::days(days))
            .unwrap_or(Date::MIN);
        Self::new(start_date, today)
    }

    /// The default thirty day window ending on `today`.
    pub fn default_window(today: Date) -> Self {
        Self::trailing_days(today, DEFAULT_WINDOW_DAYS)
    }

    pub fn start_param(&self) -> String {
        format_date(self.start_date)
    }

    pub fn end_param(&self) -> String {
        format_date(self.end_date)
    }

    /// Number of calendar days between the bounds.
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).whole_days()
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start_param(), self.end_param())
    }
}

pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .expect("calendar dates are always formattable as YYYY-MM-DD")
}

pub fn parse_date(input: &str) -> Result<Date, ValidationError> {
    Date::parse(input.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        ValidationError::InvalidDate {
            value: input.to_owned(),
        }
    })
}
