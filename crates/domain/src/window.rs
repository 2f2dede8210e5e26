//! Date windows for report-style endpoints

use chrono::{Duration, NaiveDate};

use crate::errors::{CallwireError, Result};
use crate::query::{QueryParams, QueryValue};

/// Widest span most reporting endpoints accept.
pub const DEFAULT_MAX_SPAN_DAYS: i64 = 30;

/// Inclusive `[from, to]` calendar range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateWindow {
    /// Range whose span may not exceed `max_span`.
    ///
    /// # Errors
    /// Returns a validation error on `from` when it is after `to`, and on
    /// `to` when the span is wider than `max_span`.
    pub fn new(from: NaiveDate, to: NaiveDate, max_span: Duration) -> Result<Self> {
        let window = Self::unbounded(from, to)?;
        if to - from > max_span {
            return Err(CallwireError::validation(
                "to",
                format!(
                    "range {from}..{to} spans {} days, more than the allowed {}",
                    (to - from).num_days(),
                    max_span.num_days()
                ),
            ));
        }
        Ok(window)
    }

    /// Range limited to [`DEFAULT_MAX_SPAN_DAYS`].
    ///
    /// # Errors
    /// See [`DateWindow::new`].
    pub fn within_default_span(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        Self::new(from, to, Duration::days(DEFAULT_MAX_SPAN_DAYS))
    }

    /// Range with only the ordering check, for endpoints without a span limit.
    ///
    /// # Errors
    /// Returns a validation error on `from` when it is after `to`.
    pub fn unbounded(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(CallwireError::validation("from", format!("{from} is after {to}")));
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn span(&self) -> Duration {
        self.to - self.from
    }

    /// Write `from` / `to` as calendar dates.
    pub fn apply_to(&self, query: &mut QueryParams) {
        query.append("from", QueryValue::calendar(self.from)).append("to", QueryValue::calendar(self.to));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i64::from(d))
    }

    #[test]
    fn accepts_spans_up_to_the_maximum() {
        let window = DateWindow::within_default_span(day(0), day(30)).unwrap();
        assert_eq!(window.span().num_days(), 30);

        assert!(DateWindow::within_default_span(day(5), day(5)).is_ok());
    }

    #[test]
    fn rejects_spans_beyond_the_maximum() {
        for end in [31, 45, 365] {
            let err = DateWindow::within_default_span(day(0), day(end)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert_eq!(err.parameter(), Some("to"));
        }
    }

    #[test]
    fn rejects_reversed_ranges() {
        let err = DateWindow::within_default_span(day(10), day(9)).unwrap_err();
        assert_eq!(err.parameter(), Some("from"));

        assert!(DateWindow::unbounded(day(10), day(9)).is_err());
        assert!(DateWindow::unbounded(day(0), day(400)).is_ok());
    }

    #[test]
    fn renders_calendar_dates() {
        let window = DateWindow::within_default_span(day(0), day(14)).unwrap();
        let mut query = QueryParams::new();
        window.apply_to(&mut query);

        assert_eq!(query.get("from"), Some("2024-01-01"));
        assert_eq!(query.get("to"), Some("2024-01-15"));
    }
}
