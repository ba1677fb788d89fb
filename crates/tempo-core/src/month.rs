//! Calendar month tokens and the period resolver.
//!
//! A [`Month`] is a `YYYY-MM` token that orders chronologically. A
//! [`MonthFilter`] is either a single month or an inclusive range, and
//! [`MonthFilter::resolve`] expands it into the ordered, duplicate-free list
//! of months every metric computer consumes.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// A calendar month, serialized as `"YYYY-MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    year: i32,
    month: u32,
}

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

impl Month {
    /// `0001-01`, the earliest representable month.
    pub const MIN: Self = Self {
        year: MIN_YEAR,
        month: 1,
    };

    /// `9999-12`, the latest representable month.
    pub const MAX: Self = Self {
        year: MAX_YEAR,
        month: 12,
    };

    /// Build a month from its parts.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidMonth` if `month` is outside `1..=12` or the
    /// year is outside `1..=9999`.
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        if !(1..=12).contains(&month) || !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CoreError::InvalidMonth(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    /// The month containing the given calendar day, clamped to
    /// [`MIN`](Self::MIN)..=[`MAX`](Self::MAX).
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        if date.year() < MIN_YEAR {
            return Self::MIN;
        }
        if date.year() > MAX_YEAR {
            return Self::MAX;
        }
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// The following calendar month. Saturates at [`MAX`](Self::MAX).
    #[must_use]
    pub const fn succ(self) -> Self {
        if self.year >= MAX_YEAR && self.month == 12 {
            self
        } else if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The preceding calendar month. Saturates at [`MIN`](Self::MIN).
    #[must_use]
    pub const fn pred(self) -> Self {
        if self.year <= MIN_YEAR && self.month == 1 {
            self
        } else if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The `n` months immediately before this one, oldest first. Fewer
    /// than `n` near [`MIN`](Self::MIN).
    #[must_use]
    pub fn trailing(self, n: usize) -> Vec<Self> {
        let mut months = Vec::with_capacity(n);
        let mut cursor = self;
        for _ in 0..n {
            let previous = cursor.pred();
            if previous == cursor {
                break;
            }
            cursor = previous;
            months.push(cursor);
        }
        months.reverse();
        months
    }

    /// Whether the given calendar day falls in this month.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        Self::from_date(date) == self
    }
}

impl FromStr for Month {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidMonth(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4
            || month.len() != 2
            || !year.bytes().all(|b| b.is_ascii_digit())
            || !month.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Month {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(value: Month) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl JsonSchema for Month {
    fn schema_name() -> Cow<'static, str> {
        "Month".into()
    }

    fn json_schema(_generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "type": "string",
            "pattern": "^[0-9]{4}-(0[1-9]|1[0-2])$"
        })
    }
}

/// A month filter: a single month or an inclusive range.
///
/// Serialized untagged, so `"2024-11"` and
/// `{"start": "2024-11", "end": "2025-02"}` are both accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum MonthFilter {
    Single(Month),
    Range { start: Month, end: Month },
}

impl MonthFilter {
    /// Parse a single-month filter from a `YYYY-MM` token.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidMonth` for a malformed token.
    pub fn single(token: &str) -> Result<Self, CoreError> {
        Ok(Self::Single(token.parse()?))
    }

    /// Parse a range filter from two `YYYY-MM` tokens.
    ///
    /// The range is validated lazily by [`resolve`](Self::resolve).
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidMonth` for a malformed token.
    pub fn range(start: &str, end: &str) -> Result<Self, CoreError> {
        Ok(Self::Range {
            start: start.parse()?,
            end: end.parse()?,
        })
    }

    /// Expand the filter into concrete months, ascending and duplicate-free.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidRange` when a range starts after it ends.
    pub fn resolve(&self) -> Result<Vec<Month>, CoreError> {
        match *self {
            Self::Single(month) => Ok(vec![month]),
            Self::Range { start, end } => {
                if start > end {
                    return Err(CoreError::InvalidRange {
                        start: start.to_string(),
                        end: end.to_string(),
                    });
                }
                let mut months = vec![start];
                let mut cursor = start;
                while cursor < end {
                    cursor = cursor.succ();
                    months.push(cursor);
                }
                Ok(months)
            }
        }
    }

    /// The last month covered by the filter.
    #[must_use]
    pub const fn end(&self) -> Month {
        match *self {
            Self::Single(month) | Self::Range { end: month, .. } => month,
        }
    }
}

impl From<Month> for MonthFilter {
    fn from(value: Month) -> Self {
        Self::Single(value)
    }
}

/// Free-function form of [`MonthFilter::resolve`].
///
/// # Errors
///
/// Returns `CoreError::InvalidRange` when a range starts after it ends.
pub fn resolve_months(filter: &MonthFilter) -> Result<Vec<Month>, CoreError> {
    filter.resolve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn m(token: &str) -> Month {
        token.parse().unwrap()
    }

    #[test]
    fn single_resolves_to_one_month() {
        let months = MonthFilter::single("2025-03").unwrap().resolve().unwrap();
        assert_eq!(months, vec![m("2025-03")]);
    }

    #[test]
    fn range_crosses_year_boundary() {
        let months = MonthFilter::range("2024-11", "2025-02")
            .unwrap()
            .resolve()
            .unwrap();
        let tokens: Vec<String> = months.iter().map(ToString::to_string).collect();
        assert_eq!(tokens, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
    }

    #[test]
    fn range_is_inclusive_sorted_and_unique() {
        let months = MonthFilter::range("2023-06", "2025-06")
            .unwrap()
            .resolve()
            .unwrap();
        assert_eq!(months.len(), 25);
        assert_eq!(months.first(), Some(&m("2023-06")));
        assert_eq!(months.last(), Some(&m("2025-06")));
        assert!(months.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn degenerate_range_yields_one_month() {
        let months = MonthFilter::range("2025-01", "2025-01")
            .unwrap()
            .resolve()
            .unwrap();
        assert_eq!(months, vec![m("2025-01")]);
    }

    #[test]
    fn reversed_range_is_an_error() {
        let err = MonthFilter::range("2025-02", "2024-11")
            .unwrap()
            .resolve()
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidRange { .. }));
    }

    #[rstest]
    #[case("2025-13")]
    #[case("2025-00")]
    #[case("2025-1")]
    #[case("25-01")]
    #[case("2025/01")]
    #[case("0000-06")]
    #[case("abcd-ef")]
    #[case("")]
    fn malformed_tokens_are_rejected(#[case] token: &str) {
        assert!(matches!(
            token.parse::<Month>(),
            Err(CoreError::InvalidMonth(_))
        ));
    }

    #[test]
    fn succ_and_pred_wrap_years() {
        assert_eq!(m("2024-12").succ(), m("2025-01"));
        assert_eq!(m("2025-01").pred(), m("2024-12"));
    }

    #[test]
    fn succ_and_pred_saturate_at_the_year_bounds() {
        assert_eq!(Month::MIN.pred(), Month::MIN);
        assert_eq!(Month::MAX.succ(), Month::MAX);
        assert_eq!(Month::MIN.to_string(), "0001-01");
        assert_eq!(m(&Month::MIN.pred().to_string()), Month::MIN);

        assert_eq!(m("0001-03").trailing(5), vec![m("0001-01"), m("0001-02")]);
        let tail = MonthFilter::range("9999-11", "9999-12").unwrap().resolve().unwrap();
        assert_eq!(tail, vec![m("9999-11"), Month::MAX]);
        assert!(Month::new(0, 1).is_err());
    }

    #[test]
    fn trailing_returns_prior_months_oldest_first() {
        assert_eq!(
            m("2025-02").trailing(3),
            vec![m("2024-11"), m("2024-12"), m("2025-01")]
        );
        assert!(m("2025-02").trailing(0).is_empty());
    }

    #[test]
    fn filter_serde_accepts_both_shapes() {
        let single: MonthFilter = serde_json::from_str("\"2024-11\"").unwrap();
        assert_eq!(single, MonthFilter::Single(m("2024-11")));

        let range: MonthFilter =
            serde_json::from_str(r#"{"start":"2024-11","end":"2025-02"}"#).unwrap();
        assert_eq!(
            range,
            MonthFilter::Range {
                start: m("2024-11"),
                end: m("2025-02")
            }
        );
    }

    #[test]
    fn month_serializes_as_token() {
        assert_eq!(serde_json::to_string(&m("2024-03")).unwrap(), "\"2024-03\"");
        assert!(serde_json::from_str::<Month>("\"2024-3\"").is_err());
    }

    #[test]
    fn from_date_and_contains() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap();
        assert_eq!(Month::from_date(date), m("2025-02"));
        assert!(m("2025-02").contains(date));
        assert!(!m("2025-03").contains(date));
    }
}
