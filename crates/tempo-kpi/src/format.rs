//! Value formatting shared by every KPI consumer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a KPI value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    Percent,
    Hours,
    Count,
    Decimal,
}

impl FormatKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percent => "percent",
            Self::Hours => "hours",
            Self::Count => "count",
            Self::Decimal => "decimal",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placeholder for a KPI with no value.
pub const NOT_AVAILABLE: &str = "n/a";

/// Render `value` for display.
///
/// - percent: `12.5%`
/// - hours: `1,234.5 h`
/// - count: `7`
/// - decimal: `72.4`
#[must_use]
pub fn format_value(kind: FormatKind, value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return NOT_AVAILABLE.to_string();
    };
    match kind {
        FormatKind::Percent => format!("{value:.1}%"),
        FormatKind::Hours => format!("{} h", group_thousands(value)),
        FormatKind::Count => format!("{value:.0}"),
        FormatKind::Decimal => format!("{value:.1}"),
    }
}

/// One decimal place with `,` between thousands.
fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.1}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "0"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let negative = value < 0.0 && fixed != "0.0";
    format!("{}{grouped}.{fraction}", if negative { "-" } else { "" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(FormatKind::Percent, Some(12.345), "12.3%")]
    #[case(FormatKind::Percent, Some(-4.0), "-4.0%")]
    #[case(FormatKind::Hours, Some(1_234.56), "1,234.6 h")]
    #[case(FormatKind::Hours, Some(999.0), "999.0 h")]
    #[case(FormatKind::Hours, Some(1_000_000.0), "1,000,000.0 h")]
    #[case(FormatKind::Hours, Some(-2_500.0), "-2,500.0 h")]
    #[case(FormatKind::Count, Some(7.0), "7")]
    #[case(FormatKind::Decimal, Some(72.44), "72.4")]
    #[case(FormatKind::Decimal, None, "n/a")]
    #[case(FormatKind::Hours, Some(f64::NAN), "n/a")]
    fn renders(#[case] kind: FormatKind, #[case] value: Option<f64>, #[case] expected: &str) {
        assert_eq!(format_value(kind, value), expected);
    }

    #[test]
    fn negative_zero_has_no_sign() {
        assert_eq!(format_value(FormatKind::Hours, Some(-0.01)), "0.0 h");
    }
}
