//! Fixed-point monetary amounts and display percentages.
//!
//! Amounts are whole minor units (cents) held in an `i64`. Balances are signed
//! because the ledger permits negative capital under the permissive withdrawal
//! policy and negative return corrections.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MINOR_PER_MAJOR: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("amount cannot be empty")]
    Empty,
    #[error("invalid amount '{0}'; expected digits with up to two decimal places")]
    Malformed(String),
    #[error("amount '{0}' is out of range")]
    OutOfRange(String),
}

/// A signed monetary amount in minor units.
///
/// Serializes as a decimal string (`"1250.00"`) so JSON consumers never see
/// floating point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Whole major units, e.g. `Money::from_major(1000)` holds `1000.00`.
    /// `None` when the amount does not fit in minor units.
    #[must_use]
    pub const fn from_major(major: i64) -> Option<Self> {
        match major.checked_mul(MINOR_PER_MAJOR) {
            Some(minor) => Some(Self(minor)),
            None => None,
        }
    }

    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    pub fn parse(raw: &str) -> Result<Self, MoneyParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MoneyParseError::Empty);
        }
        let malformed = || MoneyParseError::Malformed(trimmed.to_string());

        let (negative, unsigned) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if whole.is_empty()
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
            || fraction.len() > 2
            || (unsigned.contains('.') && fraction.is_empty())
        {
            return Err(malformed());
        }

        let out_of_range = || MoneyParseError::OutOfRange(trimmed.to_string());
        let whole: i64 = whole.parse().map_err(|_| out_of_range())?;
        let cents = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| malformed())? * 10,
            _ => fraction.parse::<i64>().map_err(|_| malformed())?,
        };
        let magnitude = whole
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|m| m.checked_add(cents))
            .ok_or_else(out_of_range)?;

        Ok(Self(if negative { -magnitude } else { magnitude }))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per = MINOR_PER_MAJOR.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / per, abs % per)
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_string()
    }
}

/// A percentage with two decimal places, stored in hundredths of a percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct Percentage(i64);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);

    #[must_use]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    #[must_use]
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// Gain or loss of `returns` relative to `capital`.
    ///
    /// No capital yields zero, and so does capital with exactly zero returns.
    /// Otherwise the ratio is rounded half away from zero to two places.
    #[must_use]
    pub fn gain_loss(capital: Money, returns: Money) -> Self {
        if capital.0 <= 0 || returns.0 == 0 {
            return Self::ZERO;
        }

        let numerator = i128::from(returns.0) * 10_000;
        let denominator = i128::from(capital.0);
        let mut quotient = numerator / denominator;
        let remainder = numerator % denominator;
        if remainder.abs() * 2 >= denominator {
            quotient += numerator.signum();
        }

        let clamped = i64::try_from(quotient).unwrap_or(if quotient > 0 {
            i64::MAX
        } else {
            i64::MIN
        });
        Self(clamped)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<Percentage> for String {
    fn from(value: Percentage) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_forms() {
        assert_eq!(Money::parse("12").unwrap(), Money::from_minor(1200));
        assert_eq!(Money::parse("12.3").unwrap(), Money::from_minor(1230));
        assert_eq!(Money::parse("12.34").unwrap(), Money::from_minor(1234));
        assert_eq!(Money::parse(" -0.05 ").unwrap(), Money::from_minor(-5));
        assert_eq!(Money::parse("+7").unwrap(), Money::from_major(7).unwrap());
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert_eq!(Money::parse(""), Err(MoneyParseError::Empty));
        for raw in ["abc", "1.234", "1.", ".5", "-", "1e3", "1,00", "NaN"] {
            assert!(
                matches!(Money::parse(raw), Err(MoneyParseError::Malformed(_))),
                "{raw} should be malformed"
            );
        }
        assert!(matches!(
            Money::parse("99999999999999999999"),
            Err(MoneyParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn display_pads_minor_units() {
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::from_minor(-1205).to_string(), "-12.05");
        assert_eq!(Money::from_major(1000).unwrap().to_string(), "1000.00");
        assert_eq!(Money::from_minor(i64::MIN).to_string(), "-92233720368547758.08");
    }

    #[test]
    fn from_major_refuses_amounts_beyond_minor_range() {
        assert_eq!(Money::from_major(i64::MAX / 100), Some(Money::from_minor(i64::MAX / 100 * 100)));
        assert_eq!(Money::from_major(i64::MAX / 100 + 1), None);
        assert_eq!(Money::from_major(i64::MIN), None);
    }

    #[test]
    fn serializes_as_decimal_string() {
        let json = serde_json::to_string(&Money::from_minor(25_050)).unwrap();
        assert_eq!(json, "\"250.50\"");
        let back: Money = serde_json::from_str("\"250.50\"").unwrap();
        assert_eq!(back, Money::from_minor(25_050));
    }

    #[test]
    fn gain_loss_zero_cases() {
        assert_eq!(Percentage::gain_loss(Money::ZERO, Money::ZERO).to_string(), "0.00");
        assert_eq!(
            Percentage::gain_loss(Money::from_major(1000).unwrap(), Money::ZERO).to_string(),
            "0.00"
        );
        assert_eq!(
            Percentage::gain_loss(Money::from_major(-50).unwrap(), Money::from_major(10).unwrap()),
            Percentage::ZERO
        );
    }

    #[test]
    fn gain_loss_ratio() {
        assert_eq!(
            Percentage::gain_loss(Money::from_major(1000).unwrap(), Money::from_major(250).unwrap()).to_string(),
            "25.00"
        );
        assert_eq!(
            Percentage::gain_loss(Money::from_major(3).unwrap(), Money::from_major(1).unwrap()).to_string(),
            "33.33"
        );
        assert_eq!(
            Percentage::gain_loss(Money::from_major(3).unwrap(), Money::from_major(2).unwrap()).to_string(),
            "66.67"
        );
        assert_eq!(
            Percentage::gain_loss(Money::from_major(3).unwrap(), Money::from_major(-1).unwrap()).to_string(),
            "-33.33"
        );
    }

    #[test]
    fn gain_loss_rounds_half_away_from_zero() {
        // 1 / 8 = 12.5% exactly; 1 / 800 = 0.125%
        assert_eq!(
            Percentage::gain_loss(Money::from_major(800).unwrap(), Money::from_major(1).unwrap()).hundredths(),
            13
        );
        assert_eq!(
            Percentage::gain_loss(Money::from_major(800).unwrap(), Money::from_major(-1).unwrap()).hundredths(),
            -13
        );
    }
}
