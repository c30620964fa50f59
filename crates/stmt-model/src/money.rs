//! Fixed-point money values.
//!
//! Amounts are carried as signed minor units (cents) and rendered with
//! exactly two decimal places. Statement files hand us amounts as strings
//! with bank-specific decimal separators and stray spacing, or as native
//! spreadsheet floats; both conversion paths land here so no arithmetic is
//! ever done on floats.

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};
use std::str::FromStr;

use crate::error::ModelError;

/// A signed amount in minor units (2 decimal places).
///
/// Negative means an outflow from the own account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    pub fn minor(self) -> i64 {
        self.0
    }

    /// Round a native spreadsheet number to 2 decimals, half away from zero.
    pub fn from_f64(value: f64) -> Self {
        Money((value * 100.0).round() as i64)
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// -1, 0, or +1.
    pub fn signum(self) -> i64 {
        self.0.signum()
    }

    /// Force the sign of `self` to match `other` (magnitude unchanged).
    pub fn with_sign_of(self, other: Money) -> Self {
        if other.is_negative() {
            Money(-self.0.abs())
        } else {
            Money(self.0.abs())
        }
    }

    /// Parse a statement amount string.
    ///
    /// Spaces (including non-breaking ones) are stripped; a configured
    /// non-standard decimal separator is mapped to `.` before parsing.
    /// Fractional digits beyond two are rounded half away from zero.
    pub fn parse(input: &str, decimal_separator: Option<char>) -> Result<Self, ModelError> {
        let err = || ModelError::MoneyParse {
            value: input.to_string(),
        };

        let mut s: String = input
            .trim()
            .chars()
            .filter(|c| *c != ' ' && *c != '\u{a0}')
            .collect();
        if let Some(sep) = decimal_separator {
            if sep != '.' {
                s = s.replace(sep, ".");
            }
        }
        if s.is_empty() {
            return Err(err());
        }

        let (sign, digits) = match s.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, s.strip_prefix('+').unwrap_or(&s)),
        };

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(err());
        }

        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| err())?
        };

        let mut cents: i64 = 0;
        let mut round_up = false;
        for (pos, c) in frac_part.chars().enumerate() {
            let d = i64::from(c as u8 - b'0');
            match pos {
                0 => cents += d * 10,
                1 => cents += d,
                2 => round_up = d >= 5,
                _ => {}
            }
        }
        if round_up {
            cents += 1;
        }

        Ok(Money(sign * (whole * 100 + cents)))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s, None)
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl serde::Serialize for Money {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Money {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
