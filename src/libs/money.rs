//! Monetary amounts stored as integer cents.
//!
//! All rates, line amounts, invoice totals, and payments move through this
//! type. Keeping money in integer cents sidesteps floating point drift when
//! amounts are summed or compared, which matters for payment status
//! transitions that check exact equality against an invoice total.
//!
//! Amounts parse from and render to plain decimal strings ("125", "125.5",
//! "125.50"). Database columns store the raw cent count as `INTEGER`.

use anyhow::bail;
use rusqlite::types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// An amount of money in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(pub i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates an amount from a raw cent count.
    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the raw cent count.
    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Amount accrued at this hourly rate over a duration in seconds.
    ///
    /// The result is rounded to the nearest cent, half away from zero.
    /// Two hours at 50.00/h yields exactly 100.00.
    pub fn for_seconds(&self, seconds: i64) -> Money {
        Money((self.0 * seconds + 1800) / 3600)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.abs();
        write!(f, "{}{}.{:02}", sign, cents / 100, cents % 100)
    }
}

impl FromStr for Money {
    type Err = anyhow::Error;

    /// Parses a decimal amount with at most two fractional digits.
    ///
    /// Accepts "50", "50.5", "50.00" and an optional leading "$".
    /// Negative amounts are rejected; nothing in the application creates
    /// them through user input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let (whole, frac) = match trimmed.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (trimmed, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            bail!("amount is empty");
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            bail!("invalid amount '{}'", s);
        }
        if frac.len() > 2 {
            bail!("amounts use at most two decimal places");
        }
        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse()? };
        let frac_cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>()? * 10,
            _ => frac.parse()?,
        };
        Ok(Money(whole * 100 + frac_cents))
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        Money(iter.map(|m| m.0).sum())
    }
}

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Money)
    }
}
