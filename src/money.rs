//! Money amounts stored as integer minor units (paise).
//!
//! Amounts cross the API and config boundary as decimal numbers with two
//! fractional digits and are converted once, through `rust_decimal`, into an
//! exact `i64` count of minor units. Everything after that (the ledger guard,
//! status derivation, SQL sums) is integer arithmetic, so an amount equal to
//! the pending balance always settles it exactly.

use crate::errors::{Error, Result};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use sea_orm::DeriveValueType;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt,
    ops::{Add, Sub},
    str::FromStr,
};

/// Fractional digits carried by an amount
const DECIMAL_PLACES: u32 = 2;

/// Minor units per major unit
const MINOR_PER_MAJOR: i64 = 100;

/// An amount of money in minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, DeriveValueType)]
pub struct Money(i64);

impl Money {
    /// Nothing
    pub const ZERO: Self = Self(0);

    /// Amount from a count of minor units (`from_minor(69_048)` is 690.48).
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Amount from whole major units.
    #[must_use]
    pub const fn from_major(major: i64) -> Self {
        Self(major * MINOR_PER_MAJOR)
    }

    /// Count of minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Strictly more than zero
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Strictly less than zero
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Rounds a decimal to two places (half away from zero) and converts it.
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        value
            .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::from(MINOR_PER_MAJOR))
            .and_then(|minor| minor.to_i64())
            .map(Self)
            .ok_or_else(|| Error::validation(format!("Amount {value} is out of range")))
    }

    /// The amount as a decimal with two fractional digits.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, DECIMAL_PLACES)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal().normalize())
    }
}

impl FromStr for Money {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| Error::validation(format!("Invalid amount '{s}': {e}")))?;
        Self::from_decimal(value)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal().to_f64().unwrap_or_default())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = match RawAmount::deserialize(deserializer)? {
            RawAmount::Number(n) if n.is_finite() => n.to_string(),
            RawAmount::Number(n) => {
                return Err(serde::de::Error::custom(format!("Invalid amount: {n}")));
            }
            RawAmount::Text(s) => s,
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}
