use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub},
    str::FromStr,
};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

//--------------------------------------       Money       -----------------------------------------------------------

/// A currency amount, backed by an integer number of cents.
///
/// The remote processor expresses amounts as decimal strings ("13.41"), so `Money` parses from and renders to that
/// form. Internally everything is exact integer arithmetic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

#[derive(Debug, Clone, Error)]
#[error("Invalid currency amount: {0}")]
pub struct MoneyError(String);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// `pct` percent of this amount, truncated towards zero.
    pub fn percent(&self, pct: i64) -> Self {
        Self(self.0 * pct / 100)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let mut parts = digits.split('.');
        let whole = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| MoneyError(s.to_string()))?
            .parse::<i64>()
            .map_err(|e| MoneyError(format!("{s}: {e}")))?;
        let cents = match parts.next() {
            None => 0,
            Some(frac) if frac.len() == 1 => 10 * frac.parse::<i64>().map_err(|e| MoneyError(format!("{s}: {e}")))?,
            Some(frac) if frac.len() == 2 => frac.parse::<i64>().map_err(|e| MoneyError(format!("{s}: {e}")))?,
            Some(frac) => return Err(MoneyError(format!("{s}: too many fractional digits ({})", frac.len()))),
        };
        if parts.next().is_some() {
            return Err(MoneyError(s.to_string()));
        }
        let value = 100 * whole + cents;
        Ok(Self(if negative { -value } else { value }))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(f64),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s.parse().map_err(de::Error::custom),
            #[allow(clippy::cast_possible_truncation)]
            Raw::Number(n) => Ok(Money((n * 100.0).round() as i64)),
        }
    }
}
