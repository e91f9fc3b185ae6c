use std::{fmt, iter::Sum, ops::Add, str::FromStr};

use thiserror::Error;

/// Largest amount, in whole currency units, accepted from user input.
const MAX_PRICE: f64 = 1e12;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("'{0}' is not a valid price")]
    NotANumber(String),
    #[error("price must not be negative, got '{0}'")]
    Negative(String),
}

/// A non-negative amount of money normalized to two fractional digits.
///
/// Stored as integer cents so sums never accumulate floating point error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    cents: i64,
}

impl Price {
    pub const ZERO: Price = Price { cents: 0 };
}

impl FromStr for Price {
    type Err = PriceError;

    /// Parses a decimal amount such as `"50"`, `"50.5"` or `"0.00"`, rounding
    /// to the nearest cent.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| PriceError::NotANumber(trimmed.to_string()))?;

        if !value.is_finite() || value > MAX_PRICE {
            return Err(PriceError::NotANumber(trimmed.to_string()));
        }
        if value < 0.0 {
            return Err(PriceError::Negative(trimmed.to_string()));
        }

        Ok(Self {
            cents: (value * 100.0).round() as i64,
        })
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Self) -> Self::Output {
        Price {
            cents: self.cents.saturating_add(rhs.cents),
        }
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Price::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Price> for Price {
    fn sum<I: Iterator<Item = &'a Price>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
