use anyhow::{Context, Error, Result};
use num_format::{Locale, ToFormattedString};
use num_traits::Zero;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// An amount of VNĐ. Holds an unrounded Decimal; grouping happens on display only.
/// Serializes as a bare number so stored vouchers keep plain numeric fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub Decimal);

impl TryFrom<f64> for Money {
    type Error = Error;

    fn try_from(f: f64) -> Result<Self> {
        let d = Decimal::from_f64(f).context(format!("Failed to convert {} to Money", f))?;
        Ok(Self(d))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0.normalize();
        let whole = n.trunc();
        let frac = n.fract();
        let mut grouped = match whole.abs().to_i128() {
            Some(w) => w.to_formatted_string(&Locale::en),
            None => whole.abs().to_string(),
        };
        if n.is_sign_negative() {
            grouped.insert(0, '-');
        }
        if frac.is_zero() {
            write!(f, "{grouped}")
        } else {
            let frac = frac.abs().to_string();
            write!(f, "{grouped}{}", frac.trim_start_matches('0'))
        }
    }
}

impl Add<Money> for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

impl Zero for Money {
    fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}
