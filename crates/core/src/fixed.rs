//! Exact decimal arithmetic
//!
//! Every price, quantity and balance that crosses the exchange boundary is a
//! `Fixed`. Binance quotes everything as decimal strings and enforces lot and
//! tick grids, so binary floating point is never used for amounts.

use rust_decimal::{Decimal, RoundingStrategy, prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Satoshis per bitcoin
const SATS_PER_BTC: i64 = 100_000_000;

/// Exact decimal type for financial calculations
///
/// Serialises as a decimal string, the same representation the exchange
/// uses on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixed {
    value: Decimal,
}

impl Fixed {
    /// Zero value
    pub const ZERO: Fixed = Fixed {
        value: Decimal::ZERO,
    };

    /// One value
    pub const ONE: Fixed = Fixed {
        value: Decimal::ONE,
    };

    /// Create a new Fixed from a Decimal
    pub fn from_decimal(value: Decimal) -> Self {
        Fixed { value }
    }

    /// Create a Fixed from an integer
    pub fn from_i64(value: i64) -> Self {
        Fixed {
            value: Decimal::from(value),
        }
    }

    /// `mantissa * 10^-scale`, usable in constants
    pub const fn from_scaled(mantissa: u32, scale: u32) -> Self {
        Fixed {
            value: Decimal::from_parts(mantissa, 0, 0, false, scale),
        }
    }

    /// Create a Fixed from a string, rejecting anything that is not a plain decimal
    pub fn from_str_exact(s: &str) -> Result<Self, FixedError> {
        let value = Decimal::from_str_exact(s.trim()).map_err(|_| FixedError::InvalidValue)?;
        Ok(Fixed { value })
    }

    /// Get the underlying Decimal value
    pub fn to_decimal(&self) -> Decimal {
        self.value
    }

    /// Number of decimal places once trailing zeros are dropped
    ///
    /// `0.10000000` has one decimal place, `1.00000000` has none.
    pub fn decimal_places(&self) -> u32 {
        self.value.normalize().scale()
    }

    /// Drop trailing zeros
    pub fn normalize(&self) -> Self {
        Fixed {
            value: self.value.normalize(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.value > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.value < Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Fixed {
            value: self.value.abs(),
        }
    }

    /// Round to `dp` decimal places, midpoints away from zero
    pub fn round_dp(&self, dp: u32) -> Self {
        Fixed {
            value: self
                .value
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        }
    }

    /// Largest integer not greater than the value
    pub fn floor(&self) -> Self {
        Fixed {
            value: self.value.floor(),
        }
    }

    /// Division that reports a zero divisor instead of panicking
    pub fn checked_div(&self, rhs: Fixed) -> Result<Fixed, FixedError> {
        if rhs.is_zero() {
            return Err(FixedError::DivisionByZero);
        }
        self.value
            .checked_div(rhs.value)
            .map(Fixed::from_decimal)
            .ok_or(FixedError::Overflow)
    }

    /// Multiplication that reports overflow instead of panicking
    pub fn checked_mul(&self, rhs: Fixed) -> Result<Fixed, FixedError> {
        self.value
            .checked_mul(rhs.value)
            .map(Fixed::from_decimal)
            .ok_or(FixedError::Overflow)
    }

    /// Smallest multiple of `step` that is not below this value
    ///
    /// The result is expressed with the step's decimal places, so a step of
    /// `0.10000000` turns `20.04` into `20.1`. Always rounds up, never to
    /// nearest.
    pub fn round_up_to_step(&self, step: Fixed) -> Result<Fixed, FixedError> {
        if !step.is_positive() {
            return Err(FixedError::InvalidValue);
        }

        let steps = self.checked_div(step)?.value.ceil();
        let mut rounded = steps
            .checked_mul(step.value)
            .ok_or(FixedError::Overflow)?;
        rounded.rescale(step.decimal_places());

        Ok(Fixed { value: rounded })
    }

    /// BTC amount in satoshis, truncated to a whole number
    pub fn to_sats(&self) -> Result<Fixed, FixedError> {
        let sats = self.checked_mul(Fixed::from_i64(SATS_PER_BTC))?;
        Ok(sats.floor().normalize())
    }

    /// Plain string without exponent, as the exchange expects it
    pub fn to_wire(&self) -> String {
        self.value.normalize().to_string()
    }
}

/// Decimal arithmetic errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixedError {
    #[error("Invalid value")]
    InvalidValue,
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Overflow in arithmetic operation")]
    Overflow,
}

impl Add for Fixed {
    type Output = Fixed;

    fn add(self, rhs: Self) -> Self::Output {
        Fixed {
            value: self.value + rhs.value,
        }
    }
}

impl Sub for Fixed {
    type Output = Fixed;

    fn sub(self, rhs: Self) -> Self::Output {
        Fixed {
            value: self.value - rhs.value,
        }
    }
}

impl Mul for Fixed {
    type Output = Fixed;

    fn mul(self, rhs: Self) -> Self::Output {
        Fixed {
            value: self.value * rhs.value,
        }
    }
}

/// Panics on a zero divisor, use `checked_div` where the divisor is untrusted
impl Div for Fixed {
    type Output = Fixed;

    fn div(self, rhs: Self) -> Self::Output {
        Fixed {
            value: self.value / rhs.value,
        }
    }
}

impl Neg for Fixed {
    type Output = Fixed;

    fn neg(self) -> Self::Output {
        Fixed { value: -self.value }
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Self) {
        self.value += rhs.value;
    }
}

impl SubAssign for Fixed {
    fn sub_assign(&mut self, rhs: Self) {
        self.value -= rhs.value;
    }
}

impl Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl FromStr for Fixed {
    type Err = FixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_exact(s)
    }
}

impl From<Decimal> for Fixed {
    fn from(value: Decimal) -> Self {
        Fixed { value }
    }
}

impl From<Fixed> for Decimal {
    fn from(fixed: Fixed) -> Self {
        fixed.value
    }
}

/// Convenience macro for creating Fixed values in tests and constants
#[macro_export]
macro_rules! fixed {
    ($value:expr) => {
        $crate::fixed::Fixed::from_str_exact(stringify!($value)).unwrap()
    };
}
