//! Fraction value object (0.0-1.0 scale).
//!
//! Used for topic depth, extraction confidence and confidence thresholds.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A value between 0.0 and 1.0 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Fraction(f64);

impl Fraction {
    /// Zero.
    pub const ZERO: Self = Self(0.0);

    /// One.
    pub const ONE: Self = Self(1.0);

    /// Creates a new Fraction, clamping to the valid range.
    ///
    /// NaN is treated as zero.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Creates a Fraction, returning error if out of range.
    pub fn try_new(value: f64) -> Result<Self, ValidationError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::invalid_format(
                "fraction",
                format!("{} is outside [0, 1]", value),
            ));
        }
        Ok(Self(value))
    }

    /// Returns the value as f64.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns the larger of two fractions.
    pub fn max(self, other: Self) -> Self {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }

    /// Returns true if the value is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.0 > 0.0
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self::ZERO
    }
}

impl TryFrom<f64> for Fraction {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<Fraction> for f64 {
    fn from(fraction: Fraction) -> Self {
        fraction.0
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
