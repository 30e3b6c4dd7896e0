//! Double-double accumulator
//!
//! Carries a value as an unevaluated sum `hi + lo` of two `f64`s, giving
//! roughly 106 bits of mantissa. Additions and products use the error-free
//! TwoSum / TwoProduct transformations, so long running sums of large
//! timestamp-scaled terms do not lose the low-order digits a plain `f64`
//! accumulator would drop.

use core::ops::{Add, AddAssign, Mul, Neg, Sub};

/// 2^27 + 1, splits a double into two 26-bit halves
const SPLITTER: f64 = 134_217_729.0;

/// `a + b` as a rounded sum plus its exact rounding error
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let sum = a + b;
    let b_virtual = sum - a;
    let a_virtual = sum - b_virtual;
    let err = (a - a_virtual) + (b - b_virtual);
    (sum, err)
}

/// Like [`two_sum`] but requires `|a| >= |b|`
fn quick_two_sum(a: f64, b: f64) -> (f64, f64) {
    let sum = a + b;
    let err = b - (sum - a);
    (sum, err)
}

fn split(a: f64) -> (f64, f64) {
    let t = SPLITTER * a;
    let hi = t - (t - a);
    (hi, a - hi)
}

/// `a * b` as a rounded product plus its exact rounding error (Dekker)
fn two_product(a: f64, b: f64) -> (f64, f64) {
    let product = a * b;
    let (a_hi, a_lo) = split(a);
    let (b_hi, b_lo) = split(b);
    let err = ((a_hi * b_hi - product) + a_hi * b_lo + a_lo * b_hi) + a_lo * b_lo;
    (product, err)
}

/// Extended-precision running sum
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WideSum {
    hi: f64,
    lo: f64,
}

impl WideSum {
    /// Empty sum
    pub const ZERO: Self = Self { hi: 0.0, lo: 0.0 };

    fn normalized(hi: f64, lo: f64) -> Self {
        let (hi, lo) = quick_two_sum(hi, lo);
        Self { hi, lo }
    }

    /// Exact product of two doubles
    pub fn product(a: f64, b: f64) -> Self {
        let (hi, lo) = two_product(a, b);
        Self::normalized(hi, lo)
    }

    /// Nearest double-double to an integer
    ///
    /// Exact for every value up to 2^106 in magnitude.
    pub fn from_i128(value: i128) -> Self {
        let hi = value as f64;
        // `hi` is the rounded value, the remainder fits in an i128 again
        let lo = value.saturating_sub(hi as i128) as f64;
        Self::normalized(hi, lo)
    }

    /// Add the exact product `a * b`
    pub fn add_product(&mut self, a: f64, b: f64) {
        *self += Self::product(a, b);
    }

    /// Collapse to the nearest `f64`
    pub fn value(self) -> f64 {
        self.hi + self.lo
    }

    /// Whether both halves are zero
    pub fn is_zero(self) -> bool {
        self.hi == 0.0 && self.lo == 0.0
    }
}

impl From<f64> for WideSum {
    fn from(value: f64) -> Self {
        Self { hi: value, lo: 0.0 }
    }
}

impl Add for WideSum {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let (hi, err) = two_sum(self.hi, rhs.hi);
        Self::normalized(hi, err + self.lo + rhs.lo)
    }
}

impl AddAssign for WideSum {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl AddAssign<f64> for WideSum {
    fn add_assign(&mut self, rhs: f64) {
        let (hi, err) = two_sum(self.hi, rhs);
        *self = Self::normalized(hi, err + self.lo);
    }
}

impl Neg for WideSum {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

impl Sub for WideSum {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Mul for WideSum {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let (hi, err) = two_product(self.hi, rhs.hi);
        Self::normalized(hi, err + self.hi * rhs.lo + self.lo * rhs.hi)
    }
}

impl Mul<f64> for WideSum {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        let (hi, err) = two_product(self.hi, rhs);
        Self::normalized(hi, err + self.lo * rhs)
    }
}
