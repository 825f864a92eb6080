//! Integer math with exact floor-division semantics

// required for clippy
#![allow(clippy::assign_op_pattern)]
#![allow(clippy::ptr_offset_with_cast)]
#![allow(clippy::manual_range_contains)]

use std::convert::TryFrom;

use uint::construct_uint;

use crate::error::PoolError;

construct_uint! {
    /// Scratch integer wide enough for products of two u128 amounts
    pub struct U256(4);
}

/// Try to subtract, return an error on underflow
pub trait TrySub: Sized {
    /// Subtract
    fn try_sub(self, rhs: Self) -> Result<Self, PoolError>;
}

/// Try to add, return an error on overflow
pub trait TryAdd: Sized {
    /// Add
    fn try_add(self, rhs: Self) -> Result<Self, PoolError>;
}

/// Try to divide, return an error on divide by zero
pub trait TryDiv: Sized {
    /// Divide
    fn try_div(self, rhs: Self) -> Result<Self, PoolError>;
}

/// Try to multiply, return an error on overflow
pub trait TryMul: Sized {
    /// Multiply
    fn try_mul(self, rhs: Self) -> Result<Self, PoolError>;
}

impl TrySub for u128 {
    fn try_sub(self, rhs: Self) -> Result<Self, PoolError> {
        self.checked_sub(rhs).ok_or(PoolError::CalculationFailure)
    }
}

impl TryAdd for u128 {
    fn try_add(self, rhs: Self) -> Result<Self, PoolError> {
        self.checked_add(rhs).ok_or(PoolError::CalculationFailure)
    }
}

impl TryDiv for u128 {
    fn try_div(self, rhs: Self) -> Result<Self, PoolError> {
        self.checked_div(rhs).ok_or(PoolError::CalculationFailure)
    }
}

impl TryMul for u128 {
    fn try_mul(self, rhs: Self) -> Result<Self, PoolError> {
        self.checked_mul(rhs).ok_or(PoolError::CalculationFailure)
    }
}

/// Compute `floor(a * b / c)` without intermediate overflow.
///
/// Funding shares and fee entitlements divide with floor semantics, so
/// the result must match wide-integer division exactly.
pub fn mul_div_floor(a: u128, b: u128, c: u128) -> Result<u128, PoolError> {
    if c == 0 {
        return Err(PoolError::CalculationFailure);
    }
    let wide = U256::from(a) * U256::from(b) / U256::from(c);
    u128::try_from(wide).map_err(|_| PoolError::CalculationFailure)
}
