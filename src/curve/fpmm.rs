//! Pure funding calculations.
//!
//! Amounts flowing into and out of a pool are fixed-point integers in the
//! collateral's smallest unit. All divisions floor, and every function is
//! free of side effects so results can be recomputed for verification.

use crate::{
    error::PoolError,
    math::{mul_div_floor, TryAdd, TrySub},
};

/// Amounts moved into each outcome position by the first funding round.
///
/// The distribution lists one relative weight per atomic outcome position;
/// position `i` receives `floor(amount * weight_i / max(weights))`. Every
/// position must end up with a nonzero holding or the hint is rejected.
///
/// # Arguments
///
/// * amount - total collateral supplied by the funder.
/// * distribution - relative weights, one per outcome position.
///
/// # Return value
///
/// funded amount per outcome position.
pub fn initial_funding_amounts(
    amount: u128,
    distribution: &[u128],
) -> Result<Vec<u128>, PoolError> {
    let max_weight = distribution
        .iter()
        .copied()
        .max()
        .filter(|max| *max > 0)
        .ok_or(PoolError::InvalidDistributionHint)?;
    distribution
        .iter()
        .map(|weight| {
            let funded = mul_div_floor(amount, *weight, max_weight)?;
            if funded == 0 {
                return Err(PoolError::InvalidDistributionHint);
            }
            Ok(funded)
        })
        .collect()
}

/// Amounts moved into each outcome position by a follow-up funding round.
///
/// Contributions are normalized against the largest current holding, the
/// scarcest leg of the pool: position `i` receives
/// `floor(amount * reserve_i / max(reserves))`.
///
/// # Arguments
///
/// * amount - total collateral supplied by the funder.
/// * reserves - current holding per outcome position.
///
/// # Return value
///
/// funded amount per outcome position.
pub fn funding_amounts(amount: u128, reserves: &[u128]) -> Result<Vec<u128>, PoolError> {
    let max_reserve = max_reserve(reserves)?;
    reserves
        .iter()
        .map(|reserve| mul_div_floor(amount, *reserve, max_reserve))
        .collect()
}

/// Shares minted for a follow-up funding of `amount`.
///
/// `floor(amount * supply / max_reserve)`, the proportional funding
/// invariant. The first funding round mints `amount` directly instead.
pub fn mint_for_funding(
    amount: u128,
    supply: u128,
    max_reserve: u128,
) -> Result<u128, PoolError> {
    mul_div_floor(amount, supply, max_reserve)
}

/// Amounts returned from each outcome position when burning shares.
///
/// Position `i` pays out `floor(reserve_i * shares / supply)`.
pub fn removal_amounts(
    shares: u128,
    supply: u128,
    reserves: &[u128],
) -> Result<Vec<u128>, PoolError> {
    reserves
        .iter()
        .map(|reserve| mul_div_floor(*reserve, shares, supply))
        .collect()
}

/// Collateral left over after funding each position its computed amount.
///
/// The remainder of the max leg is always zero; the other legs' remainders
/// are what a funder gets back on the first round and what the fee pool
/// collects on later rounds.
pub fn funding_remainder(amount: u128, funded: &[u128]) -> Result<u128, PoolError> {
    let mut remainder = 0u128;
    for funded_amount in funded {
        remainder = remainder.try_add(amount.try_sub(*funded_amount)?)?;
    }
    Ok(remainder)
}

/// Largest holding across all outcome positions.
pub fn max_reserve(reserves: &[u128]) -> Result<u128, PoolError> {
    reserves
        .iter()
        .copied()
        .max()
        .filter(|max| *max > 0)
        .ok_or(PoolError::CalculationFailure)
}
