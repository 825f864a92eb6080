//! Error types

use num_derive::FromPrimitive;
use thiserror::Error;

/// Errors that may be returned by the factory and pool operations.
///
/// The first four variants keep their historical abort messages so
/// callers matching on message text keep working.
#[derive(Clone, Copy, Debug, Eq, Error, FromPrimitive, PartialEq)]
pub enum PoolError {
    // 0.
    /// Funding was attempted while the market is closed
    #[error("Market is closed")]
    MarketClosed,
    // 1.
    /// A state change was attempted by someone other than the owner
    #[error("Only owner!")]
    NotOwner,
    // 2.
    /// Defunding was attempted before the market resolved
    #[error("Market is not resolved yet")]
    MarketNotResolved,
    // 3.
    /// The (creator, nonce) pair was already used for a deployment
    #[error("Deterministic address already deployed")]
    DuplicateDeployment,
    // 4.
    /// The operation overflowed, underflowed or divided by zero
    #[error("Calculation failure")]
    CalculationFailure,
    // 5.
    /// Collateral balance is too small for the requested transfer
    #[error("Insufficient funds")]
    InsufficientFunds,
    // 6.
    /// Collateral allowance is too small for the requested transfer
    #[error("Insufficient allowance")]
    InsufficientAllowance,
    // 7.
    /// Share balance is too small for the requested burn
    #[error("Insufficient shares")]
    InsufficientShares,
    // 8.
    /// Funding amount must be greater than zero
    #[error("Invalid funding amount")]
    InvalidFundingAmount,
    // 9.
    /// Share amount must be greater than zero
    #[error("Invalid share amount")]
    InvalidShareAmount,
    // 10.
    /// Distribution hint is malformed or not allowed in this state
    #[error("Invalid distribution hint")]
    InvalidDistributionHint,
    // 11.
    /// No pool is deployed at the given address
    #[error("Pool not found")]
    PoolNotFound,
    // 12.
    /// The referenced condition was never prepared
    #[error("Condition not found")]
    ConditionNotFound,
    // 13.
    /// The condition was already prepared
    #[error("Condition already prepared")]
    ConditionAlreadyPrepared,
    // 14.
    /// Payouts were already reported for the condition
    #[error("Condition already resolved")]
    ConditionAlreadyResolved,
    // 15.
    /// Outcome slot count is outside the supported range
    #[error("Invalid outcome slot count")]
    InvalidOutcomeSlotCount,
    // 16.
    /// The payout vector is empty or all zero
    #[error("Invalid payout vector")]
    InvalidPayoutVector,
    // 17.
    /// The caller is not authorized for this operation
    #[error("Unauthorized")]
    Unauthorized,
}

impl PoolError {
    /// Stable numeric code, logged with every failed instruction.
    pub fn code(&self) -> u32 {
        *self as u32
    }
}

/// Result of a state-changing operation that yields no value.
pub type PoolResult = Result<(), PoolError>;
