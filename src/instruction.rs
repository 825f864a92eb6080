//! Instruction types

#![allow(clippy::too_many_arguments)]

use alloy_primitives::Address;

use crate::conditional::ConditionId;

/// Create-pool instruction data
#[derive(Clone, Debug, PartialEq)]
pub struct CreatePoolData {
    /// Salt nonce, usable once per creator
    pub salt_nonce: u64,
    /// Collateral token of the new pool
    pub collateral_token: Address,
    /// Conditions the pool's outcomes are bound to
    pub condition_ids: Vec<ConditionId>,
    /// Fee factor of the new pool
    pub fee_factor: u128,
    /// Collateral pulled from the creator for the first funding round
    pub initial_funds: u128,
    /// Relative weights for the first funding round, one per atomic
    /// outcome position, or empty for an even split
    pub initial_distribution: Vec<u128>,
    /// Question descriptor stored on the pool
    pub question: [u8; 32],
}

/// Add-funding instruction data
#[derive(Clone, Debug, PartialEq)]
pub struct AddFundingData {
    /// Pool to fund
    pub pool: Address,
    /// Collateral supplied by the funder
    pub amount: u128,
    /// Relative weights for the first funding round; must be empty once
    /// the pool holds reserves
    pub distribution_hint: Vec<u128>,
}

/// Remove-funding instruction data
#[derive(Clone, Debug, PartialEq)]
pub struct RemoveFundingData {
    /// Pool to defund
    pub pool: Address,
    /// Shares to burn
    pub shares_to_burn: u128,
}

/// Instructions processed by the serialized command queue.
#[derive(Clone, Debug, PartialEq)]
pub enum PoolInstruction {
    /// Create, seed and register a new pool at its deterministic address
    CreatePool(CreatePoolData),
    /// Add funding to an open pool
    AddFunding(AddFundingData),
    /// Burn shares and withdraw the matching funding and fees
    RemoveFunding(RemoveFundingData),
    /// Toggle the pool's open/closed flag, owner only
    ChangeMarketState {
        /// Pool whose flag to toggle
        pool: Address,
    },
}

/// Creates a 'create pool' instruction
pub fn create_pool(
    salt_nonce: u64,
    collateral_token: Address,
    condition_ids: Vec<ConditionId>,
    fee_factor: u128,
    initial_funds: u128,
    initial_distribution: Vec<u128>,
    question: [u8; 32],
) -> PoolInstruction {
    PoolInstruction::CreatePool(CreatePoolData {
        salt_nonce,
        collateral_token,
        condition_ids,
        fee_factor,
        initial_funds,
        initial_distribution,
        question,
    })
}

/// Creates an 'add funding' instruction
pub fn add_funding(pool: Address, amount: u128, distribution_hint: Vec<u128>) -> PoolInstruction {
    PoolInstruction::AddFunding(AddFundingData {
        pool,
        amount,
        distribution_hint,
    })
}

/// Creates a 'remove funding' instruction
pub fn remove_funding(pool: Address, shares_to_burn: u128) -> PoolInstruction {
    PoolInstruction::RemoveFunding(RemoveFundingData {
        pool,
        shares_to_burn,
    })
}

/// Creates a 'change market state' instruction
pub fn change_market_state(pool: Address) -> PoolInstruction {
    PoolInstruction::ChangeMarketState { pool }
}
