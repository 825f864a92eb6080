//! Events emitted by the factory and its pools.
//!
//! Events are the side channel observers use to follow funding flows;
//! the processor records them in submission order.

use alloy_primitives::Address;

use crate::conditional::ConditionId;

/// Observable record of a completed state change
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PoolEvent {
    /// A pool was created and registered
    PoolCreation {
        /// Identity that requested the creation
        creator: Address,
        /// Address the pool was deployed at
        pool: Address,
        /// Conditions the pool is bound to
        condition_ids: Vec<ConditionId>,
        /// Collateral token of the pool
        collateral: Address,
        /// Configured fee factor
        fee_factor: u128,
    },
    /// Funding was added to a pool
    FundingAdded {
        /// Pool that received the funding
        pool: Address,
        /// Identity the funding came from
        funder: Address,
        /// Amount moved into each outcome position
        amounts_added: Vec<u128>,
        /// Shares minted for the funder
        shares_minted: u128,
    },
    /// Funding was removed from a pool
    FundingRemoved {
        /// Pool the funding left
        pool: Address,
        /// Identity the funding returned to
        funder: Address,
        /// Amount returned from each outcome position
        amounts_removed: Vec<u128>,
        /// Fee collateral paid out alongside the burn
        collateral_removed_from_fee_pool: u128,
        /// Shares burnt
        shares_burnt: u128,
    },
    /// The owner toggled the open/closed flag
    MarketStateChanged {
        /// Pool whose flag changed
        pool: Address,
        /// Owner that toggled it
        owner: Address,
        /// New value of the flag
        closed: bool,
    },
}
