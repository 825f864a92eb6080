//! Pool state

use std::collections::HashMap;

use alloy_primitives::Address;

use crate::{
    conditional::{ConditionId, PositionId},
    error::PoolError,
    math::{TryAdd, TrySub},
    state::{DefundingPolicy, FeePool, PoolTemplate},
};

/// A fixed product market maker pool.
///
/// The pool custodies collateral, holds one reserve per atomic outcome
/// position in the conditional ledger, and issues fungible ownership
/// shares against funding. Outcome reserves live in the conditional
/// ledger under the pool's address; everything else is here.
#[derive(Clone, Debug, PartialEq)]
pub struct Pool {
    /// Address this pool was deployed at
    pub address: Address,
    /// Owner identity, fixed at creation
    pub owner: Address,
    /// Question descriptor, fixed at creation
    pub question: [u8; 32],
    /// Collateral token the pool is funded with
    pub collateral: Address,
    /// Conditions the pool's outcomes are bound to
    pub conditions: Vec<ConditionId>,
    /// Atomic outcome positions, one reserve each
    pub position_ids: Vec<PositionId>,
    /// Fee factor configured at creation
    pub fee_factor: u128,
    /// Whether funding operations are currently rejected
    pub closed: bool,
    /// Gate applied to `remove_funding`
    pub defunding_policy: DefundingPolicy,
    /// Fee accrual and withdrawal accounting
    pub fee_pool: FeePool,
    total_supply: u128,
    balances: HashMap<Address, u128>,
}

impl Pool {
    /// Clone a fresh pool from the factory's template.
    #[allow(clippy::too_many_arguments)]
    pub fn from_template(
        template: &PoolTemplate,
        address: Address,
        owner: Address,
        question: [u8; 32],
        collateral: Address,
        conditions: Vec<ConditionId>,
        position_ids: Vec<PositionId>,
        fee_factor: u128,
    ) -> Self {
        Self {
            address,
            owner,
            question,
            collateral,
            conditions,
            position_ids,
            fee_factor,
            closed: false,
            defunding_policy: template.defunding_policy,
            fee_pool: FeePool::default(),
            total_supply: 0,
            balances: HashMap::new(),
        }
    }

    /// Current share supply
    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Share balance of a holder
    pub fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Mint `amount` shares to `to`.
    pub(crate) fn mint_shares(&mut self, to: &Address, amount: u128) -> Result<(), PoolError> {
        self.fee_pool.on_mint(to, amount, self.total_supply)?;
        self.total_supply = self.total_supply.try_add(amount)?;
        let balance = self.balance_of(to).try_add(amount)?;
        self.balances.insert(*to, balance);
        Ok(())
    }

    /// Move `amount` shares from `from` to `to`.
    ///
    /// The sender's fee entitlement is settled first; the returned amount
    /// is the collateral the caller owes the sender out of the pool's
    /// holdings.
    pub(crate) fn transfer_shares(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<u128, PoolError> {
        let sender_balance = self.balance_of(from);
        if sender_balance < amount {
            return Err(PoolError::InsufficientShares);
        }
        let fees_settled = self
            .fee_pool
            .withdraw(from, sender_balance, self.total_supply)?;
        self.fee_pool
            .on_transfer(from, to, amount, self.total_supply)?;
        self.balances.insert(*from, sender_balance - amount);
        let recipient_balance = self.balance_of(to).try_add(amount)?;
        self.balances.insert(*to, recipient_balance);
        Ok(fees_settled)
    }

    /// Burn `amount` shares held by `from`.
    ///
    /// The holder's fee entitlement is settled first; the returned amount
    /// is the collateral the caller owes the holder out of the pool's
    /// holdings.
    pub(crate) fn burn_shares(
        &mut self,
        from: &Address,
        amount: u128,
    ) -> Result<u128, PoolError> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(PoolError::InsufficientShares);
        }
        let fees_settled = self.fee_pool.withdraw(from, balance, self.total_supply)?;
        self.fee_pool.on_burn(from, amount, self.total_supply)?;
        self.total_supply = self.total_supply.try_sub(amount)?;
        self.balances.insert(*from, balance - amount);
        Ok(fees_settled)
    }
}
