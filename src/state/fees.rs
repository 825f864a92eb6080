//! Fee pool accounting
//!
//! Fees accrue to shareholders in proportion to their holdings at the
//! time of accrual. The pool keeps a single accrual weight plus one
//! withdrawn counter per holder; mint, burn and transfer adjust the
//! counters so a holder's entitlement never jumps when shares move.

use std::collections::HashMap;

use alloy_primitives::Address;

use crate::{
    error::PoolError,
    math::{mul_div_floor, TryAdd, TrySub},
};

/// Collateral accrued for shareholders and the per-holder withdrawal state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeePool {
    /// Total fee weight accrued over the pool's lifetime
    fee_pool_weight: u128,
    /// Fee weight already attributed to each holder
    withdrawn_fees: HashMap<Address, u128>,
    /// Sum of all attributed weight
    total_withdrawn_fees: u128,
}

impl FeePool {
    /// Collateral currently held for shareholders
    pub fn collected_fees(&self) -> u128 {
        // total_withdrawn_fees never exceeds the accrued weight
        self.fee_pool_weight - self.total_withdrawn_fees
    }

    /// Credit newly collected collateral to the fee pool
    pub fn credit(&mut self, amount: u128) -> Result<(), PoolError> {
        self.fee_pool_weight = self.fee_pool_weight.try_add(amount)?;
        Ok(())
    }

    /// Collateral the holder could withdraw right now
    ///
    /// # Arguments
    ///
    /// * holder - account to query.
    /// * balance - the holder's current share balance.
    /// * supply - current total share supply.
    ///
    /// # Return value
    ///
    /// withdrawable collateral amount.
    pub fn withdrawable_by(
        &self,
        holder: &Address,
        balance: u128,
        supply: u128,
    ) -> Result<u128, PoolError> {
        if supply == 0 {
            return Ok(0);
        }
        let raw = mul_div_floor(self.fee_pool_weight, balance, supply)?;
        Ok(raw.saturating_sub(self.withdrawn(holder)))
    }

    /// Pay out the holder's entitlement and mark it withdrawn.
    ///
    /// Returns the amount owed; the caller moves the collateral.
    pub fn withdraw(
        &mut self,
        holder: &Address,
        balance: u128,
        supply: u128,
    ) -> Result<u128, PoolError> {
        if supply == 0 {
            return Ok(0);
        }
        let raw = mul_div_floor(self.fee_pool_weight, balance, supply)?;
        let withdrawable = raw.saturating_sub(self.withdrawn(holder));
        if withdrawable > 0 {
            self.withdrawn_fees.insert(*holder, raw);
            self.total_withdrawn_fees = self.total_withdrawn_fees.try_add(withdrawable)?;
        }
        Ok(withdrawable)
    }

    /// Account for freshly minted shares.
    ///
    /// New shares must not dilute fees collected before them, so the
    /// recipient starts with a proportional slice already attributed.
    pub fn on_mint(&mut self, to: &Address, amount: u128, supply: u128) -> Result<(), PoolError> {
        let delta = if supply == 0 {
            amount
        } else {
            mul_div_floor(self.fee_pool_weight, amount, supply)?
        };
        self.fee_pool_weight = self.fee_pool_weight.try_add(delta)?;
        let attributed = self.withdrawn(to).try_add(delta)?;
        self.withdrawn_fees.insert(*to, attributed);
        self.total_withdrawn_fees = self.total_withdrawn_fees.try_add(delta)?;
        Ok(())
    }

    /// Account for burnt shares.
    ///
    /// The holder's entitlement must be withdrawn first so the burn only
    /// releases already-attributed weight.
    pub fn on_burn(&mut self, from: &Address, amount: u128, supply: u128) -> Result<(), PoolError> {
        let delta = if supply == 0 {
            amount
        } else {
            mul_div_floor(self.fee_pool_weight, amount, supply)?
        };
        let attributed = self.withdrawn(from).try_sub(delta)?;
        self.withdrawn_fees.insert(*from, attributed);
        self.total_withdrawn_fees = self.total_withdrawn_fees.try_sub(delta)?;
        self.fee_pool_weight = self.fee_pool_weight.try_sub(delta)?;
        Ok(())
    }

    /// Account for a share transfer.
    ///
    /// The sender's entitlement must be withdrawn first; the attributed
    /// weight then follows the shares to the recipient.
    pub fn on_transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
        supply: u128,
    ) -> Result<(), PoolError> {
        if supply == 0 {
            return Ok(());
        }
        let delta = mul_div_floor(self.fee_pool_weight, amount, supply)?;
        let sender = self.withdrawn(from).try_sub(delta)?;
        self.withdrawn_fees.insert(*from, sender);
        let recipient = self.withdrawn(to).try_add(delta)?;
        self.withdrawn_fees.insert(*to, recipient);
        Ok(())
    }

    fn withdrawn(&self, holder: &Address) -> u128 {
        self.withdrawn_fees.get(holder).copied().unwrap_or(0)
    }
}
