//! Collateral token ledger.
//!
//! Stand-in for the collateral asset the deployed system consumes as an
//! external service. One ledger tracks any number of tokens; holders
//! deposit, approve spenders and transfer exactly the way the pool and
//! factory expect from the real asset.

use std::collections::HashMap;

use alloy_primitives::Address;

use crate::{
    error::{PoolError, PoolResult},
    math::TryAdd,
};

/// Balances and allowances for all collateral tokens
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenLedger {
    balances: HashMap<(Address, Address), u128>,
    allowances: HashMap<(Address, Address, Address), u128>,
}

impl TokenLedger {
    /// Credit freshly deposited collateral to `holder`.
    pub fn deposit(&mut self, token: Address, holder: Address, amount: u128) -> PoolResult {
        let balance = self.balance_of(&token, &holder).try_add(amount)?;
        self.balances.insert((token, holder), balance);
        Ok(())
    }

    /// Let `spender` move up to `amount` of the owner's collateral.
    pub fn approve(&mut self, token: Address, owner: Address, spender: Address, amount: u128) {
        self.allowances.insert((token, owner, spender), amount);
    }

    /// Remaining allowance from `owner` to `spender`
    pub fn allowance(&self, token: &Address, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(*token, *owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    /// Collateral balance of `holder`
    pub fn balance_of(&self, token: &Address, holder: &Address) -> u128 {
        self.balances.get(&(*token, *holder)).copied().unwrap_or(0)
    }

    /// Move collateral from `from` to `to`.
    pub(crate) fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> PoolResult {
        let sender = self.balance_of(&token, &from);
        if sender < amount {
            return Err(PoolError::InsufficientFunds);
        }
        let recipient = self.balance_of(&token, &to).try_add(amount)?;
        self.balances.insert((token, from), sender - amount);
        self.balances.insert((token, to), recipient);
        Ok(())
    }

    /// Move collateral from `from` to `to` on behalf of `spender`,
    /// consuming allowance.
    pub(crate) fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> PoolResult {
        let allowance = self.allowance(&token, &from, &spender);
        if allowance < amount {
            return Err(PoolError::InsufficientAllowance);
        }
        self.transfer(token, from, to, amount)?;
        self.allowances
            .insert((token, from, spender), allowance - amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WETH: Address = Address::repeat_byte(0xee);

    fn holder(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn deposit_and_transfer() {
        let mut ledger = TokenLedger::default();
        let alice = holder(1);
        let bob = holder(2);

        ledger.deposit(WETH, alice, 100).unwrap();
        ledger.transfer(WETH, alice, bob, 40).unwrap();
        assert_eq!(ledger.balance_of(&WETH, &alice), 60);
        assert_eq!(ledger.balance_of(&WETH, &bob), 40);

        assert_eq!(
            ledger.transfer(WETH, alice, bob, 61).unwrap_err(),
            PoolError::InsufficientFunds
        );
    }

    #[test]
    fn transfer_from_consumes_allowance() {
        let mut ledger = TokenLedger::default();
        let alice = holder(1);
        let bob = holder(2);
        let factory = holder(0xfa);

        ledger.deposit(WETH, alice, 100).unwrap();
        ledger.approve(WETH, alice, factory, 70);

        ledger.transfer_from(WETH, factory, alice, bob, 50).unwrap();
        assert_eq!(ledger.balance_of(&WETH, &bob), 50);
        assert_eq!(ledger.allowance(&WETH, &alice, &factory), 20);

        assert_eq!(
            ledger.transfer_from(WETH, factory, alice, bob, 21).unwrap_err(),
            PoolError::InsufficientAllowance
        );
    }

    #[test]
    fn failed_transfer_from_leaves_allowance_intact() {
        let mut ledger = TokenLedger::default();
        let alice = holder(1);
        let bob = holder(2);
        let factory = holder(0xfa);

        ledger.deposit(WETH, alice, 10).unwrap();
        ledger.approve(WETH, alice, factory, 100);

        assert_eq!(
            ledger.transfer_from(WETH, factory, alice, bob, 50).unwrap_err(),
            PoolError::InsufficientFunds
        );
        assert_eq!(ledger.allowance(&WETH, &alice, &factory), 100);
        assert_eq!(ledger.balance_of(&WETH, &alice), 10);
    }

    #[test]
    fn tokens_do_not_mix() {
        let mut ledger = TokenLedger::default();
        let dai = Address::repeat_byte(0xdd);
        let alice = holder(1);

        ledger.deposit(WETH, alice, 5).unwrap();
        assert_eq!(ledger.balance_of(&dai, &alice), 0);
    }
}
