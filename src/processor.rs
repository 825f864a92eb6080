//! Instruction processor.
//!
//! All shared state lives behind one mutex and every state-changing
//! operation runs start to finish while holding it, so operations are
//! totally ordered by submission and no partial application is ever
//! observable. Each operation validates, then commits: the only fallible
//! step after the first mutation is arithmetic that the validation phase
//! has already performed on the same inputs.

#![allow(clippy::too_many_arguments)]

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use alloy_primitives::Address;
use log::{debug, warn};

use crate::{
    conditional::{ConditionId, ConditionalLedger, PositionId, QuestionId},
    curve::{
        funding_amounts, funding_remainder, initial_funding_amounts, max_reserve,
        mint_for_funding, removal_amounts,
    },
    error::{PoolError, PoolResult},
    event::PoolEvent,
    factory::{compute_pool_address, Factory, PoolCtorArgs},
    instruction::{AddFundingData, CreatePoolData, PoolInstruction, RemoveFundingData},
    math::TryAdd,
    state::{DefundingPolicy, Pool, PoolTemplate},
    token::TokenLedger,
};

/// Outcome of a successful `remove_funding`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemovedFunding {
    /// Amount returned from each outcome position
    pub amounts_removed: Vec<u128>,
    /// Fee collateral paid out alongside the burn
    pub collateral_removed_from_fee_pool: u128,
    /// Shares burnt
    pub shares_burnt: u128,
}

/// Everything the mutex guards
struct Bank {
    tokens: TokenLedger,
    conditional: ConditionalLedger,
    factory: Factory,
    pools: HashMap<Address, Pool>,
    events: Vec<PoolEvent>,
}

/// Serialized command engine over the factory, its pools and the two
/// collaborating ledgers.
pub struct Processor {
    factory_address: Address,
    implementation_master: Address,
    inner: Mutex<Bank>,
}

impl Processor {
    /// Engine with a factory deployed at `factory_address` cloning pools
    /// from `template`
    pub fn new(factory_address: Address, template: PoolTemplate) -> Self {
        Self {
            factory_address,
            implementation_master: template.implementation_master,
            inner: Mutex::new(Bank {
                tokens: TokenLedger::default(),
                conditional: ConditionalLedger::default(),
                factory: Factory::new(factory_address, template),
                pools: HashMap::new(),
                events: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Bank> {
        // a poisoned lock only means a panic elsewhere; operations are
        // all-or-nothing so the guarded state is still consistent
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Processes an [Instruction](enum.PoolInstruction.html).
    pub fn process(&self, caller: Address, instruction: PoolInstruction) -> PoolResult {
        let result = match instruction {
            PoolInstruction::CreatePool(data) => {
                debug!("Instruction: CreatePool");
                self.create2_pool(caller, data).map(|_| ())
            }
            PoolInstruction::AddFunding(AddFundingData {
                pool,
                amount,
                distribution_hint,
            }) => {
                debug!("Instruction: AddFunding");
                self.add_funding(caller, pool, amount, &distribution_hint)
                    .map(|_| ())
            }
            PoolInstruction::RemoveFunding(RemoveFundingData {
                pool,
                shares_to_burn,
            }) => {
                debug!("Instruction: RemoveFunding");
                self.remove_funding(caller, pool, shares_to_burn).map(|_| ())
            }
            PoolInstruction::ChangeMarketState { pool } => {
                debug!("Instruction: ChangeMarketState");
                self.change_market_state(caller, pool).map(|_| ())
            }
        };
        if let Err(error) = result {
            warn!("instruction failed with code {}: {}", error.code(), error);
        }
        result
    }

    /// Create, seed and register a new pool at its deterministic address.
    ///
    /// The address equals the [`compute_pool_address`] dry run for the
    /// same inputs; reusing a (creator, nonce) pair fails with
    /// `DuplicateDeployment`. The creator must hold `initial_funds` of
    /// collateral and have approved the factory for it.
    pub fn create2_pool(
        &self,
        caller: Address,
        data: CreatePoolData,
    ) -> Result<Address, PoolError> {
        let CreatePoolData {
            salt_nonce,
            collateral_token,
            condition_ids,
            fee_factor,
            initial_funds,
            initial_distribution,
            question,
        } = data;
        let args = PoolCtorArgs {
            collateral: collateral_token,
            conditions: condition_ids.clone(),
            fee_factor,
            question,
        };
        let pool_address = self.compute_pool_address(caller, salt_nonce, &args);

        let mut guard = self.lock();
        let Bank {
            tokens,
            conditional,
            factory,
            pools,
            events,
        } = &mut *guard;

        if pools.contains_key(&pool_address) {
            return Err(PoolError::DuplicateDeployment);
        }
        if initial_funds == 0 {
            return Err(PoolError::InvalidFundingAmount);
        }
        let position_ids = conditional.atomic_position_ids(collateral_token, &condition_ids)?;
        let funded = planned_initial_amounts(
            initial_funds,
            &initial_distribution,
            position_ids.len(),
        )?;

        if tokens.balance_of(&collateral_token, &caller) < initial_funds {
            return Err(PoolError::InsufficientFunds);
        }
        if tokens.allowance(&collateral_token, &caller, &self.factory_address) < initial_funds {
            return Err(PoolError::InsufficientAllowance);
        }

        let mut pool = Pool::from_template(
            factory.template(),
            pool_address,
            caller,
            question,
            collateral_token,
            condition_ids.clone(),
            position_ids.clone(),
            fee_factor,
        );

        tokens.transfer_from(
            collateral_token,
            self.factory_address,
            caller,
            pool_address,
            initial_funds,
        )?;
        for (position, funded_amount) in position_ids.iter().zip(funded.iter()) {
            conditional.mint(pool_address, *position, *funded_amount)?;
            let send_back = initial_funds - *funded_amount;
            if send_back > 0 {
                conditional.mint(caller, *position, send_back)?;
            }
        }
        pool.mint_shares(&self.factory_address, initial_funds)?;
        let fees_settled =
            pool.transfer_shares(&self.factory_address, &caller, initial_funds)?;
        // a brand new fee pool owes the factory nothing
        debug_assert_eq!(fees_settled, 0);

        factory.register(pool_address);
        pools.insert(pool_address, pool);
        events.push(PoolEvent::PoolCreation {
            creator: caller,
            pool: pool_address,
            condition_ids,
            collateral: collateral_token,
            fee_factor,
        });
        events.push(PoolEvent::FundingAdded {
            pool: pool_address,
            funder: self.factory_address,
            amounts_added: funded,
            shares_minted: initial_funds,
        });
        Ok(pool_address)
    }

    /// Add funding to an open pool, returning the shares minted.
    ///
    /// The funder must hold `amount` of the pool's collateral and have
    /// approved the pool for it. The first funding round takes a
    /// distribution hint and returns the off-weight remainders to the
    /// funder as outcome tokens; later rounds reject hints, normalize
    /// against the largest reserve and credit the remainders to the fee
    /// pool.
    pub fn add_funding(
        &self,
        caller: Address,
        pool_address: Address,
        amount: u128,
        distribution_hint: &[u128],
    ) -> Result<u128, PoolError> {
        let mut guard = self.lock();
        let Bank {
            tokens,
            conditional,
            pools,
            events,
            ..
        } = &mut *guard;
        let pool = pools.get_mut(&pool_address).ok_or(PoolError::PoolNotFound)?;

        if pool.closed {
            return Err(PoolError::MarketClosed);
        }
        if amount == 0 {
            return Err(PoolError::InvalidFundingAmount);
        }

        let supply = pool.total_supply();
        let holders = vec![pool_address; pool.position_ids.len()];
        let reserves = conditional.balance_of_batch(&holders, &pool.position_ids);

        let first_round = supply == 0;
        let (funded, mint_amount, fee_credit) = if first_round {
            let funded =
                planned_initial_amounts(amount, distribution_hint, pool.position_ids.len())?;
            (funded, amount, 0)
        } else {
            if !distribution_hint.is_empty() {
                return Err(PoolError::InvalidDistributionHint);
            }
            let funded = funding_amounts(amount, &reserves)?;
            let minted = mint_for_funding(amount, supply, max_reserve(&reserves)?)?;
            let credit = funding_remainder(amount, &funded)?;
            (funded, minted, credit)
        };

        if tokens.balance_of(&pool.collateral, &caller) < amount {
            return Err(PoolError::InsufficientFunds);
        }
        if tokens.allowance(&pool.collateral, &caller, &pool_address) < amount {
            return Err(PoolError::InsufficientAllowance);
        }
        // prove the commit-phase arithmetic on the same inputs
        for (reserve, funded_amount) in reserves.iter().zip(funded.iter()) {
            reserve.try_add(*funded_amount)?;
        }
        supply.try_add(mint_amount)?;

        tokens.transfer_from(pool.collateral, pool_address, caller, pool_address, amount)?;
        for (position, funded_amount) in pool.position_ids.iter().zip(funded.iter()) {
            conditional.mint(pool_address, *position, *funded_amount)?;
            if first_round {
                let send_back = amount - *funded_amount;
                if send_back > 0 {
                    conditional.mint(caller, *position, send_back)?;
                }
            }
        }
        pool.mint_shares(&caller, mint_amount)?;
        pool.fee_pool.credit(fee_credit)?;

        events.push(PoolEvent::FundingAdded {
            pool: pool_address,
            funder: caller,
            amounts_added: funded,
            shares_minted: mint_amount,
        });
        Ok(mint_amount)
    }

    /// Burn shares and withdraw the matching funding and fees.
    ///
    /// Under the `RequireResolution` policy every bound condition must
    /// have reported payouts first. The caller receives a proportional
    /// slice of every outcome reserve plus their entire outstanding fee
    /// entitlement; the entitlement decrease, the fee-pool decrease and
    /// the collateral paid out are all the same number.
    pub fn remove_funding(
        &self,
        caller: Address,
        pool_address: Address,
        shares_to_burn: u128,
    ) -> Result<RemovedFunding, PoolError> {
        let mut guard = self.lock();
        let Bank {
            tokens,
            conditional,
            pools,
            events,
            ..
        } = &mut *guard;
        let pool = pools.get_mut(&pool_address).ok_or(PoolError::PoolNotFound)?;

        if shares_to_burn == 0 {
            return Err(PoolError::InvalidShareAmount);
        }
        if pool.defunding_policy == DefundingPolicy::RequireResolution {
            for condition in &pool.conditions {
                if !conditional.is_resolved(condition)? {
                    return Err(PoolError::MarketNotResolved);
                }
            }
        }
        let balance = pool.balance_of(&caller);
        if balance < shares_to_burn {
            return Err(PoolError::InsufficientShares);
        }

        let supply = pool.total_supply();
        let holders = vec![pool_address; pool.position_ids.len()];
        let reserves = conditional.balance_of_batch(&holders, &pool.position_ids);
        let amounts_removed = removal_amounts(shares_to_burn, supply, &reserves)?;
        let fee_payout = pool.fee_pool.withdrawable_by(&caller, balance, supply)?;
        if tokens.balance_of(&pool.collateral, &pool_address) < fee_payout {
            return Err(PoolError::InsufficientFunds);
        }

        let fees_settled = pool.burn_shares(&caller, shares_to_burn)?;
        debug_assert_eq!(fees_settled, fee_payout);
        if fees_settled > 0 {
            tokens.transfer(pool.collateral, pool_address, caller, fees_settled)?;
        }
        for (position, removed) in pool.position_ids.iter().zip(amounts_removed.iter()) {
            if *removed > 0 {
                conditional.transfer(pool_address, caller, *position, *removed)?;
            }
        }

        events.push(PoolEvent::FundingRemoved {
            pool: pool_address,
            funder: caller,
            amounts_removed: amounts_removed.clone(),
            collateral_removed_from_fee_pool: fees_settled,
            shares_burnt: shares_to_burn,
        });
        Ok(RemovedFunding {
            amounts_removed,
            collateral_removed_from_fee_pool: fees_settled,
            shares_burnt: shares_to_burn,
        })
    }

    /// Toggle the pool's open/closed flag, returning the new value.
    pub fn change_market_state(
        &self,
        caller: Address,
        pool_address: Address,
    ) -> Result<bool, PoolError> {
        let mut guard = self.lock();
        let Bank { pools, events, .. } = &mut *guard;
        let pool = pools.get_mut(&pool_address).ok_or(PoolError::PoolNotFound)?;
        if caller != pool.owner {
            return Err(PoolError::NotOwner);
        }
        pool.closed = !pool.closed;
        let closed = pool.closed;
        events.push(PoolEvent::MarketStateChanged {
            pool: pool_address,
            owner: caller,
            closed,
        });
        Ok(closed)
    }

    /// Dry run of the address `create2_pool` would deploy at.
    ///
    /// Pure function of the inputs and the factory's identity; touches no
    /// lock and no state, so it is safe to call while a creation is
    /// pending.
    pub fn compute_pool_address(
        &self,
        creator: Address,
        salt_nonce: u64,
        args: &PoolCtorArgs,
    ) -> Address {
        compute_pool_address(
            self.factory_address,
            self.implementation_master,
            creator,
            salt_nonce,
            args,
        )
    }

    /// Address the factory is deployed at
    pub fn factory_address(&self) -> Address {
        self.factory_address
    }

    /// Identifier of the shared implementation master
    pub fn implementation_master(&self) -> Address {
        self.implementation_master
    }

    /// Pool address at `index` in creation order
    pub fn markets(&self, index: usize) -> Option<Address> {
        self.lock().factory.markets(index)
    }

    /// Number of pools created so far
    pub fn market_count(&self) -> usize {
        self.lock().factory.market_count()
    }

    /// Snapshot of all events emitted so far, in submission order
    pub fn events(&self) -> Vec<PoolEvent> {
        self.lock().events.clone()
    }

    // ---- pool reads ----

    /// Owner of a pool
    pub fn owner(&self, pool: Address) -> Result<Address, PoolError> {
        self.read_pool(pool, |pool| pool.owner)
    }

    /// Whether funding operations are currently rejected
    pub fn closed(&self, pool: Address) -> Result<bool, PoolError> {
        self.read_pool(pool, |pool| pool.closed)
    }

    /// Question descriptor of a pool
    pub fn question(&self, pool: Address) -> Result<[u8; 32], PoolError> {
        self.read_pool(pool, |pool| pool.question)
    }

    /// Fee factor configured at creation
    pub fn fee_factor(&self, pool: Address) -> Result<u128, PoolError> {
        self.read_pool(pool, |pool| pool.fee_factor)
    }

    /// Atomic outcome positions of a pool
    pub fn position_ids(&self, pool: Address) -> Result<Vec<PositionId>, PoolError> {
        self.read_pool(pool, |pool| pool.position_ids.clone())
    }

    /// Share balance of a holder
    pub fn balance_of(&self, pool: Address, holder: Address) -> Result<u128, PoolError> {
        self.read_pool(pool, |pool| pool.balance_of(&holder))
    }

    /// Current share supply of a pool
    pub fn total_supply(&self, pool: Address) -> Result<u128, PoolError> {
        self.read_pool(pool, |pool| pool.total_supply())
    }

    /// Collateral currently held for shareholders
    pub fn collected_fees(&self, pool: Address) -> Result<u128, PoolError> {
        self.read_pool(pool, |pool| pool.fee_pool.collected_fees())
    }

    /// Fee collateral `holder` could withdraw right now
    pub fn fees_withdrawable_by(
        &self,
        pool: Address,
        holder: Address,
    ) -> Result<u128, PoolError> {
        let bank = self.lock();
        let pool = bank.pools.get(&pool).ok_or(PoolError::PoolNotFound)?;
        pool.fee_pool
            .withdrawable_by(&holder, pool.balance_of(&holder), pool.total_supply())
    }

    fn read_pool<T>(
        &self,
        pool: Address,
        read: impl FnOnce(&Pool) -> T,
    ) -> Result<T, PoolError> {
        let bank = self.lock();
        let pool = bank.pools.get(&pool).ok_or(PoolError::PoolNotFound)?;
        Ok(read(pool))
    }

    // ---- collateral token passthroughs ----

    /// Credit freshly deposited collateral to `holder`
    pub fn deposit(&self, token: Address, holder: Address, amount: u128) -> PoolResult {
        self.lock().tokens.deposit(token, holder, amount)
    }

    /// Let `spender` move up to `amount` of the caller's collateral
    pub fn approve(&self, token: Address, owner: Address, spender: Address, amount: u128) {
        self.lock().tokens.approve(token, owner, spender, amount)
    }

    /// Collateral balance of `holder`
    pub fn collateral_balance_of(&self, token: Address, holder: Address) -> u128 {
        self.lock().tokens.balance_of(&token, &holder)
    }

    // ---- conditional ledger passthroughs ----

    /// Prepare a condition for later resolution by `oracle`
    pub fn prepare_condition(
        &self,
        oracle: Address,
        question_id: QuestionId,
        outcome_slot_count: u32,
    ) -> Result<ConditionId, PoolError> {
        self.lock()
            .conditional
            .prepare_condition(oracle, question_id, outcome_slot_count)
    }

    /// Report payout numerators for a condition, resolving it
    pub fn report_payouts(
        &self,
        caller: Address,
        condition: ConditionId,
        payouts: &[u128],
    ) -> PoolResult {
        self.lock().conditional.report_payouts(caller, condition, payouts)
    }

    /// Whether the condition's oracle has reported payouts
    pub fn is_resolved(&self, condition: ConditionId) -> Result<bool, PoolError> {
        self.lock().conditional.is_resolved(&condition)
    }

    /// Balance of `holder` in one outcome position
    pub fn outcome_balance_of(&self, holder: Address, position: PositionId) -> u128 {
        self.lock().conditional.balance_of(&holder, &position)
    }

    /// Balances for holder/position pairs, zipped index by index
    pub fn outcome_balance_of_batch(
        &self,
        holders: &[Address],
        positions: &[PositionId],
    ) -> Vec<u128> {
        self.lock().conditional.balance_of_batch(holders, positions)
    }
}

/// Funded amount per position for a first funding round, treating an
/// empty hint as an even split.
fn planned_initial_amounts(
    amount: u128,
    distribution: &[u128],
    position_count: usize,
) -> Result<Vec<u128>, PoolError> {
    if distribution.is_empty() {
        return initial_funding_amounts(amount, &vec![1u128; position_count]);
    }
    if distribution.len() != position_count {
        return Err(PoolError::InvalidDistributionHint);
    }
    initial_funding_amounts(amount, distribution)
}
