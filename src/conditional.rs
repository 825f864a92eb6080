//! Conditional token ledger.
//!
//! Stand-in for the outcome ledger the deployed system consumes as an
//! external service. Conditions are prepared by anyone, resolved by
//! their oracle, and positions are identified by a keccak chain so every
//! identifier is computable off line before it is ever touched.

use std::collections::HashMap;

use alloy_primitives::{keccak256, Address, B256};

use crate::{
    error::{PoolError, PoolResult},
    math::TryAdd,
};

/// Identifier of a prepared condition
pub type ConditionId = B256;
/// Identifier of an outcome collection
pub type CollectionId = B256;
/// Identifier of an atomic outcome position
pub type PositionId = B256;
/// Opaque question identifier a condition is prepared for
pub type QuestionId = B256;

/// Highest supported outcome slot count per condition.
///
/// Index sets are one bit per slot in a u64.
pub const MAX_OUTCOME_SLOTS: u32 = 64;

/// Derive a condition identifier from its preparation inputs.
pub fn condition_id(oracle: Address, question_id: QuestionId, outcome_slot_count: u32) -> ConditionId {
    let mut preimage = Vec::with_capacity(20 + 32 + 32);
    preimage.extend_from_slice(oracle.as_slice());
    preimage.extend_from_slice(question_id.as_slice());
    preimage.extend_from_slice(&word(outcome_slot_count as u128));
    keccak256(&preimage)
}

/// Derive the collection reached from `parent` by taking `index_set`
/// outcomes of `condition`.
pub fn collection_id(
    parent: CollectionId,
    condition: ConditionId,
    index_set: u64,
) -> CollectionId {
    let mut preimage = Vec::with_capacity(32 + 32 + 32);
    preimage.extend_from_slice(parent.as_slice());
    preimage.extend_from_slice(condition.as_slice());
    preimage.extend_from_slice(&word(index_set as u128));
    keccak256(&preimage)
}

/// Derive a position identifier from collateral and collection.
pub fn position_id(collateral: Address, collection: CollectionId) -> PositionId {
    let mut preimage = Vec::with_capacity(20 + 32);
    preimage.extend_from_slice(collateral.as_slice());
    preimage.extend_from_slice(collection.as_slice());
    keccak256(&preimage)
}

fn word(value: u128) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[16..].copy_from_slice(&value.to_be_bytes());
    bytes
}

/// A prepared condition
#[derive(Clone, Debug, PartialEq)]
struct Condition {
    oracle: Address,
    question_id: QuestionId,
    outcome_slot_count: u32,
    /// Empty until the oracle reports
    payout_numerators: Vec<u128>,
}

/// Conditions and outcome position balances
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConditionalLedger {
    conditions: HashMap<ConditionId, Condition>,
    balances: HashMap<(Address, PositionId), u128>,
}

impl ConditionalLedger {
    /// Prepare a condition for later resolution by `oracle`.
    ///
    /// # Arguments
    ///
    /// * oracle - identity allowed to report payouts.
    /// * question_id - opaque question identifier.
    /// * outcome_slot_count - number of outcome slots, `2..=64`.
    ///
    /// # Return value
    ///
    /// the derived condition identifier.
    pub fn prepare_condition(
        &mut self,
        oracle: Address,
        question_id: QuestionId,
        outcome_slot_count: u32,
    ) -> Result<ConditionId, PoolError> {
        if outcome_slot_count < 2 || outcome_slot_count > MAX_OUTCOME_SLOTS {
            return Err(PoolError::InvalidOutcomeSlotCount);
        }
        let id = condition_id(oracle, question_id, outcome_slot_count);
        if self.conditions.contains_key(&id) {
            return Err(PoolError::ConditionAlreadyPrepared);
        }
        self.conditions.insert(
            id,
            Condition {
                oracle,
                question_id,
                outcome_slot_count,
                payout_numerators: Vec::new(),
            },
        );
        Ok(id)
    }

    /// Report payout numerators for a condition, resolving it.
    ///
    /// Only the preparing oracle may report, exactly one numerator per
    /// outcome slot, and at least one numerator must be nonzero.
    pub fn report_payouts(
        &mut self,
        caller: Address,
        condition: ConditionId,
        payouts: &[u128],
    ) -> PoolResult {
        let prepared = self
            .conditions
            .get_mut(&condition)
            .ok_or(PoolError::ConditionNotFound)?;
        if caller != prepared.oracle {
            return Err(PoolError::Unauthorized);
        }
        if !prepared.payout_numerators.is_empty() {
            return Err(PoolError::ConditionAlreadyResolved);
        }
        if payouts.len() != prepared.outcome_slot_count as usize
            || payouts.iter().all(|numerator| *numerator == 0)
        {
            return Err(PoolError::InvalidPayoutVector);
        }
        prepared.payout_numerators = payouts.to_vec();
        Ok(())
    }

    /// Whether the condition's oracle has reported payouts
    pub fn is_resolved(&self, condition: &ConditionId) -> Result<bool, PoolError> {
        let prepared = self
            .conditions
            .get(condition)
            .ok_or(PoolError::ConditionNotFound)?;
        Ok(!prepared.payout_numerators.is_empty())
    }

    /// Outcome slot count of a prepared condition
    pub fn outcome_slot_count(&self, condition: &ConditionId) -> Result<u32, PoolError> {
        Ok(self
            .conditions
            .get(condition)
            .ok_or(PoolError::ConditionNotFound)?
            .outcome_slot_count)
    }

    /// Balance of `holder` in one outcome position
    pub fn balance_of(&self, holder: &Address, position: &PositionId) -> u128 {
        self.balances
            .get(&(*holder, *position))
            .copied()
            .unwrap_or(0)
    }

    /// Balances for holder/position pairs, zipped index by index
    pub fn balance_of_batch(&self, holders: &[Address], positions: &[PositionId]) -> Vec<u128> {
        holders
            .iter()
            .zip(positions.iter())
            .map(|(holder, position)| self.balance_of(holder, position))
            .collect()
    }

    /// Enumerate the atomic outcome positions reached by nesting every
    /// condition's outcome slots, in condition-major order.
    pub fn atomic_position_ids(
        &self,
        collateral: Address,
        conditions: &[ConditionId],
    ) -> Result<Vec<PositionId>, PoolError> {
        let mut collections: Vec<CollectionId> = vec![B256::ZERO];
        for condition in conditions {
            let slots = self.outcome_slot_count(condition)?;
            let mut nested = Vec::with_capacity(collections.len() * slots as usize);
            for parent in &collections {
                for slot in 0..slots {
                    nested.push(collection_id(*parent, *condition, 1u64 << slot));
                }
            }
            collections = nested;
        }
        Ok(collections
            .into_iter()
            .map(|collection| position_id(collateral, collection))
            .collect())
    }

    /// Credit outcome tokens to `holder`.
    pub(crate) fn mint(
        &mut self,
        holder: Address,
        position: PositionId,
        amount: u128,
    ) -> PoolResult {
        let balance = self.balance_of(&holder, &position).try_add(amount)?;
        self.balances.insert((holder, position), balance);
        Ok(())
    }

    /// Move outcome tokens between holders.
    pub(crate) fn transfer(
        &mut self,
        from: Address,
        to: Address,
        position: PositionId,
        amount: u128,
    ) -> PoolResult {
        let sender = self.balance_of(&from, &position);
        if sender < amount {
            return Err(PoolError::InsufficientFunds);
        }
        let recipient = self.balance_of(&to, &position).try_add(amount)?;
        self.balances.insert((from, position), sender - amount);
        self.balances.insert((to, position), recipient);
        Ok(())
    }
}
