//! Shared harness for the integration scenarios.

#![allow(dead_code)]

use fpmm_pool::{
    alloy_primitives::{Address, B256},
    conditional::ConditionId,
    factory::PoolCtorArgs,
    instruction::CreatePoolData,
    processor::Processor,
    state::{question_bytes, DefundingPolicy, PoolTemplate},
};
use rand::RngCore;

/// One unit of 18-decimal collateral
pub const WAD: u128 = 1_000_000_000_000_000_000;
/// Collateral pulled by the default creation
pub const INITIAL_FUNDS: u128 = 10 * WAD;
/// Fee factor of the default pool
pub const FEE_FACTOR: u128 = 2 * WAD;
/// Salt nonce of the default pool
pub const SALT_NONCE: u64 = 2020;
/// Outcome slots of the default condition
pub const NUM_OUTCOMES: u32 = 10;
/// Question stored on the default pool
pub const QUESTION_TEXT: &str = "IS this a metaverse? ";

pub fn random_address() -> Address {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    Address::from(bytes)
}

pub fn random_question_id() -> B256 {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    B256::from(bytes)
}

/// Weights 10 down to 1, descending across the outcome slots
pub fn initial_distribution() -> Vec<u128> {
    (1..=10u128).rev().collect()
}

/// Holdings the default creation leaves in the pool, 1e18 per weight unit
pub fn expected_funded_amounts() -> Vec<u128> {
    (1..=10u128).rev().map(|weight| weight * WAD).collect()
}

pub struct TestSetup {
    pub processor: Processor,
    pub factory: Address,
    pub creator: Address,
    pub oracle: Address,
    pub investor: Address,
    pub collateral: Address,
    pub condition: ConditionId,
}

pub fn setup() -> TestSetup {
    setup_with_policy(DefundingPolicy::RequireResolution)
}

pub fn setup_with_policy(policy: DefundingPolicy) -> TestSetup {
    let factory = random_address();
    let template = PoolTemplate::new(random_address()).with_defunding_policy(policy);
    let processor = Processor::new(factory, template);

    let oracle = random_address();
    let condition = processor
        .prepare_condition(oracle, random_question_id(), NUM_OUTCOMES)
        .unwrap();

    TestSetup {
        processor,
        factory,
        creator: random_address(),
        oracle,
        investor: random_address(),
        collateral: random_address(),
        condition,
    }
}

pub fn create_pool_data(setup: &TestSetup) -> CreatePoolData {
    CreatePoolData {
        salt_nonce: SALT_NONCE,
        collateral_token: setup.collateral,
        condition_ids: vec![setup.condition],
        fee_factor: FEE_FACTOR,
        initial_funds: INITIAL_FUNDS,
        initial_distribution: initial_distribution(),
        question: question_bytes(QUESTION_TEXT),
    }
}

pub fn ctor_args(setup: &TestSetup) -> PoolCtorArgs {
    PoolCtorArgs {
        collateral: setup.collateral,
        conditions: vec![setup.condition],
        fee_factor: FEE_FACTOR,
        question: question_bytes(QUESTION_TEXT),
    }
}

/// Deposit collateral for the holder and approve `spender` for it
pub fn fund_and_approve(setup: &TestSetup, holder: Address, spender: Address, amount: u128) {
    setup
        .processor
        .deposit(setup.collateral, holder, amount)
        .unwrap();
    setup.processor.approve(setup.collateral, holder, spender, amount);
}

/// Create the default pool: deposit, approve the factory, then one
/// atomic create-and-fund call
pub fn create_default_pool(setup: &TestSetup) -> Address {
    fund_and_approve(setup, setup.creator, setup.factory, INITIAL_FUNDS);
    setup
        .processor
        .create2_pool(setup.creator, create_pool_data(setup))
        .unwrap()
}
