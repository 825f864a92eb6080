mod utils;

use assert_matches::assert_matches;
use fpmm_pool::{
    error::PoolError,
    event::PoolEvent,
    state::question_bytes,
};
use utils::*;

#[test]
fn test_success() {
    let setup = setup();
    let processor = &setup.processor;

    fund_and_approve(&setup, setup.creator, setup.factory, INITIAL_FUNDS);

    // the dry run commits to the address before anything exists
    let predicted = processor.compute_pool_address(setup.creator, SALT_NONCE, &ctor_args(&setup));
    assert_eq!(processor.market_count(), 0);

    let pool = processor
        .create2_pool(setup.creator, create_pool_data(&setup))
        .unwrap();
    assert_eq!(pool, predicted);
    assert_eq!(processor.markets(0), Some(pool));

    // all the creator's collateral moved into the pool
    assert_eq!(
        processor.collateral_balance_of(setup.collateral, setup.creator),
        0
    );
    assert_eq!(
        processor.collateral_balance_of(setup.collateral, pool),
        INITIAL_FUNDS
    );

    // shares landed with the creator, not the factory
    assert_eq!(processor.balance_of(pool, setup.creator).unwrap(), INITIAL_FUNDS);
    assert_eq!(processor.balance_of(pool, setup.factory).unwrap(), 0);
    assert_eq!(processor.total_supply(pool).unwrap(), INITIAL_FUNDS);

    assert!(!processor.closed(pool).unwrap());
    assert_eq!(processor.owner(pool).unwrap(), setup.creator);
    assert_eq!(
        processor.question(pool).unwrap(),
        question_bytes(QUESTION_TEXT)
    );
    assert_eq!(processor.fee_factor(pool).unwrap(), FEE_FACTOR);
    assert_eq!(processor.collected_fees(pool).unwrap(), 0);

    // reserves follow the weights, remainders went back to the creator
    let positions = processor.position_ids(pool).unwrap();
    let expected = expected_funded_amounts();
    assert_eq!(positions.len(), expected.len());
    for (position, funded) in positions.iter().zip(expected.iter()) {
        assert_eq!(processor.outcome_balance_of(pool, *position), *funded);
        assert_eq!(
            processor.outcome_balance_of(setup.creator, *position),
            INITIAL_FUNDS - *funded
        );
    }

    let events = processor.events();
    assert_eq!(events.len(), 2);
    assert_matches!(
        &events[0],
        PoolEvent::PoolCreation { creator, pool: created, collateral, fee_factor, .. }
            if *creator == setup.creator
                && *created == pool
                && *collateral == setup.collateral
                && *fee_factor == FEE_FACTOR
    );
    assert_matches!(
        &events[1],
        PoolEvent::FundingAdded { funder, amounts_added, shares_minted, .. }
            if *funder == setup.factory
                && *amounts_added == expected_funded_amounts()
                && *shares_minted == INITIAL_FUNDS
    );
}

#[test]
fn test_duplicate_nonce_fails() {
    let setup = setup();
    let processor = &setup.processor;

    let pool = create_default_pool(&setup);
    fund_and_approve(&setup, setup.creator, setup.factory, INITIAL_FUNDS);

    assert_eq!(
        processor
            .create2_pool(setup.creator, create_pool_data(&setup))
            .unwrap_err(),
        PoolError::DuplicateDeployment
    );
    assert_eq!(processor.markets(0), Some(pool));
    assert_eq!(processor.markets(1), None);

    // a fresh nonce from the same creator deploys somewhere else
    let mut data = create_pool_data(&setup);
    data.salt_nonce = SALT_NONCE + 1;
    let second = processor.create2_pool(setup.creator, data).unwrap();
    assert_ne!(second, pool);
    assert_eq!(processor.markets(1), Some(second));
}

#[test]
fn test_dry_run_is_side_effect_free() {
    let setup = setup();
    let processor = &setup.processor;

    let first = processor.compute_pool_address(setup.creator, SALT_NONCE, &ctor_args(&setup));
    let second = processor.compute_pool_address(setup.creator, SALT_NONCE, &ctor_args(&setup));
    assert_eq!(first, second);

    // nothing was created or registered by the dry runs
    assert_eq!(processor.market_count(), 0);
    assert!(processor.events().is_empty());
    assert_eq!(
        processor.closed(first).unwrap_err(),
        PoolError::PoolNotFound
    );
}

#[test]
fn test_requires_prepared_condition() {
    let setup = setup();
    let processor = &setup.processor;

    fund_and_approve(&setup, setup.creator, setup.factory, INITIAL_FUNDS);
    let mut data = create_pool_data(&setup);
    data.condition_ids = vec![random_question_id()];

    assert_eq!(
        processor.create2_pool(setup.creator, data).unwrap_err(),
        PoolError::ConditionNotFound
    );
    assert_eq!(processor.market_count(), 0);
}

#[test]
fn test_requires_funds_and_allowance() {
    let setup = setup();
    let processor = &setup.processor;

    // funds but no approval of the factory
    processor
        .deposit(setup.collateral, setup.creator, INITIAL_FUNDS)
        .unwrap();
    assert_eq!(
        processor
            .create2_pool(setup.creator, create_pool_data(&setup))
            .unwrap_err(),
        PoolError::InsufficientAllowance
    );

    // approval but not enough funds
    let poor = random_address();
    processor.deposit(setup.collateral, poor, WAD).unwrap();
    processor.approve(setup.collateral, poor, setup.factory, INITIAL_FUNDS);
    assert_eq!(
        processor
            .create2_pool(poor, create_pool_data(&setup))
            .unwrap_err(),
        PoolError::InsufficientFunds
    );

    // failed attempts deployed nothing
    assert_eq!(processor.market_count(), 0);
    assert!(processor.events().is_empty());
}

#[test]
fn test_distribution_hint_must_match_outcome_count() {
    let setup = setup();
    let processor = &setup.processor;

    fund_and_approve(&setup, setup.creator, setup.factory, INITIAL_FUNDS);
    let mut data = create_pool_data(&setup);
    data.initial_distribution = vec![1, 2, 3];

    assert_eq!(
        processor.create2_pool(setup.creator, data).unwrap_err(),
        PoolError::InvalidDistributionHint
    );
}
