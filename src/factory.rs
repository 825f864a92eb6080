//! Deterministic pool factory.
//!
//! Pool addresses are a pure function of the factory address, the
//! creator, a salt nonce, the implementation master and the pool's
//! constructor arguments. Anyone can recompute the address of a pool
//! before it exists and the mutating creation call lands exactly there.

use alloy_primitives::{keccak256, Address, B256};

use crate::{
    conditional::ConditionId,
    state::{PoolTemplate, TEMPLATE_VERSION},
};

/// Registry and template of the deterministic factory
#[derive(Clone, Debug, PartialEq)]
pub struct Factory {
    address: Address,
    template: PoolTemplate,
    markets: Vec<Address>,
}

impl Factory {
    /// Factory deployed at `address` cloning pools from `template`
    pub fn new(address: Address, template: PoolTemplate) -> Self {
        Self {
            address,
            template,
            markets: Vec::new(),
        }
    }

    /// Address the factory itself is deployed at
    pub fn address(&self) -> Address {
        self.address
    }

    /// Template every new pool is cloned from
    pub fn template(&self) -> &PoolTemplate {
        &self.template
    }

    /// Identifier of the shared implementation master
    pub fn implementation_master(&self) -> Address {
        self.template.implementation_master
    }

    /// Pool address at `index` in creation order
    pub fn markets(&self, index: usize) -> Option<Address> {
        self.markets.get(index).copied()
    }

    /// Number of pools created so far
    pub fn market_count(&self) -> usize {
        self.markets.len()
    }

    /// Dry run of the address the factory would deploy at.
    pub fn compute_pool_address(&self, creator: Address, salt_nonce: u64, args: &PoolCtorArgs) -> Address {
        compute_pool_address(
            self.address,
            self.template.implementation_master,
            creator,
            salt_nonce,
            args,
        )
    }

    /// Append a freshly created pool to the registry.
    pub(crate) fn register(&mut self, pool: Address) {
        self.markets.push(pool);
    }
}

/// Constructor arguments that feed the address derivation.
///
/// The funding inputs are deliberately absent: two creations differing
/// only in initial funds would still collide, exactly like the deployed
/// factory.
#[derive(Clone, Debug, PartialEq)]
pub struct PoolCtorArgs {
    /// Collateral token of the new pool
    pub collateral: Address,
    /// Conditions the pool is bound to
    pub conditions: Vec<ConditionId>,
    /// Fee factor of the new pool
    pub fee_factor: u128,
    /// Question descriptor of the new pool
    pub question: [u8; 32],
}

/// Compute the deterministic pool address.
///
/// `create2(factory, keccak(creator ++ nonce), keccak(version ++ master
/// ++ ctor args))`. Pure and side effect free, safe to call while a
/// creation for the same inputs is pending.
pub fn compute_pool_address(
    factory: Address,
    implementation_master: Address,
    creator: Address,
    salt_nonce: u64,
    args: &PoolCtorArgs,
) -> Address {
    let mut salt_preimage = Vec::with_capacity(20 + 32);
    salt_preimage.extend_from_slice(creator.as_slice());
    salt_preimage.extend_from_slice(&nonce_word(salt_nonce));
    let salt = keccak256(&salt_preimage);

    factory.create2(salt, init_code_hash(implementation_master, creator, args))
}

/// Hash standing in for the clone bytecode plus constructor arguments.
pub fn init_code_hash(implementation_master: Address, owner: Address, args: &PoolCtorArgs) -> B256 {
    let mut preimage = Vec::with_capacity(1 + 20 + 20 + 32 + 32 + 32 * args.conditions.len() + 32);
    preimage.push(TEMPLATE_VERSION);
    preimage.extend_from_slice(implementation_master.as_slice());
    preimage.extend_from_slice(args.collateral.as_slice());
    for condition in &args.conditions {
        preimage.extend_from_slice(condition.as_slice());
    }
    preimage.extend_from_slice(&amount_word(args.fee_factor));
    preimage.extend_from_slice(owner.as_slice());
    preimage.extend_from_slice(&args.question);
    keccak256(&preimage)
}

fn nonce_word(nonce: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&nonce.to_be_bytes());
    word
}

fn amount_word(amount: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&amount.to_be_bytes());
    word
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn args() -> PoolCtorArgs {
        PoolCtorArgs {
            collateral: Address::repeat_byte(0xee),
            conditions: vec![B256::repeat_byte(5)],
            fee_factor: 2_000_000_000_000_000_000,
            question: [7u8; 32],
        }
    }

    #[test]
    fn derivation_is_reproducible() {
        let factory = address!("00000000000000000000000000000000000000fa");
        let master = address!("00000000000000000000000000000000000000aa");
        let creator = Address::repeat_byte(1);

        let first = compute_pool_address(factory, master, creator, 2020, &args());
        let second = compute_pool_address(factory, master, creator, 2020, &args());
        assert_eq!(first, second);
    }

    #[test]
    fn derivation_separates_creators_and_nonces() {
        let factory = Address::repeat_byte(0xfa);
        let master = Address::repeat_byte(0xaa);
        let creator = Address::repeat_byte(1);
        let other = Address::repeat_byte(2);

        let base = compute_pool_address(factory, master, creator, 2020, &args());
        assert_ne!(base, compute_pool_address(factory, master, creator, 2021, &args()));
        assert_ne!(base, compute_pool_address(factory, master, other, 2020, &args()));
        assert_ne!(base, compute_pool_address(other, master, creator, 2020, &args()));
    }

    #[test]
    fn derivation_covers_constructor_args() {
        let factory = Address::repeat_byte(0xfa);
        let master = Address::repeat_byte(0xaa);
        let creator = Address::repeat_byte(1);

        let base = compute_pool_address(factory, master, creator, 2020, &args());

        let mut changed = args();
        changed.fee_factor += 1;
        assert_ne!(base, compute_pool_address(factory, master, creator, 2020, &changed));

        let mut changed = args();
        changed.question[0] ^= 1;
        assert_ne!(base, compute_pool_address(factory, master, creator, 2020, &changed));

        assert_ne!(
            base,
            compute_pool_address(factory, Address::repeat_byte(0xab), creator, 2020, &args())
        );
    }

    #[test]
    fn registry_preserves_creation_order() {
        let mut factory = Factory::new(Address::repeat_byte(0xfa), PoolTemplate::new(Address::repeat_byte(0xaa)));
        let first = Address::repeat_byte(1);
        let second = Address::repeat_byte(2);

        factory.register(first);
        factory.register(second);
        assert_eq!(factory.markets(0), Some(first));
        assert_eq!(factory.markets(1), Some(second));
        assert_eq!(factory.markets(2), None);
        assert_eq!(factory.market_count(), 2);
    }
}
