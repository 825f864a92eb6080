//! Shared configuration template for pool instantiation

use alloy_primitives::Address;

/// Current template version
pub const TEMPLATE_VERSION: u8 = 1;

/// Gate applied to `remove_funding`.
///
/// Deployments disagree on whether defunding must wait for resolution,
/// so the gate is a template-level policy instead of a hardcoded rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DefundingPolicy {
    /// Funding can only be removed once every bound condition has
    /// reported payouts
    RequireResolution,
    /// Funding can be removed at any time
    AllowUnresolved,
}

impl Default for DefundingPolicy {
    fn default() -> Self {
        DefundingPolicy::RequireResolution
    }
}

/// Immutable configuration shared by every pool a factory creates.
///
/// Creation clones a fresh pool from this template rather than handing
/// out references to it, so pools never observe template changes (there
/// are none) and never alias each other's state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PoolTemplate {
    /// Identifier of the implementation master the factory clones
    pub implementation_master: Address,
    /// Defunding gate stamped onto each new pool
    pub defunding_policy: DefundingPolicy,
}

impl PoolTemplate {
    /// Template with the given master and the default defunding gate
    pub fn new(implementation_master: Address) -> Self {
        Self {
            implementation_master,
            defunding_policy: DefundingPolicy::default(),
        }
    }

    /// Override the defunding gate
    pub fn with_defunding_policy(mut self, policy: DefundingPolicy) -> Self {
        self.defunding_policy = policy;
        self
    }
}
