//! State kept by the factory and its pools

mod fees;
mod pool;
mod template;

pub use fees::*;
pub use pool::*;
pub use template::*;

/// Build a question descriptor from ascii text, zero padded to 32 bytes.
///
/// Text longer than 32 bytes is truncated.
pub fn question_bytes(text: &str) -> [u8; 32] {
    let mut question = [0u8; 32];
    let raw = text.as_bytes();
    let len = raw.len().min(32);
    question[..len].copy_from_slice(&raw[..len]);
    question
}

#[cfg(test)]
/// Template for testing
pub const DEFAULT_TEST_TEMPLATE: PoolTemplate = PoolTemplate {
    implementation_master: alloy_primitives::Address::ZERO,
    defunding_policy: DefundingPolicy::RequireResolution,
};
