#![deny(missing_docs)]

//! A fixed product market maker with deterministic pool deployment.

pub mod conditional;
pub mod curve;
pub mod error;
pub mod event;
pub mod factory;
pub mod instruction;
pub mod math;
pub mod processor;
pub mod state;
pub mod token;

// Export current alloy-primitives types for downstream users who may also
// be building with a different alloy-primitives version
pub use alloy_primitives;
