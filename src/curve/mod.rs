//! Funding curve of the fixed product market maker

mod fpmm;

pub use fpmm::*;
