//! Utility modules

pub mod amm_math;
pub mod hash;

pub use amm_math::{quote_swap, SwapOutcome, SwapQuote};
pub use hash::{hash_block, short_hash};
