//! Token estimation for prompt budgeting.
//!
//! Token counts are approximated with a fixed characters-per-token ratio;
//! actual tokenization varies by model and is never computed exactly.

pub mod trimmer;

pub use trimmer::{TrimOutcome, trim_to_budget};

/// Average characters per token for English text.
pub const CHARS_PER_TOKEN: usize = 4;

/// Tokens reserved for message formatting (role markers, structure).
pub const MESSAGE_OVERHEAD_TOKENS: usize = 200;

/// Estimate the number of tokens in a text.
///
/// Uses a fixed ratio of 4 characters per token, biased upward by one token
/// so the estimate is never zero. Deterministic and allocation-free.
pub fn estimate_tokens(text: &str) -> usize {
    text.len() / CHARS_PER_TOKEN + 1
}
