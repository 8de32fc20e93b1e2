//! Content trimming to fit a model's context budget.
//!
//! When the combined prompt estimate exceeds the budget, each prompt is cut
//! down to its allotment by keeping a head and a tail portion with a visible
//! marker spliced between them, so the model still sees both ends of the
//! original content.

use crate::tokens::{CHARS_PER_TOKEN, MESSAGE_OVERHEAD_TOKENS, estimate_tokens};

/// Marker spliced between the kept head and tail of a trimmed text.
pub const TRIM_MARKER: &str = "\n\n[...content trimmed due to length constraints...]\n\n";

/// Default maximum fraction of the available budget reserved for the system prompt.
pub const SYSTEM_MAX_RATIO: f64 = 0.3;

/// Fraction of a trimmed system prompt's allotment kept from the head.
const SYSTEM_HEAD_FRACTION: f64 = 0.6;

/// Fraction of a trimmed user prompt's allotment kept from the head.
const USER_HEAD_FRACTION: f64 = 0.7;

/// Result of a trimming pass over the two prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimOutcome {
    pub system_prompt: String,
    pub user_prompt: String,
    pub trimmed: bool,
}

/// Trim the prompts to fit within `max_tokens` using the default system ratio.
pub fn trim_to_budget(system_prompt: &str, user_prompt: &str, max_tokens: usize) -> TrimOutcome {
    trim_to_budget_with_ratio(system_prompt, user_prompt, max_tokens, SYSTEM_MAX_RATIO)
}

/// Trim the prompts to fit within `max_tokens`.
///
/// Reserves [`MESSAGE_OVERHEAD_TOKENS`] for message formatting, caps the
/// system prompt at `system_max_ratio` of what remains, and gives the rest
/// to the user prompt. Each prompt is evaluated independently: a prompt
/// already within its allotment is returned byte-identical even when the
/// other one gets cut.
pub fn trim_to_budget_with_ratio(
    system_prompt: &str,
    user_prompt: &str,
    max_tokens: usize,
    system_max_ratio: f64,
) -> TrimOutcome {
    let available = max_tokens.saturating_sub(MESSAGE_OVERHEAD_TOKENS);

    let system_tokens = estimate_tokens(system_prompt);
    let user_tokens = estimate_tokens(user_prompt);

    if system_tokens + user_tokens <= available {
        return TrimOutcome {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
            trimmed: false,
        };
    }

    let max_system_tokens = system_tokens.min((available as f64 * system_max_ratio) as usize);
    let max_user_tokens = available - max_system_tokens;

    let system_out = if system_tokens > max_system_tokens {
        splice_middle(system_prompt, max_system_tokens, SYSTEM_HEAD_FRACTION)
    } else {
        system_prompt.to_string()
    };

    let user_out = if user_tokens > max_user_tokens {
        splice_middle(user_prompt, max_user_tokens, USER_HEAD_FRACTION)
    } else {
        user_prompt.to_string()
    };

    TrimOutcome {
        system_prompt: system_out,
        user_prompt: user_out,
        trimmed: true,
    }
}

/// Keep a head and a tail of `text` sized to roughly `allotment` tokens,
/// with [`TRIM_MARKER`] spliced in between.
///
/// `head_fraction` of the allotment comes from the start of the text and the
/// remainder from the end. Token counts convert to characters at the same
/// ratio the estimator uses.
fn splice_middle(text: &str, allotment: usize, head_fraction: f64) -> String {
    let keep_start = (allotment as f64 * head_fraction) as usize;
    let keep_end = allotment - keep_start;

    let start_chars = floor_char_boundary(text, keep_start * CHARS_PER_TOKEN);
    let end_chars = keep_end * CHARS_PER_TOKEN;
    let tail_start = ceil_char_boundary(text, text.len().saturating_sub(end_chars));

    format!("{}{}{}", &text[..start_chars], TRIM_MARKER, &text[tail_start..])
}

/// Largest index `<= at` that is a char boundary of `text`.
fn floor_char_boundary(text: &str, at: usize) -> usize {
    let mut idx = at.min(text.len());
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Smallest index `>= at` that is a char boundary of `text`.
fn ceil_char_boundary(text: &str, at: usize) -> usize {
    let mut idx = at.min(text.len());
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}
