//! Completion response classification.
//!
//! The provider returns loosely-shaped JSON: a `choices` list on success or
//! an `error` object on failure, sometimes with a non-success HTTP status
//! and sometimes without. Everything is decided once here into a tagged
//! result so callers never branch on raw response data.

use regex_lite::Regex;
use serde::Deserialize;

use crate::error::ApiError;

/// Maximum characters of a raw body echoed into an error message.
const MAX_BODY_EXCERPT: usize = 500;

#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Classify a completion response into generated text or a typed failure.
///
/// `ok` is whether the HTTP status was a success; `compressed` and `trimmed`
/// record what was already attempted before dispatch, so a context-length
/// failure can say so.
pub(crate) fn interpret_response(
    model: &str,
    ok: bool,
    body: &str,
    compressed: bool,
    trimmed: bool,
) -> Result<String, ApiError> {
    let parsed: CompletionBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        // On an HTTP failure the body is often not JSON at all; surface it raw.
        Err(e) if ok => return Err(ApiError::ParseFailed(e)),
        Err(_) => return Err(ApiError::RequestFailed(excerpt(body))),
    };

    if !ok || parsed.error.is_some() {
        let message = parsed
            .error
            .and_then(|e| e.message)
            .unwrap_or_else(|| excerpt(body));

        if let Some((input_tokens, context_length)) = parse_token_counts(&message) {
            return Err(ApiError::ContextLengthExceeded {
                model: display_model_name(model).to_string(),
                input_tokens,
                context_length,
                exceeded_by: input_tokens.saturating_sub(context_length),
                compressed,
                trimmed,
            });
        }

        return Err(ApiError::RequestFailed(message));
    }

    match parsed.choices.into_iter().next() {
        Some(choice) => Ok(choice.message.content),
        None => Err(ApiError::MalformedResponse(excerpt(body))),
    }
}

/// Extract input and context-length token counts from a provider error message.
///
/// Matches the patterns `input (<N> tokens)` and `context length (<N> tokens)`.
/// This is a heuristic against free-form provider text; it is isolated here
/// so it can be swapped out if the provider's message format changes.
pub(crate) fn parse_token_counts(message: &str) -> Option<(u64, u64)> {
    let input_re = Regex::new(r"input \((\d+) tokens\)").expect("Invalid regex");
    let context_re = Regex::new(r"context length \((\d+) tokens\)").expect("Invalid regex");

    let input_tokens = input_re.captures(message)?.get(1)?.as_str().parse().ok()?;
    let context_length = context_re.captures(message)?.get(1)?.as_str().parse().ok()?;

    Some((input_tokens, context_length))
}

/// Model name for display: strip any provider prefix before a `/` separator.
pub(crate) fn display_model_name(model: &str) -> &str {
    model.split('/').next_back().unwrap_or(model)
}

fn excerpt(body: &str) -> String {
    body.chars().take(MAX_BODY_EXCERPT).collect()
}
