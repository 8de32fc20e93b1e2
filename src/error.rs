//! Error types for scriba modules using thiserror.

use thiserror::Error;

/// Errors from the OpenRouter API client.
///
/// Every completion call ends in exactly one of these; there are no retries,
/// so each variant is terminal for the call that produced it.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to connect to OpenRouter API: {0}")]
    Connectivity(#[source] reqwest::Error),

    #[error("API returned unexpected response format: {0}")]
    MalformedResponse(String),

    #[error("Failed to parse API response: {0}")]
    ParseFailed(#[source] serde_json::Error),

    #[error(
        "Context length exceeded for {model}:{} Input is {input_tokens} tokens, but the model only supports {context_length} tokens (exceeding by {exceeded_by} tokens). Try splitting your staged changes into multiple smaller commits, or use a model with a larger context size.",
        attempt_note(*.compressed, *.trimmed)
    )]
    ContextLengthExceeded {
        /// Model display name with any provider prefix stripped.
        model: String,
        input_tokens: u64,
        context_length: u64,
        exceeded_by: u64,
        /// Whether the middle-out transform was attached to the request.
        compressed: bool,
        /// Whether the input was trimmed before dispatch.
        trimmed: bool,
    },

    #[error("API request failed:\n{0}")]
    RequestFailed(String),
}

fn attempt_note(compressed: bool, trimmed: bool) -> String {
    match (compressed, trimmed) {
        (true, true) => {
            " Even with content compression enabled, and after automatic content trimming, the request exceeded the model's context limit."
                .to_string()
        }
        (true, false) => {
            " Even with content compression enabled, the request exceeded the model's context limit."
                .to_string()
        }
        _ => String::new(),
    }
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository. Run scriba from within a git repository.")]
    NotARepository(#[source] git2::Error),

    #[error("Failed to collect staged changes: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    ConfigError(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),
}

/// Errors from configuration file handling.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine a configuration directory for this platform")]
    NoConfigDir,

    #[error("Failed to read configuration: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to write configuration: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(#[source] serde_yaml::Error),

    #[error("Unknown configuration parameter '{0}'. Expected one of: model, api_token, temperature")]
    UnknownParameter(String),

    #[error("Invalid value for '{parameter}': {message}")]
    InvalidValue { parameter: String, message: String },
}
