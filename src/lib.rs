//! scriba - A CLI tool that generates commit messages from staged changes using AI.
//!
//! # Overview
//!
//! scriba collects the staged diff and per-file status from the current git
//! repository, budgets the prompts against the configured model's context
//! length (trimming oversized input deterministically), asks the OpenRouter
//! API for a commit message, and commits once the user approves it.

pub mod api;
pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod spinner;
pub mod tokens;

// Re-export commonly used types
pub use api::{ModelLimits, OpenRouterClient};
pub use commit::{format_message, generate_commit_message};
pub use config::Config;
pub use error::{ApiError, ConfigError, GitError};
pub use git::StagedChanges;
pub use tokens::{estimate_tokens, trim_to_budget};
