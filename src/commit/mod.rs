//! AI-generated commit messages from staged changes.

pub mod message;
pub mod prompt;

pub use message::{format_message, generate_commit_message};
pub use prompt::{build_system_prompt, build_user_prompt};
