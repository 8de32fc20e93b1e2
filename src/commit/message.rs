//! Commit message generation via the OpenRouter client.

use tracing::debug;

use crate::api::OpenRouterClient;
use crate::commit::prompt::{build_system_prompt, build_user_prompt};
use crate::error::ApiError;
use crate::git::StagedChanges;

/// Maximum display width before a line gets wrapped.
const WRAP_WIDTH: usize = 80;

/// Generate a commit message for the staged changes.
pub async fn generate_commit_message(
    client: &OpenRouterClient,
    model: &str,
    temperature: Option<f64>,
    changes: &StagedChanges,
) -> Result<String, ApiError> {
    let system_prompt = build_system_prompt();
    let user_prompt = build_user_prompt(&changes.files_status, &changes.diff);

    debug!(
        "Generating commit message with {model}: {} status chars, {} diff chars",
        changes.files_status.len(),
        changes.diff.len()
    );

    let message = client
        .generate_completion(model, &system_prompt, &user_prompt, temperature, false)
        .await?;

    Ok(message.trim().to_string())
}

/// Format a commit message for display, wrapping long lines at 80 columns.
pub fn format_message(msg: &str) -> String {
    let mut formatted_lines = Vec::new();

    for line in msg.lines() {
        if line.len() > WRAP_WIDTH {
            formatted_lines.extend(
                textwrap::wrap(line, WRAP_WIDTH)
                    .into_iter()
                    .map(|l| l.into_owned()),
            );
        } else {
            formatted_lines.push(line.to_string());
        }
    }

    formatted_lines.join("\n")
}
