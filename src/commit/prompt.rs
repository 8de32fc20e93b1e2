//! Prompt construction for AI-generated commit messages.

/// Build the system prompt describing how commit messages must be written.
pub fn build_system_prompt() -> String {
    r#"You are an assistant that writes Git commit messages from staged changes.

## Subject Line Rules
- Format: `type(scope): description` following the Conventional Commits specification
- Type: one of feat, fix, build, chore, ci, docs, style, refactor, perf, test
- Scope: infer from the primary module affected; optional for broad changes
- Description: imperative mood ("add", "fix", "remove"), lowercase after the colon, no period at the end
- Keep the entire subject line at 50 characters or fewer

## Body Rules
- The diff already shows WHAT changed; the body explains WHY
- Wrap lines at 72 characters
- Separate the body from the subject with a blank line
- For trivial changes (typos, formatting) omit the body entirely

## Output
Respond with ONLY the commit message text. No markdown fences, no
explanation, no commentary before or after."#
        .to_string()
}

/// Build the user prompt embedding the staged file list and diff.
pub fn build_user_prompt(files_status: &str, diff: &str) -> String {
    format!(
        r#"Write a commit message for the following staged changes.

## Changed Files
{files_status}

## Diff
```
{diff}
```"#
    )
}
