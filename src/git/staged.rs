//! Staged-change collection and commit creation using git2.

use git2::{Delta, DiffFormat, ErrorCode, Oid, Repository, Tree};

use crate::error::GitError;

/// The two text blocks describing what is currently staged.
#[derive(Debug, Clone)]
pub struct StagedChanges {
    /// Condensed per-file change list, one `<status letter> <path>` per line.
    pub files_status: String,
    /// Unified diff of the staged changes.
    pub diff: String,
}

impl StagedChanges {
    /// Whether there is nothing staged to describe.
    pub fn is_empty(&self) -> bool {
        self.files_status.is_empty() || self.diff.is_empty()
    }
}

/// Open the repository containing the current directory.
pub fn open_repository() -> Result<Repository, GitError> {
    Repository::discover(".").map_err(GitError::NotARepository)
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found),
/// so the staged diff of a fresh repository compares against nothing.
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
    Ok(Some(tree))
}

/// Collect the staged changes: per-file status list plus unified diff.
///
/// Only the index is diffed against HEAD; unstaged and untracked changes
/// never appear here.
pub fn collect_staged(repo: &Repository) -> Result<StagedChanges, GitError> {
    let head_tree = resolve_head_tree(repo)?;

    let diff = repo
        .diff_tree_to_index(head_tree.as_ref(), None, None)
        .map_err(GitError::DiffFailed)?;

    let mut files_status = String::new();
    for delta in diff.deltas() {
        let Some(letter) = status_letter(delta.status()) else {
            continue;
        };
        let path = delta
            .new_file()
            .path()
            .or_else(|| delta.old_file().path())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        files_status.push_str(&format!("{letter} {path}\n"));
    }

    let mut diff_text = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if matches!(line.origin(), '+' | '-' | ' ') {
            diff_text.push(line.origin());
        }
        diff_text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })
    .map_err(GitError::DiffFailed)?;

    Ok(StagedChanges {
        files_status: files_status.trim_end().to_string(),
        diff: diff_text.trim_end().to_string(),
    })
}

fn status_letter(status: Delta) -> Option<char> {
    match status {
        Delta::Added => Some('A'),
        Delta::Modified => Some('M'),
        Delta::Deleted => Some('D'),
        Delta::Renamed => Some('R'),
        Delta::Copied => Some('C'),
        Delta::Typechange => Some('T'),
        _ => None,
    }
}

/// Commit whatever is already staged with the given message.
///
/// Never stages anything itself: the index is written out as-is. Handles
/// the initial commit on an unborn HEAD.
pub fn commit_staged(repo: &Repository, message: &str) -> Result<Oid, GitError> {
    let mut index = repo.index().map_err(GitError::CommitFailed)?;
    let tree_id = index.write_tree().map_err(GitError::CommitFailed)?;
    let tree = repo.find_tree(tree_id).map_err(GitError::CommitFailed)?;

    let sig = repo.signature().map_err(GitError::ConfigError)?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit().map_err(GitError::CommitFailed)?),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => None,
        Err(e) => return Err(GitError::CommitFailed(e)),
    };
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .map_err(GitError::CommitFailed)
}
