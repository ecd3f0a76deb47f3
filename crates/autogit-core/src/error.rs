//! Error taxonomy for AutoGit.
//!
//! Per-branch operational failures (a branch that could not be checked out,
//! pulled, or picked onto) are NOT errors; they are recorded as
//! [`crate::report::BranchOutcome`] values. The variants here cover the
//! remaining classes: invalid configuration detected before any repository
//! mutation, and process-level engine failures.

use thiserror::Error;

/// AutoGit errors.
#[derive(Debug, Error)]
pub enum AutoGitError {
    /// Invalid request, detected before touching the repository.
    #[error("configuration error: {0}")]
    Config(String),

    /// The given path is not inside a git work tree.
    #[error("not a git repository: {path}")]
    NotARepository { path: String },

    /// The git process could not be run, or an operation that signals
    /// failure by raising (commit, push transport, fetch, reset) failed.
    #[error("git {op} failed: {detail}")]
    Engine { op: &'static str, detail: String },

    /// Staging working-tree changes failed.
    #[error("staging failed: {0}")]
    Staging(String),

    /// The pull step of a publish reported an unsuccessful merge/rebase.
    #[error("publish aborted, pull was not successful: {0}")]
    PublishPull(String),
}

/// Result type for AutoGit operations.
pub type Result<T> = std::result::Result<T, AutoGitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_displays_operation_and_detail() {
        let err = AutoGitError::Engine {
            op: "push",
            detail: "remote hung up unexpectedly".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("push"));
        assert!(msg.contains("remote hung up"));
    }

    #[test]
    fn test_config_error_display() {
        let err = AutoGitError::Config("at least one target branch is required".to_string());
        assert!(err.to_string().contains("configuration error"));
    }

    #[test]
    fn test_not_a_repository_displays_path() {
        let err = AutoGitError::NotARepository {
            path: "/tmp/nowhere".to_string(),
        };
        assert!(err.to_string().contains("/tmp/nowhere"));
    }
}
