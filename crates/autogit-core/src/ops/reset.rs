//! Move the current branch head, optionally rewriting index and tree.

use serde::{Deserialize, Serialize};

use crate::error::{AutoGitError, Result};
use crate::repo::RepoContext;

/// How far a reset reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetMode {
    /// Move the head only.
    Soft,
    /// Move the head and reset the index.
    Mixed,
    /// Move the head, reset the index, and rewrite the work tree.
    Hard,
}

/// Configuration for a reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetOptions {
    /// Revision to reset to; `HEAD` when `None`.
    pub ref_name: Option<String>,
    pub mode: ResetMode,
    /// When non-empty, unstage these paths instead of moving the head.
    pub paths: Vec<String>,
}

impl Default for ResetOptions {
    fn default() -> Self {
        Self {
            ref_name: None,
            mode: ResetMode::Soft,
            paths: Vec::new(),
        }
    }
}

pub(crate) fn run(repo: &RepoContext, opts: &ResetOptions) -> Result<String> {
    let mut args: Vec<String> = vec!["reset".to_string()];
    if opts.paths.is_empty() {
        args.push(
            match opts.mode {
                ResetMode::Soft => "--soft",
                ResetMode::Mixed => "--mixed",
                ResetMode::Hard => "--hard",
            }
            .to_string(),
        );
    }
    if let Some(ref_name) = &opts.ref_name {
        args.push(ref_name.clone());
    }
    if !opts.paths.is_empty() {
        args.push("--".to_string());
        args.extend(opts.paths.iter().cloned());
    }

    let out = repo.run_git("reset", &args)?;
    if !out.success {
        return Err(AutoGitError::Engine {
            op: "reset",
            detail: out.message(),
        });
    }
    repo.rev_parse("HEAD")
}
