//! Replay commits onto the current branch.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AutoGitError, Result};
use crate::repo::RepoContext;

/// Configuration for a cherry-pick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CherryPickOptions {
    /// Commits to replay, in order.
    pub refs: Vec<String>,
    /// Apply the changes to the tree and index without committing.
    pub no_commit: bool,
    /// Parent number to pick against when replaying a merge commit.
    pub mainline: Option<u32>,
}

impl CherryPickOptions {
    /// Replay `refs` and commit each one.
    pub fn refs(refs: Vec<String>) -> Self {
        Self {
            refs,
            no_commit: false,
            mainline: None,
        }
    }
}

impl Default for CherryPickOptions {
    /// Defaults to `no_commit = true`: apply the change without recording
    /// a commit, leaving that decision to the caller.
    fn default() -> Self {
        Self {
            refs: Vec::new(),
            no_commit: true,
            mainline: None,
        }
    }
}

/// Terminal state of a cherry-pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CherryPickStatus {
    Ok,
    /// The replay stopped on a content conflict.
    Conflicting,
    Error,
}

/// Result of a cherry-pick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CherryPickOutcome {
    pub status: CherryPickStatus,
    /// Commit ids created by the replay, oldest first. Empty when
    /// `no_commit` was set.
    pub applied_refs: Vec<String>,
    /// Paths left unmerged when the replay conflicted.
    pub conflicts: Vec<String>,
    pub detail: String,
}

impl CherryPickOutcome {
    pub fn is_ok(&self) -> bool {
        self.status == CherryPickStatus::Ok
    }
}

pub(crate) fn run(repo: &RepoContext, opts: &CherryPickOptions) -> Result<CherryPickOutcome> {
    if opts.refs.is_empty() {
        return Err(AutoGitError::Config(
            "commit refs are required for cherry-pick".to_string(),
        ));
    }

    let head_before = repo.rev_parse("HEAD")?;

    let mut args: Vec<String> = vec!["cherry-pick".to_string()];
    if opts.no_commit {
        args.push("--no-commit".to_string());
    } else {
        // Replaying an already-applied change must degrade to an empty
        // commit instead of stopping the sequencer.
        args.push("--allow-empty".to_string());
        args.push("--keep-redundant-commits".to_string());
    }
    if let Some(parent) = opts.mainline {
        args.push("--mainline".to_string());
        args.push(parent.to_string());
    }
    args.extend(opts.refs.iter().cloned());

    let out = repo.run_git("cherry-pick", &args)?;
    if out.success {
        let applied = if opts.no_commit {
            Vec::new()
        } else {
            repo.rev_list_since(&head_before)?
        };
        debug!(picked = applied.len(), "cherry-pick finished");
        return Ok(CherryPickOutcome {
            status: CherryPickStatus::Ok,
            applied_refs: applied,
            conflicts: Vec::new(),
            detail: out.message(),
        });
    }

    let combined = format!("{}\n{}", out.stdout, out.stderr).to_ascii_lowercase();
    let status = if combined.contains("conflict") {
        CherryPickStatus::Conflicting
    } else {
        CherryPickStatus::Error
    };
    let conflicts = if status == CherryPickStatus::Conflicting {
        unmerged_paths(repo)?
    } else {
        Vec::new()
    };
    // Return the tree to a clean state so the next branch starts fresh.
    let _ = repo.run_git("cherry-pick", ["cherry-pick", "--abort"]);

    Ok(CherryPickOutcome {
        status,
        applied_refs: Vec::new(),
        conflicts,
        detail: out.message(),
    })
}

fn unmerged_paths(repo: &RepoContext) -> Result<Vec<String>> {
    let out = repo.run_git("diff", ["diff", "--name-only", "--diff-filter=U"])?;
    Ok(out
        .stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}
