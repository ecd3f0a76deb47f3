//! Synchronize the current branch with its upstream.
//!
//! Pull signals failure through `successful == false` on the outcome,
//! matching the engine contract: an unresolved merge, a diverged history,
//! or a network failure all come back as data. After an unsuccessful pull
//! any in-progress rebase or merge is aborted so the work tree stays
//! usable for the next branch.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::repo::RepoContext;

/// How divergent histories may be reconciled on a merge pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FastForwardMode {
    /// Fast-forward when possible, merge otherwise.
    Ff,
    /// Refuse anything that is not a fast-forward.
    FfOnly,
    /// Always create a merge commit.
    NoFf,
}

/// Configuration for a pull.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullOptions {
    /// Remote to pull from; the branch's configured remote when `None`.
    pub remote: Option<String>,
    /// Remote branch to pull; the branch's own upstream when `None`.
    pub branch: Option<String>,
    /// Rebase local commits on top of the fetched head instead of merging.
    pub rebase: bool,
    /// Fast-forward handling for merge pulls; ignored while rebasing.
    pub ff: FastForwardMode,
}

impl Default for PullOptions {
    fn default() -> Self {
        Self {
            remote: None,
            branch: None,
            rebase: true,
            ff: FastForwardMode::Ff,
        }
    }
}

/// Result of a pull.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullOutcome {
    pub successful: bool,
    pub detail: String,
}

pub(crate) fn run(repo: &RepoContext, opts: &PullOptions) -> Result<PullOutcome> {
    let mut args: Vec<String> = vec!["pull".to_string()];
    if opts.rebase {
        args.push("--rebase".to_string());
    } else {
        args.push("--no-rebase".to_string());
        args.push(
            match opts.ff {
                FastForwardMode::Ff => "--ff",
                FastForwardMode::FfOnly => "--ff-only",
                FastForwardMode::NoFf => "--no-ff",
            }
            .to_string(),
        );
    }
    if let Some(remote) = &opts.remote {
        args.push(remote.clone());
        if let Some(branch) = &opts.branch {
            args.push(branch.clone());
        }
    } else if let Some(branch) = &opts.branch {
        args.push("origin".to_string());
        args.push(branch.clone());
    }

    let out = repo.run_git("pull", &args)?;
    if !out.success {
        // A failed rebase or merge pull leaves the sequencer mid-flight
        // until aborted; the next branch needs a clean tree.
        let _ = repo.run_git("rebase", ["rebase", "--abort"]);
        let _ = repo.run_git("merge", ["merge", "--abort"]);
        return Ok(PullOutcome {
            successful: false,
            detail: out.message(),
        });
    }

    Ok(PullOutcome {
        successful: true,
        detail: out.message(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pull_rebases_from_own_upstream() {
        let opts = PullOptions::default();
        assert!(opts.rebase);
        assert!(opts.remote.is_none());
        assert!(opts.branch.is_none());
    }
}
