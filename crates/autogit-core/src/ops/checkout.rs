//! Branch checkout.
//!
//! Checkout reports failure through [`CheckoutStatus`], never through
//! `Err`: a missing branch or a dirty work tree is an expected per-branch
//! condition the distribution loop records and moves past.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AutoGitError, Result};
use crate::repo::RepoContext;

/// Configuration for a checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutOptions {
    /// Branch (or ref) to check out.
    pub branch: String,
    /// Update an existing local branch ref to the requested revision even
    /// when that is not a fast-forward.
    pub force_ref_update: bool,
    /// Throw away local modifications instead of refusing the switch.
    pub forced: bool,
    /// Create the branch when it does not exist yet.
    pub create_branch: bool,
    /// Revision to create the branch from.
    pub start_point: Option<String>,
}

impl CheckoutOptions {
    /// Plain checkout of `branch` with no force semantics.
    pub fn branch(name: impl Into<String>) -> Self {
        Self {
            branch: name.into(),
            force_ref_update: false,
            forced: false,
            create_branch: false,
            start_point: None,
        }
    }
}

/// Terminal state of a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    Ok,
    /// Local modifications would be overwritten by the switch.
    Conflicts,
    /// The requested branch does not exist locally or on any remote.
    NotFound,
    Error,
}

/// Result of a checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutOutcome {
    pub status: CheckoutStatus,
    pub branch: String,
    pub detail: String,
}

impl CheckoutOutcome {
    pub fn is_ok(&self) -> bool {
        self.status == CheckoutStatus::Ok
    }
}

pub(crate) fn run(repo: &RepoContext, opts: &CheckoutOptions) -> Result<CheckoutOutcome> {
    if opts.branch.trim().is_empty() {
        return Err(AutoGitError::Config(
            "branch to checkout is required".to_string(),
        ));
    }

    let mut args: Vec<String> = vec!["checkout".to_string()];
    if opts.forced {
        args.push("--force".to_string());
    }
    if opts.create_branch {
        // -B resets an existing branch to the start point, -b refuses.
        args.push(if opts.force_ref_update { "-B" } else { "-b" }.to_string());
    }
    args.push(opts.branch.clone());
    if opts.create_branch {
        if let Some(start) = &opts.start_point {
            args.push(start.clone());
        }
    }

    let out = repo.run_git("checkout", &args)?;
    let status = if out.success {
        CheckoutStatus::Ok
    } else {
        classify_failure(&out.stderr)
    };
    debug!(branch = %opts.branch, ?status, "checkout finished");
    Ok(CheckoutOutcome {
        status,
        branch: opts.branch.clone(),
        detail: out.message(),
    })
}

fn classify_failure(stderr: &str) -> CheckoutStatus {
    let s = stderr.to_ascii_lowercase();
    if s.contains("did not match any file")
        || s.contains("pathspec")
        || s.contains("invalid reference")
        || s.contains("unknown revision")
    {
        CheckoutStatus::NotFound
    } else if s.contains("would be overwritten")
        || s.contains("commit your changes or stash them")
        || s.contains("needs merge")
        || s.contains("resolve your current index")
    {
        CheckoutStatus::Conflicts
    } else {
        CheckoutStatus::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_branch_classifies_as_not_found() {
        let stderr = "error: pathspec 'release/9.x' did not match any file(s) known to git";
        assert_eq!(classify_failure(stderr), CheckoutStatus::NotFound);
    }

    #[test]
    fn dirty_tree_classifies_as_conflicts() {
        let stderr = "error: Your local changes to the following files would be overwritten by checkout:\n\tsrc/lib.rs\nPlease commit your changes or stash them before you switch branches.";
        assert_eq!(classify_failure(stderr), CheckoutStatus::Conflicts);
    }

    #[test]
    fn unknown_failure_classifies_as_error() {
        assert_eq!(
            classify_failure("fatal: unable to write new index file"),
            CheckoutStatus::Error
        );
    }
}
