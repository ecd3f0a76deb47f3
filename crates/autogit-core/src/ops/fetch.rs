//! Download objects and refs from a remote without touching the work tree.

use serde::{Deserialize, Serialize};

use crate::error::{AutoGitError, Result};
use crate::repo::RepoContext;

/// Configuration for a fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Remote to fetch from; the configured default when `None`.
    pub remote: Option<String>,
    /// Explicit refspecs; the remote's configured set when empty.
    pub refspecs: Vec<String>,
    /// Remove remote-tracking refs that no longer exist upstream.
    pub prune: bool,
    /// Also fetch all tags.
    pub tags: bool,
    /// Limit history depth for the fetched refs.
    pub depth: Option<u32>,
}

/// Result of a fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOutcome {
    /// Summary of updated refs as reported by the remote.
    pub detail: String,
}

pub(crate) fn run(repo: &RepoContext, opts: &FetchOptions) -> Result<FetchOutcome> {
    let mut args: Vec<String> = vec!["fetch".to_string()];
    if opts.prune {
        args.push("--prune".to_string());
    }
    if opts.tags {
        args.push("--tags".to_string());
    }
    if let Some(depth) = opts.depth {
        args.push("--depth".to_string());
        args.push(depth.to_string());
    }
    if opts.remote.is_some() || !opts.refspecs.is_empty() {
        args.push(opts.remote.clone().unwrap_or_else(|| "origin".to_string()));
        args.extend(opts.refspecs.iter().cloned());
    }

    let out = repo.run_git("fetch", &args)?;
    if !out.success {
        return Err(AutoGitError::Engine {
            op: "fetch",
            detail: out.message(),
        });
    }
    Ok(FetchOutcome {
        detail: out.message(),
    })
}
