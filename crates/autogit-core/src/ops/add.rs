//! Stage working-tree changes.

use serde::{Deserialize, Serialize};

use crate::error::{AutoGitError, Result};
use crate::repo::RepoContext;

/// Configuration for staging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddOptions {
    /// Path patterns to stage. With `all` set, patterns narrow the sweep.
    pub patterns: Vec<String>,
    /// Stage every change in the work tree, including deletions and
    /// untracked files.
    pub all: bool,
    /// Only stage changes to already-tracked files.
    pub update: bool,
}

impl AddOptions {
    /// Stage only the given patterns.
    pub fn patterns(patterns: Vec<String>) -> Self {
        Self {
            patterns,
            all: false,
            update: false,
        }
    }
}

impl Default for AddOptions {
    /// Defaults to staging every change in the work tree.
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            all: true,
            update: false,
        }
    }
}

pub(crate) fn run(repo: &RepoContext, opts: &AddOptions) -> Result<()> {
    if !opts.all && !opts.update && opts.patterns.is_empty() {
        return Err(AutoGitError::Config(
            "file patterns are required for add".to_string(),
        ));
    }

    let mut args: Vec<String> = vec!["add".to_string()];
    if opts.all {
        args.push("--all".to_string());
    }
    if opts.update {
        args.push("--update".to_string());
    }
    if !opts.patterns.is_empty() {
        args.push("--".to_string());
        args.extend(opts.patterns.iter().cloned());
    }

    let out = repo.run_git("add", &args)?;
    if !out.success {
        return Err(AutoGitError::Staging(out.message()));
    }
    Ok(())
}
