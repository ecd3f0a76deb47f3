//! Record a commit on the current branch.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AutoGitError, Result};
use crate::repo::RepoContext;

/// An author or committer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Parse the conventional `Name <email>` form.
    pub fn parse(raw: &str) -> Option<Self> {
        let (name, rest) = raw.split_once('<')?;
        let email = rest.trim().strip_suffix('>')?;
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() {
            return None;
        }
        Some(Self::new(name, email))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Configuration for a commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitOptions {
    pub message: String,
    /// Override the author recorded on the commit.
    pub author: Option<Identity>,
    /// Override the committer recorded on the commit.
    pub committer: Option<Identity>,
    /// Also stage modified and deleted tracked files.
    pub all: bool,
    /// Replace the tip commit instead of appending.
    pub amend: bool,
    /// Permit a commit that changes nothing.
    pub allow_empty: bool,
    /// Skip pre-commit and commit-msg hooks.
    pub no_verify: bool,
    /// GPG-sign the commit.
    pub sign: bool,
    /// Key to sign with; the configured default when `None`.
    pub signing_key: Option<String>,
}

impl CommitOptions {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            author: None,
            committer: None,
            all: false,
            amend: false,
            allow_empty: false,
            no_verify: false,
            sign: false,
            signing_key: None,
        }
    }
}

pub(crate) fn run(repo: &RepoContext, opts: &CommitOptions) -> Result<String> {
    if opts.message.trim().is_empty() {
        return Err(AutoGitError::Config(
            "commit message is required".to_string(),
        ));
    }

    let mut args: Vec<String> = vec!["commit".to_string(), "-m".to_string(), opts.message.clone()];
    if opts.all {
        args.push("--all".to_string());
    }
    if opts.amend {
        args.push("--amend".to_string());
    }
    if opts.allow_empty {
        args.push("--allow-empty".to_string());
    }
    if opts.no_verify {
        args.push("--no-verify".to_string());
    }
    if opts.sign {
        match &opts.signing_key {
            Some(key) => args.push(format!("--gpg-sign={key}")),
            None => args.push("--gpg-sign".to_string()),
        }
    }
    if let Some(author) = &opts.author {
        args.push(format!("--author={author}"));
    }

    let mut envs: Vec<(&str, String)> = Vec::new();
    if let Some(committer) = &opts.committer {
        envs.push(("GIT_COMMITTER_NAME", committer.name.clone()));
        envs.push(("GIT_COMMITTER_EMAIL", committer.email.clone()));
    }

    let out = repo.run_git_env("commit", &args, &envs)?;
    if !out.success {
        return Err(AutoGitError::Engine {
            op: "commit",
            detail: out.message(),
        });
    }
    repo.rev_parse("HEAD")
}
