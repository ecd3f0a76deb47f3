//! Explicit repository context for driving the system `git` binary.
//!
//! A [`RepoContext`] is plain data: the working directory of one opened
//! repository, threaded explicitly through every operation. There is no
//! process-global handle: two contexts over two repositories can coexist
//! in the same process.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{AutoGitError, Result};

/// Handle to one opened working repository.
///
/// All operations spawn the system `git` binary inside this context's
/// working directory. The working tree and index behind it are shared
/// mutable state with no internal locking; callers must not issue two
/// mutating operation sequences against the same context concurrently.
#[derive(Debug, Clone)]
pub struct RepoContext {
    workdir: PathBuf,
}

impl RepoContext {
    /// Open an existing repository.
    ///
    /// Fails with [`AutoGitError::NotARepository`] when `path` is not
    /// inside a git work tree (or git itself is unavailable).
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let ctx = Self {
            workdir: path.into(),
        };
        if !ctx.is_work_tree() {
            return Err(AutoGitError::NotARepository {
                path: ctx.workdir.display().to_string(),
            });
        }
        Ok(ctx)
    }

    /// The working directory this context operates on.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Name of the currently checked-out branch, or `HEAD` when detached.
    pub fn current_branch(&self) -> Result<String> {
        let out = self.run_git("rev-parse", ["rev-parse", "--abbrev-ref", "HEAD"])?;
        if !out.success {
            return Err(AutoGitError::Engine {
                op: "rev-parse",
                detail: out.message(),
            });
        }
        Ok(out.stdout_trimmed())
    }

    /// Resolve a revision expression to a full commit id.
    pub fn rev_parse(&self, rev: &str) -> Result<String> {
        let out = self.run_git("rev-parse", ["rev-parse", "--verify", rev])?;
        if !out.success {
            return Err(AutoGitError::Engine {
                op: "rev-parse",
                detail: out.message(),
            });
        }
        Ok(out.stdout_trimmed())
    }

    /// Commit ids reachable from `HEAD` but not from `since`, oldest first.
    pub(crate) fn rev_list_since(&self, since: &str) -> Result<Vec<String>> {
        let range = format!("{since}..HEAD");
        let out = self.run_git("rev-list", ["rev-list", "--reverse", range.as_str()])?;
        if !out.success {
            return Err(AutoGitError::Engine {
                op: "rev-list",
                detail: out.message(),
            });
        }
        Ok(out
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn is_work_tree(&self) -> bool {
        Command::new("git")
            .args(["rev-parse", "--is-inside-work-tree"])
            .current_dir(&self.workdir)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Run a git subcommand, capturing its output.
    ///
    /// An `Err` here means the process could not be spawned at all; a git
    /// invocation that ran and reported failure comes back as a
    /// [`GitOutput`] with `success == false`.
    pub(crate) fn run_git<I, S>(&self, op: &'static str, args: I) -> Result<GitOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.run_git_env(op, args, &[])
    }

    /// Same as [`Self::run_git`] with extra environment variables set on
    /// the child process (committer identity, for example).
    pub(crate) fn run_git_env<I, S>(
        &self,
        op: &'static str,
        args: I,
        envs: &[(&str, String)],
    ) -> Result<GitOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new("git");
        command.args(args).current_dir(&self.workdir);
        for (key, value) in envs {
            command.env(key, value);
        }
        let output = command.output().map_err(|e| AutoGitError::Engine {
            op,
            detail: format!("failed to run git: {e}"),
        })?;
        Ok(GitOutput::from(output))
    }
}

/// Captured result of one git invocation.
#[derive(Debug)]
pub(crate) struct GitOutput {
    pub(crate) success: bool,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

impl GitOutput {
    pub(crate) fn stdout_trimmed(&self) -> String {
        self.stdout.trim().to_string()
    }

    /// Human-readable detail: stderr when present, stdout otherwise.
    pub(crate) fn message(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

impl From<std::process::Output> for GitOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}
