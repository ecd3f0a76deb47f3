//! Publish local commits to a remote.
//!
//! Push returns one report per ref. A ref the remote rejected is still a
//! per-ref result; only a transport-level failure (unreachable remote,
//! authentication) raises.

use serde::{Deserialize, Serialize};

use crate::error::{AutoGitError, Result};
use crate::repo::RepoContext;

/// Configuration for a push.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushOptions {
    /// Remote to push to; the branch's configured remote when `None`.
    pub remote: Option<String>,
    /// Explicit refspecs; the current branch's default when empty.
    pub refspecs: Vec<String>,
    pub force: bool,
    pub dry_run: bool,
    /// Ask the remote to update all refs or none.
    pub atomic: bool,
}

/// Per-ref result of a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushRefStatus {
    Ok,
    UpToDate,
    Rejected,
}

/// One pushed (or rejected) ref.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefPushReport {
    pub local_ref: String,
    pub remote_ref: String,
    pub status: PushRefStatus,
    pub summary: String,
}

pub(crate) fn run(repo: &RepoContext, opts: &PushOptions) -> Result<Vec<RefPushReport>> {
    let mut args: Vec<String> = vec!["push".to_string(), "--porcelain".to_string()];
    if opts.force {
        args.push("--force".to_string());
    }
    if opts.dry_run {
        args.push("--dry-run".to_string());
    }
    if opts.atomic {
        args.push("--atomic".to_string());
    }
    if opts.remote.is_some() || !opts.refspecs.is_empty() {
        args.push(opts.remote.clone().unwrap_or_else(|| "origin".to_string()));
        args.extend(opts.refspecs.iter().cloned());
    }

    let out = repo.run_git("push", &args)?;
    let reports = parse_porcelain(&out.stdout);
    if !out.success && !reports.iter().any(|r| r.status == PushRefStatus::Rejected) {
        // Nothing ref-level to report: the transport itself failed.
        return Err(AutoGitError::Engine {
            op: "push",
            detail: out.message(),
        });
    }
    Ok(reports)
}

/// Parse `git push --porcelain` output: one line per ref of the form
/// `<flag>\t<from>:<to>\t<summary>`, framed by `To <url>` and `Done`.
fn parse_porcelain(stdout: &str) -> Vec<RefPushReport> {
    let mut reports = Vec::new();
    for line in stdout.lines() {
        if line.starts_with("To ") || line == "Done" || line.trim().is_empty() {
            continue;
        }
        let mut parts = line.splitn(3, '\t');
        let (Some(flag), Some(refspec)) = (parts.next(), parts.next()) else {
            continue;
        };
        let summary = parts.next().unwrap_or("").to_string();
        let (local_ref, remote_ref) = refspec.split_once(':').unwrap_or((refspec, refspec));
        let status = match flag.chars().next() {
            Some('!') => PushRefStatus::Rejected,
            Some('=') => PushRefStatus::UpToDate,
            _ => PushRefStatus::Ok,
        };
        reports.push(RefPushReport {
            local_ref: local_ref.to_string(),
            remote_ref: remote_ref.to_string(),
            status,
            summary,
        });
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_updated_ref_line() {
        let stdout = "To /tmp/origin.git\n \trefs/heads/main:refs/heads/main\t516f6af..9ab8cd1\nDone\n";
        let reports = parse_porcelain(stdout);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].local_ref, "refs/heads/main");
        assert_eq!(reports[0].remote_ref, "refs/heads/main");
        assert_eq!(reports[0].status, PushRefStatus::Ok);
    }

    #[test]
    fn parses_rejected_and_up_to_date_refs() {
        let stdout = concat!(
            "To git@example.com:org/repo.git\n",
            "=\trefs/heads/release/1.x:refs/heads/release/1.x\t[up to date]\n",
            "!\trefs/heads/main:refs/heads/main\t[rejected] (non-fast-forward)\n",
            "Done\n",
        );
        let reports = parse_porcelain(stdout);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].status, PushRefStatus::UpToDate);
        assert_eq!(reports[1].status, PushRefStatus::Rejected);
        assert!(reports[1].summary.contains("non-fast-forward"));
    }

    #[test]
    fn ignores_framing_lines() {
        assert!(parse_porcelain("To /tmp/origin.git\nDone\n").is_empty());
    }
}
