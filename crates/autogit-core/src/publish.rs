//! Publish: pull → add → commit → push as one step.
//!
//! Materializes the current working-tree changes as a single new commit on
//! the checked-out branch and lands it upstream. Used standalone and by
//! the distribution orchestrator to turn a working-tree change into a
//! commit it can replay.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::GitEngine;
use crate::error::{AutoGitError, Result};
use crate::ops::{AddOptions, CommitOptions, PullOptions, PushOptions, PushRefStatus};

/// Configuration for a publish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRequest {
    /// Synchronize with the upstream before staging; skipped when `None`.
    pub pull: Option<PullOptions>,
    pub add: AddOptions,
    pub commit: CommitOptions,
    pub push: PushOptions,
}

impl PublishRequest {
    /// Publish all working-tree changes under `message`, pulling first.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            pull: Some(PullOptions::default()),
            add: AddOptions::default(),
            commit: CommitOptions::message(message),
            push: PushOptions::default(),
        }
    }
}

/// Result of a publish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishReceipt {
    /// Id of the newly created commit.
    pub commit_id: String,
    /// Advisory detail when the push did not land; the commit still
    /// exists locally and a later run re-pushes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_failure: Option<String>,
}

/// Create one new commit from the working tree and land it upstream.
///
/// The pull and staging steps gate the commit: an unsuccessful pull or a
/// staging failure aborts before anything is recorded. The push does not
/// gate the result: the commit already exists locally, so its id is
/// returned with the push failure attached as advisory detail.
pub fn publish<E: GitEngine + ?Sized>(engine: &E, request: &PublishRequest) -> Result<PublishReceipt> {
    if request.commit.message.trim().is_empty() {
        return Err(AutoGitError::Config(
            "commit message is required for publish".to_string(),
        ));
    }

    if let Some(pull) = &request.pull {
        let pulled = engine.pull(pull)?;
        if !pulled.successful {
            return Err(AutoGitError::PublishPull(pulled.detail));
        }
    }

    engine.add(&request.add)?;
    let commit_id = engine.commit(&request.commit)?;
    info!(commit_id = %commit_id, "created publish commit");

    let push_failure = match engine.push(&request.push) {
        Ok(reports) => summarize_rejections(&reports),
        Err(err) => {
            warn!(error = %err, "push failed after publish commit");
            Some(err.to_string())
        }
    };

    Ok(PublishReceipt {
        commit_id,
        push_failure,
    })
}

/// Collapse rejected refs into one advisory line, `None` when all landed.
pub(crate) fn summarize_rejections(reports: &[crate::ops::RefPushReport]) -> Option<String> {
    let rejected: Vec<String> = reports
        .iter()
        .filter(|r| r.status == PushRefStatus::Rejected)
        .map(|r| format!("{}: {}", r.remote_ref, r.summary))
        .collect();
    if rejected.is_empty() {
        None
    } else {
        Some(rejected.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::ScriptedEngine;
    use crate::ops::{PullOutcome, RefPushReport};

    #[test]
    fn blank_message_fails_before_any_engine_call() {
        let engine = ScriptedEngine::new();
        let mut request = PublishRequest::message("  ");
        request.pull = None;

        let err = publish(&engine, &request).unwrap_err();
        assert!(matches!(err, AutoGitError::Config(_)));
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn unsuccessful_pull_aborts_before_staging() {
        let engine = ScriptedEngine::new();
        engine.queue_pull(Ok(PullOutcome {
            successful: false,
            detail: "cannot rebase onto diverged upstream".to_string(),
        }));

        let err = publish(&engine, &PublishRequest::message("fix")).unwrap_err();
        assert!(matches!(err, AutoGitError::PublishPull(_)));
        assert_eq!(engine.count("pull"), 1);
        assert_eq!(engine.count("add"), 0);
        assert_eq!(engine.count("commit"), 0);
        assert_eq!(engine.count("push"), 0);
    }

    #[test]
    fn staging_failure_aborts_before_commit() {
        let engine = ScriptedEngine::new();
        engine.queue_add(Err(AutoGitError::Staging("index locked".to_string())));

        let err = publish(&engine, &PublishRequest::message("fix")).unwrap_err();
        assert!(matches!(err, AutoGitError::Staging(_)));
        assert_eq!(engine.count("commit"), 0);
        assert_eq!(engine.count("push"), 0);
    }

    #[test]
    fn push_failure_is_advisory_not_fatal() {
        let engine = ScriptedEngine::new();
        engine.queue_commit(Ok("abc123".to_string()));
        engine.queue_push(Err(AutoGitError::Engine {
            op: "push",
            detail: "connection reset".to_string(),
        }));

        let receipt = publish(&engine, &PublishRequest::message("fix")).unwrap();
        assert_eq!(receipt.commit_id, "abc123");
        let failure = receipt.push_failure.expect("push failure recorded");
        assert!(failure.contains("connection reset"));
    }

    #[test]
    fn rejected_ref_is_recorded_as_advisory() {
        let engine = ScriptedEngine::new();
        engine.queue_commit(Ok("abc123".to_string()));
        engine.queue_push(Ok(vec![RefPushReport {
            local_ref: "refs/heads/main".to_string(),
            remote_ref: "refs/heads/main".to_string(),
            status: PushRefStatus::Rejected,
            summary: "[rejected] (non-fast-forward)".to_string(),
        }]));

        let receipt = publish(&engine, &PublishRequest::message("fix")).unwrap();
        let failure = receipt.push_failure.expect("rejection recorded");
        assert!(failure.contains("non-fast-forward"));
    }

    #[test]
    fn successful_publish_returns_commit_id() {
        let engine = ScriptedEngine::new();
        engine.queue_commit(Ok("abc123".to_string()));

        let receipt = publish(&engine, &PublishRequest::message("fix")).unwrap();
        assert_eq!(receipt.commit_id, "abc123");
        assert!(receipt.push_failure.is_none());
        assert_eq!(
            engine.calls(),
            vec!["pull", "add", "commit fix", "push"],
        );
    }
}
