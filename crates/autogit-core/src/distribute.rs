//! Multi-branch change distribution.
//!
//! [`distribute`] lands one change across a list of target branches: for
//! each branch in caller order it runs checkout → pull → cherry-pick →
//! push, records exactly one [`BranchOutcome`], and moves on; a failure
//! on one branch never blocks the others. The change is either a set of
//! existing commits, or a working-tree change that is first published as
//! a fresh commit via [`crate::publish::publish`] and then replayed.
//!
//! Branches are processed strictly sequentially: every step mutates the
//! single shared working tree behind the engine, so interleaving two
//! branches would corrupt state.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::engine::GitEngine;
use crate::error::{AutoGitError, Result};
use crate::ops::{
    AddOptions, CheckoutOptions, CherryPickOptions, CommitOptions, Identity, PullOptions,
    PushOptions,
};
use crate::publish::{publish, summarize_rejections, PublishRequest};
use crate::report::{BranchOutcome, DistributionReport, INITIAL_BRANCH};
use crate::retry::attempt;

/// The change to land on every target branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeSource {
    /// Replay these existing commits verbatim, in order.
    ExistingRefs { refs: Vec<String> },
    /// Publish the current working-tree changes as one new commit, then
    /// replay that commit.
    WorkingTree {
        message: String,
        add: AddOptions,
        author: Option<Identity>,
        committer: Option<Identity>,
    },
}

/// One distribution run: a change source plus the branches to land it on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionRequest {
    pub source: ChangeSource,
    /// Target branches, attempted in this order. Duplicates are processed
    /// independently; only the first recorded outcome for a name is kept.
    pub branches: Vec<String>,
    /// Pull configuration for every synchronization in the run. Any
    /// branch override is cleared; each branch pulls its own upstream.
    pub pull: PullOptions,
    pub push: PushOptions,
}

impl DistributionRequest {
    /// Distribute existing commits across `branches`.
    pub fn existing_refs(refs: Vec<String>, branches: Vec<String>) -> Self {
        Self {
            source: ChangeSource::ExistingRefs { refs },
            branches,
            pull: PullOptions::default(),
            push: PushOptions::default(),
        }
    }

    /// Publish the working tree under `message`, then distribute the new
    /// commit across `branches`.
    pub fn working_tree(message: impl Into<String>, branches: Vec<String>) -> Self {
        Self {
            source: ChangeSource::WorkingTree {
                message: message.into(),
                add: AddOptions::default(),
                author: None,
                committer: None,
            },
            branches,
            pull: PullOptions::default(),
            push: PushOptions::default(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.branches.is_empty() {
            return Err(AutoGitError::Config(
                "at least one target branch is required".to_string(),
            ));
        }
        match &self.source {
            ChangeSource::ExistingRefs { refs } if refs.is_empty() => Err(AutoGitError::Config(
                "commit refs to distribute are required".to_string(),
            )),
            ChangeSource::WorkingTree { message, .. } if message.trim().is_empty() => {
                Err(AutoGitError::Config(
                    "commit message is required to publish a working-tree change".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Land the requested change on every target branch.
///
/// Raises only for invalid configuration (checked before any repository
/// mutation) and for a failed initial publication, which leaves nothing
/// to replay. Every other failure mode is recorded in the returned
/// report, and the report is complete (one outcome per requested branch)
/// before it is returned.
pub fn distribute<E: GitEngine + ?Sized>(
    engine: &E,
    request: &DistributionRequest,
) -> Result<DistributionReport> {
    request.validate()?;

    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let mut outcomes: BTreeMap<String, BranchOutcome> = BTreeMap::new();

    // Every sync in this run targets the current branch's own upstream.
    let pull = PullOptions {
        branch: None,
        ..request.pull.clone()
    };

    let refs_to_replay = match &request.source {
        ChangeSource::ExistingRefs { refs } => refs.clone(),
        ChangeSource::WorkingTree {
            message,
            add,
            author,
            committer,
        } => {
            let publish_request = PublishRequest {
                pull: Some(pull.clone()),
                add: add.clone(),
                commit: CommitOptions {
                    author: author.clone(),
                    committer: committer.clone(),
                    ..CommitOptions::message(message.clone())
                },
                push: request.push.clone(),
            };
            let receipt = publish(engine, &publish_request)?;
            info!(run_id = %run_id, commit_id = %receipt.commit_id, "initial publication created");
            outcomes.insert(
                INITIAL_BRANCH.to_string(),
                BranchOutcome::Published {
                    applied_refs: BTreeSet::from([receipt.commit_id.clone()]),
                    push_failure: receipt.push_failure,
                },
            );
            vec![receipt.commit_id]
        }
    };

    for branch in &request.branches {
        let outcome = process_branch(engine, branch, &refs_to_replay, &pull, &request.push);
        info!(run_id = %run_id, branch = %branch, outcome = outcome.kind(), "branch processed");
        outcomes.entry(branch.clone()).or_insert(outcome);
    }

    Ok(DistributionReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        outcomes,
    })
}

fn process_branch<E: GitEngine + ?Sized>(
    engine: &E,
    branch: &str,
    refs: &[String],
    pull: &PullOptions,
    push: &PushOptions,
) -> BranchOutcome {
    let checkout = CheckoutOptions {
        force_ref_update: true,
        ..CheckoutOptions::branch(branch)
    };
    let checked_out = match engine.checkout(&checkout) {
        Ok(outcome) => outcome,
        // An engine-level checkout failure is still a per-branch result,
        // never a run abort.
        Err(err) => {
            return BranchOutcome::CheckoutFailed {
                detail: err.to_string(),
            }
        }
    };
    if !checked_out.is_ok() {
        return BranchOutcome::CheckoutFailed {
            detail: format!("{:?}: {}", checked_out.status, checked_out.detail),
        };
    }

    // One blind re-run on an engine failure: checkout+pull restore a
    // clean, freshly synchronized state, so repeating the step is safe.
    match attempt(2, || apply_and_publish(engine, refs, pull, push)) {
        Ok(outcome) => outcome,
        Err(step) => step.into_outcome(),
    }
}

/// Sync the checked-out branch, replay the refs, push the result.
fn apply_and_publish<E: GitEngine + ?Sized>(
    engine: &E,
    refs: &[String],
    pull: &PullOptions,
    push: &PushOptions,
) -> std::result::Result<BranchOutcome, StepError> {
    let pulled = engine.pull(pull).map_err(StepError::pull)?;
    if !pulled.successful {
        return Ok(BranchOutcome::PullFailed {
            detail: pulled.detail,
        });
    }

    let picked = engine
        .cherry_pick(&CherryPickOptions::refs(refs.to_vec()))
        .map_err(StepError::cherry_pick)?;
    if !picked.is_ok() {
        return Ok(BranchOutcome::CherryPickFailed {
            detail: picked.detail,
            conflicts: picked.conflicts,
        });
    }

    // Push is advisory: the picked commits already exist locally, and a
    // failed push is re-attempted by a later run rather than unwinding
    // the branch.
    let push_failure = match engine.push(push) {
        Ok(reports) => summarize_rejections(&reports),
        Err(err) => {
            tracing::warn!(error = %err, "push failed after cherry-pick");
            Some(err.to_string())
        }
    };

    Ok(BranchOutcome::Published {
        applied_refs: picked.applied_refs.into_iter().collect(),
        push_failure,
    })
}

/// Engine failure during the apply step, tagged with the stage it came
/// from so a failure that survives the retry lands in the right outcome.
struct StepError {
    stage: Stage,
    error: AutoGitError,
}

enum Stage {
    Pull,
    CherryPick,
}

impl StepError {
    fn pull(error: AutoGitError) -> Self {
        Self {
            stage: Stage::Pull,
            error,
        }
    }

    fn cherry_pick(error: AutoGitError) -> Self {
        Self {
            stage: Stage::CherryPick,
            error,
        }
    }

    fn into_outcome(self) -> BranchOutcome {
        match self.stage {
            Stage::Pull => BranchOutcome::PullFailed {
                detail: self.error.to_string(),
            },
            Stage::CherryPick => BranchOutcome::CherryPickFailed {
                detail: self.error.to_string(),
                conflicts: Vec::new(),
            },
        }
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::ScriptedEngine;
    use crate::ops::{
        CheckoutOutcome, CheckoutStatus, CherryPickOutcome, CherryPickStatus, PullOutcome,
    };

    fn ok_checkout(branch: &str) -> CheckoutOutcome {
        CheckoutOutcome {
            status: CheckoutStatus::Ok,
            branch: branch.to_string(),
            detail: String::new(),
        }
    }

    fn picked(refs: &[&str]) -> CherryPickOutcome {
        CherryPickOutcome {
            status: CherryPickStatus::Ok,
            applied_refs: refs.iter().map(|r| r.to_string()).collect(),
            conflicts: Vec::new(),
            detail: String::new(),
        }
    }

    fn engine_err(op: &'static str) -> AutoGitError {
        AutoGitError::Engine {
            op,
            detail: "index.lock held by another process".to_string(),
        }
    }

    #[test]
    fn every_requested_branch_gets_exactly_one_outcome() {
        let engine = ScriptedEngine::new();
        let request = DistributionRequest::existing_refs(
            vec!["abc123".to_string()],
            vec!["release/1.x".to_string(), "release/2.x".to_string()],
        );

        let report = distribute(&engine, &request).unwrap();

        assert_eq!(report.outcomes.len(), 2);
        assert!(report.overall_success());
        assert!(report.initial_publication().is_none());
    }

    #[test]
    fn failed_checkout_skips_every_later_step_for_that_branch() {
        let engine = ScriptedEngine::new();
        engine.queue_checkout(Ok(ok_checkout("release/1.x")));
        engine.queue_cherry_pick(Ok(picked(&["def456"])));
        engine.queue_checkout(Ok(CheckoutOutcome {
            status: CheckoutStatus::Conflicts,
            branch: "release/2.x".to_string(),
            detail: "local changes would be overwritten".to_string(),
        }));

        let request = DistributionRequest::existing_refs(
            vec!["abc123".to_string()],
            vec!["release/1.x".to_string(), "release/2.x".to_string()],
        );
        let report = distribute(&engine, &request).unwrap();

        match report.outcomes.get("release/1.x").unwrap() {
            BranchOutcome::Published { applied_refs, .. } => {
                assert!(applied_refs.contains("def456"));
            }
            other => panic!("expected published, got {other:?}"),
        }
        assert!(matches!(
            report.outcomes.get("release/2.x").unwrap(),
            BranchOutcome::CheckoutFailed { .. }
        ));

        // The failed branch consumed no pull/cherry-pick/push call.
        assert_eq!(engine.count("checkout"), 2);
        assert_eq!(engine.count("pull"), 1);
        assert_eq!(engine.count("cherry-pick"), 1);
        assert_eq!(engine.count("push"), 1);
    }

    #[test]
    fn transient_pull_failure_is_retried_once_and_hidden_on_success() {
        let engine = ScriptedEngine::new();
        engine.queue_pull(Err(engine_err("pull")));

        let request = DistributionRequest::existing_refs(
            vec!["abc123".to_string()],
            vec!["main".to_string()],
        );
        let report = distribute(&engine, &request).unwrap();

        assert!(report.outcomes.get("main").unwrap().is_published());
        assert_eq!(engine.count("pull"), 2);
        assert_eq!(engine.count("cherry-pick"), 1);
    }

    #[test]
    fn failure_surviving_the_retry_is_recorded_for_its_stage() {
        let engine = ScriptedEngine::new();
        engine.queue_pull(Err(engine_err("pull")));
        engine.queue_pull(Err(engine_err("pull")));

        let request = DistributionRequest::existing_refs(
            vec!["abc123".to_string()],
            vec!["main".to_string()],
        );
        let report = distribute(&engine, &request).unwrap();

        match report.outcomes.get("main").unwrap() {
            BranchOutcome::PullFailed { detail } => {
                assert!(detail.contains("index.lock"));
            }
            other => panic!("expected pull failure, got {other:?}"),
        }
        assert_eq!(engine.count("pull"), 2);
        assert_eq!(engine.count("cherry-pick"), 0);
        assert_eq!(engine.count("push"), 0);
    }

    #[test]
    fn unsuccessful_pull_is_not_retried() {
        let engine = ScriptedEngine::new();
        engine.queue_pull(Ok(PullOutcome {
            successful: false,
            detail: "merge conflict in src/lib.rs".to_string(),
        }));

        let request = DistributionRequest::existing_refs(
            vec!["abc123".to_string()],
            vec!["main".to_string()],
        );
        let report = distribute(&engine, &request).unwrap();

        assert!(matches!(
            report.outcomes.get("main").unwrap(),
            BranchOutcome::PullFailed { .. }
        ));
        // Reported failure is data, not an engine error: one attempt only.
        assert_eq!(engine.count("pull"), 1);
        assert_eq!(engine.count("cherry-pick"), 0);
    }

    #[test]
    fn conflicting_cherry_pick_skips_push() {
        let engine = ScriptedEngine::new();
        engine.queue_cherry_pick(Ok(CherryPickOutcome {
            status: CherryPickStatus::Conflicting,
            applied_refs: Vec::new(),
            conflicts: vec!["src/lib.rs".to_string()],
            detail: "could not apply abc123".to_string(),
        }));

        let request = DistributionRequest::existing_refs(
            vec!["abc123".to_string()],
            vec!["main".to_string()],
        );
        let report = distribute(&engine, &request).unwrap();

        match report.outcomes.get("main").unwrap() {
            BranchOutcome::CherryPickFailed { conflicts, .. } => {
                assert_eq!(conflicts, &vec!["src/lib.rs".to_string()]);
            }
            other => panic!("expected cherry-pick failure, got {other:?}"),
        }
        assert_eq!(engine.count("push"), 0);
    }

    #[test]
    fn push_failure_is_advisory_and_never_triggers_the_retry() {
        let engine = ScriptedEngine::new();
        engine.queue_push(Err(engine_err("push")));

        let request = DistributionRequest::existing_refs(
            vec!["abc123".to_string()],
            vec!["main".to_string()],
        );
        let report = distribute(&engine, &request).unwrap();

        match report.outcomes.get("main").unwrap() {
            BranchOutcome::Published { push_failure, .. } => {
                assert!(push_failure.as_deref().unwrap().contains("index.lock"));
            }
            other => panic!("expected published, got {other:?}"),
        }
        assert_eq!(engine.count("pull"), 1);
        assert_eq!(engine.count("cherry-pick"), 1);
        assert_eq!(engine.count("push"), 1);
    }

    #[test]
    fn working_tree_source_publishes_then_replays_the_new_commit() {
        let engine = ScriptedEngine::new();
        engine.queue_commit(Ok("abc123".to_string()));

        let request =
            DistributionRequest::working_tree("fix", vec!["main".to_string()]);
        let report = distribute(&engine, &request).unwrap();

        match report.initial_publication().unwrap() {
            BranchOutcome::Published { applied_refs, .. } => {
                assert!(applied_refs.contains("abc123"));
            }
            other => panic!("expected published $initial, got {other:?}"),
        }
        match report.outcomes.get("main").unwrap() {
            BranchOutcome::Published { applied_refs, .. } => {
                assert!(applied_refs.contains("abc123"));
            }
            other => panic!("expected published main, got {other:?}"),
        }
        assert_eq!(report.outcomes.len(), 2);

        // Publish ran pull+add+commit+push, then the branch replayed the
        // fresh commit.
        assert_eq!(engine.count("add"), 1);
        assert_eq!(engine.count("commit"), 1);
        assert_eq!(engine.count("pull"), 2);
        assert_eq!(engine.count("push"), 2);
        assert!(engine
            .calls()
            .contains(&"cherry-pick abc123".to_string()));
    }

    #[test]
    fn empty_refs_is_a_configuration_error_with_zero_engine_calls() {
        let engine = ScriptedEngine::new();
        let request =
            DistributionRequest::existing_refs(Vec::new(), vec!["main".to_string()]);

        let err = distribute(&engine, &request).unwrap_err();
        assert!(matches!(err, AutoGitError::Config(_)));
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn empty_branch_list_is_a_configuration_error_with_zero_engine_calls() {
        let engine = ScriptedEngine::new();
        let request =
            DistributionRequest::existing_refs(vec!["abc123".to_string()], Vec::new());

        let err = distribute(&engine, &request).unwrap_err();
        assert!(matches!(err, AutoGitError::Config(_)));
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn blank_message_is_a_configuration_error_with_zero_engine_calls() {
        let engine = ScriptedEngine::new();
        let request = DistributionRequest::working_tree("   ", vec!["main".to_string()]);

        let err = distribute(&engine, &request).unwrap_err();
        assert!(matches!(err, AutoGitError::Config(_)));
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn duplicate_branch_keeps_the_first_recorded_outcome() {
        let engine = ScriptedEngine::new();
        engine.queue_cherry_pick(Ok(picked(&["def456"])));
        engine.queue_cherry_pick(Ok(CherryPickOutcome {
            status: CherryPickStatus::Conflicting,
            applied_refs: Vec::new(),
            conflicts: vec!["x".to_string()],
            detail: "second pass conflicted".to_string(),
        }));

        let request = DistributionRequest::existing_refs(
            vec!["abc123".to_string()],
            vec!["main".to_string(), "main".to_string()],
        );
        let report = distribute(&engine, &request).unwrap();

        // Both occurrences are processed, the recorded outcome is the first.
        assert_eq!(engine.count("checkout"), 2);
        assert!(report.outcomes.get("main").unwrap().is_published());
        assert_eq!(report.outcomes.len(), 1);
    }

    #[test]
    fn two_branch_scenario_matches_expected_report() {
        let engine = ScriptedEngine::new();
        engine.queue_checkout(Ok(ok_checkout("release/1.x")));
        engine.queue_cherry_pick(Ok(picked(&["def456"])));
        engine.queue_checkout(Ok(CheckoutOutcome {
            status: CheckoutStatus::Conflicts,
            branch: "release/2.x".to_string(),
            detail: "conflict".to_string(),
        }));

        let request = DistributionRequest::existing_refs(
            vec!["abc123".to_string()],
            vec!["release/1.x".to_string(), "release/2.x".to_string()],
        );
        let report = distribute(&engine, &request).unwrap();

        assert_eq!(
            report.outcomes.get("release/1.x").unwrap(),
            &BranchOutcome::Published {
                applied_refs: BTreeSet::from(["def456".to_string()]),
                push_failure: None,
            }
        );
        assert!(matches!(
            report.outcomes.get("release/2.x").unwrap(),
            BranchOutcome::CheckoutFailed { .. }
        ));
    }

    #[test]
    fn failed_initial_publication_aborts_the_run() {
        let engine = ScriptedEngine::new();
        engine.queue_pull(Ok(PullOutcome {
            successful: false,
            detail: "diverged".to_string(),
        }));

        let request = DistributionRequest::working_tree("fix", vec!["main".to_string()]);
        let err = distribute(&engine, &request).unwrap_err();

        assert!(matches!(err, AutoGitError::PublishPull(_)));
        // No branch was attempted: nothing to replay.
        assert_eq!(engine.count("checkout"), 0);
    }
}
