//! Distribution result model.
//!
//! A [`DistributionReport`] maps every requested branch to exactly one
//! [`BranchOutcome`]. When the change was first published from the work
//! tree, the reserved [`INITIAL_BRANCH`] key records that initial
//! publication alongside the per-branch results.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reserved pseudo-branch key for the initial publication of a
/// working-tree change.
pub const INITIAL_BRANCH: &str = "$initial";

/// Terminal result of processing one branch.
///
/// Outcomes are independent: a failure recorded for one branch says
/// nothing about any other branch in the same report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BranchOutcome {
    /// The branch could not be checked out; no further step was attempted.
    CheckoutFailed { detail: String },
    /// Synchronizing with the upstream failed; the replay was skipped.
    PullFailed { detail: String },
    /// The replay conflicted or errored; nothing was pushed.
    CherryPickFailed {
        detail: String,
        conflicts: Vec<String>,
    },
    /// The change landed. `push_failure` carries the advisory detail of a
    /// push that failed after the commits were already applied locally.
    Published {
        applied_refs: BTreeSet<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        push_failure: Option<String>,
    },
}

impl BranchOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, BranchOutcome::Published { .. })
    }

    /// Short machine-readable label for the outcome kind.
    pub fn kind(&self) -> &'static str {
        match self {
            BranchOutcome::CheckoutFailed { .. } => "checkout_failed",
            BranchOutcome::PullFailed { .. } => "pull_failed",
            BranchOutcome::CherryPickFailed { .. } => "cherry_pick_failed",
            BranchOutcome::Published { .. } => "published",
        }
    }
}

/// Result of one distribution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionReport {
    /// Identifier of this run, for log correlation.
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// One outcome per requested branch, keyed by branch name, plus
    /// [`INITIAL_BRANCH`] when a working-tree change was published first.
    pub outcomes: BTreeMap<String, BranchOutcome>,
}

impl DistributionReport {
    /// `true` when every branch (and the initial publication, if any)
    /// ended in [`BranchOutcome::Published`].
    pub fn overall_success(&self) -> bool {
        self.outcomes.values().all(BranchOutcome::is_published)
    }

    /// Branches whose outcome is not `Published`, in key order.
    pub fn failed_branches(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_published())
            .map(|(branch, _)| branch.as_str())
            .collect()
    }

    /// Outcome recorded for the initial publication, when one happened.
    pub fn initial_publication(&self) -> Option<&BranchOutcome> {
        self.outcomes.get(INITIAL_BRANCH)
    }
}
