//! Scripted engine double for orchestrator tests (testing only)
//!
//! [`ScriptedEngine`] satisfies [`GitEngine`] without touching a
//! repository: responses are queued per operation and popped in call
//! order, and every call is logged so tests can assert counts and
//! sequencing.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::engine::GitEngine;
use crate::error::Result;
use crate::ops::{
    AddOptions, CheckoutOptions, CheckoutOutcome, CheckoutStatus, CherryPickOptions,
    CherryPickOutcome, CherryPickStatus, CommitOptions, FetchOptions, FetchOutcome, PullOptions,
    PullOutcome, PushOptions, RefPushReport, ResetOptions, WorkTreeStatus,
};

/// Scripted [`GitEngine`] double.
///
/// An empty queue yields a successful default, so tests only script the
/// calls they care about.
#[derive(Default)]
pub struct ScriptedEngine {
    calls: Mutex<Vec<String>>,
    checkout_results: Mutex<VecDeque<Result<CheckoutOutcome>>>,
    pull_results: Mutex<VecDeque<Result<PullOutcome>>>,
    cherry_pick_results: Mutex<VecDeque<Result<CherryPickOutcome>>>,
    push_results: Mutex<VecDeque<Result<Vec<RefPushReport>>>>,
    add_results: Mutex<VecDeque<Result<()>>>,
    commit_results: Mutex<VecDeque<Result<String>>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_checkout(&self, result: Result<CheckoutOutcome>) {
        self.checkout_results.lock().unwrap().push_back(result);
    }

    pub fn queue_pull(&self, result: Result<PullOutcome>) {
        self.pull_results.lock().unwrap().push_back(result);
    }

    pub fn queue_cherry_pick(&self, result: Result<CherryPickOutcome>) {
        self.cherry_pick_results.lock().unwrap().push_back(result);
    }

    pub fn queue_push(&self, result: Result<Vec<RefPushReport>>) {
        self.push_results.lock().unwrap().push_back(result);
    }

    pub fn queue_add(&self, result: Result<()>) {
        self.add_results.lock().unwrap().push_back(result);
    }

    pub fn queue_commit(&self, result: Result<String>) {
        self.commit_results.lock().unwrap().push_back(result);
    }

    /// Every call made so far, in order. Calls that carry an interesting
    /// argument log it after the operation name (`"checkout main"`).
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls to `op`, ignoring logged arguments.
    pub fn count(&self, op: &str) -> usize {
        let prefix = format!("{op} ");
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| *call == op || call.starts_with(&prefix))
            .count()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

impl GitEngine for ScriptedEngine {
    fn checkout(&self, opts: &CheckoutOptions) -> Result<CheckoutOutcome> {
        self.record(format!("checkout {}", opts.branch));
        self.checkout_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(CheckoutOutcome {
                    status: CheckoutStatus::Ok,
                    branch: opts.branch.clone(),
                    detail: String::new(),
                })
            })
    }

    fn pull(&self, _opts: &PullOptions) -> Result<PullOutcome> {
        self.record("pull");
        self.pull_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(PullOutcome {
                    successful: true,
                    detail: "up to date".to_string(),
                })
            })
    }

    fn cherry_pick(&self, opts: &CherryPickOptions) -> Result<CherryPickOutcome> {
        self.record(format!("cherry-pick {}", opts.refs.join(" ")));
        self.cherry_pick_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(CherryPickOutcome {
                    status: CherryPickStatus::Ok,
                    applied_refs: opts.refs.clone(),
                    conflicts: Vec::new(),
                    detail: String::new(),
                })
            })
    }

    fn push(&self, _opts: &PushOptions) -> Result<Vec<RefPushReport>> {
        self.record("push");
        self.push_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn add(&self, _opts: &AddOptions) -> Result<()> {
        self.record("add");
        self.add_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    fn commit(&self, opts: &CommitOptions) -> Result<String> {
        self.record(format!("commit {}", opts.message));
        self.commit_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("0000000000000000000000000000000000000000".to_string()))
    }

    fn fetch(&self, _opts: &FetchOptions) -> Result<FetchOutcome> {
        self.record("fetch");
        Ok(FetchOutcome {
            detail: String::new(),
        })
    }

    fn reset(&self, _opts: &ResetOptions) -> Result<String> {
        self.record("reset");
        Ok("0000000000000000000000000000000000000000".to_string())
    }

    fn status(&self) -> Result<WorkTreeStatus> {
        self.record("status");
        Ok(WorkTreeStatus::default())
    }
}
