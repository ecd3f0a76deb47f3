//! Capability seam between orchestration and the underlying git engine.
//!
//! The distribution orchestrator and the publish composition are written
//! against [`GitEngine`], not against a concrete repository. Inject a
//! [`crate::repo::RepoContext`] to drive the system git binary, or a
//! [`crate::fakes::ScriptedEngine`] in tests.

use crate::error::Result;
use crate::ops::{
    self, AddOptions, CheckoutOptions, CheckoutOutcome, CherryPickOptions, CherryPickOutcome,
    CommitOptions, FetchOptions, FetchOutcome, PullOptions, PullOutcome, PushOptions,
    RefPushReport, ResetOptions, WorkTreeStatus,
};
use crate::repo::RepoContext;

/// Blocking git capabilities, one method per atomic operation.
///
/// Every call is synchronous and may perform network I/O; the calling
/// thread blocks for the duration. Methods returning an outcome type
/// signal operational failure through that outcome's status; `Err` is
/// reserved for process-level failures.
pub trait GitEngine {
    /// Switch the work tree to a branch.
    fn checkout(&self, opts: &CheckoutOptions) -> Result<CheckoutOutcome>;

    /// Synchronize the current branch with its upstream.
    fn pull(&self, opts: &PullOptions) -> Result<PullOutcome>;

    /// Replay commits onto the current branch.
    fn cherry_pick(&self, opts: &CherryPickOptions) -> Result<CherryPickOutcome>;

    /// Publish local commits to the remote.
    fn push(&self, opts: &PushOptions) -> Result<Vec<RefPushReport>>;

    /// Stage working-tree changes.
    fn add(&self, opts: &AddOptions) -> Result<()>;

    /// Record a commit, returning its id.
    fn commit(&self, opts: &CommitOptions) -> Result<String>;

    /// Download objects and refs from a remote.
    fn fetch(&self, opts: &FetchOptions) -> Result<FetchOutcome>;

    /// Move the current branch head, returning the resolved id.
    fn reset(&self, opts: &ResetOptions) -> Result<String>;

    /// Inspect the work tree and index.
    fn status(&self) -> Result<WorkTreeStatus>;
}

impl GitEngine for RepoContext {
    fn checkout(&self, opts: &CheckoutOptions) -> Result<CheckoutOutcome> {
        ops::checkout::run(self, opts)
    }

    fn pull(&self, opts: &PullOptions) -> Result<PullOutcome> {
        ops::pull::run(self, opts)
    }

    fn cherry_pick(&self, opts: &CherryPickOptions) -> Result<CherryPickOutcome> {
        ops::cherry_pick::run(self, opts)
    }

    fn push(&self, opts: &PushOptions) -> Result<Vec<RefPushReport>> {
        ops::push::run(self, opts)
    }

    fn add(&self, opts: &AddOptions) -> Result<()> {
        ops::add::run(self, opts)
    }

    fn commit(&self, opts: &CommitOptions) -> Result<String> {
        ops::commit::run(self, opts)
    }

    fn fetch(&self, opts: &FetchOptions) -> Result<FetchOutcome> {
        ops::fetch::run(self, opts)
    }

    fn reset(&self, opts: &ResetOptions) -> Result<String> {
        ops::reset::run(self, opts)
    }

    fn status(&self) -> Result<WorkTreeStatus> {
        ops::status::run(self)
    }
}
