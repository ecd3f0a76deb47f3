//! AutoGit Core Library
//!
//! Automates landing a change across many maintained branches of one git
//! repository: checkout → pull → cherry-pick → push per branch, with
//! per-branch failure isolation, a bounded retry on transient engine
//! failures, and a complete per-branch report.
//!
//! The orchestration layer is written against the [`GitEngine`]
//! capability trait; [`RepoContext`] implements it by driving the system
//! `git` binary.

pub mod distribute;
pub mod engine;
pub mod error;
pub mod fakes;
pub mod ops;
pub mod publish;
pub mod repo;
pub mod report;
pub mod retry;
pub mod telemetry;

pub use distribute::{distribute, ChangeSource, DistributionRequest};

pub use engine::GitEngine;

pub use error::{AutoGitError, Result};

pub use ops::{
    AddOptions, CheckoutOptions, CheckoutOutcome, CheckoutStatus, CherryPickOptions,
    CherryPickOutcome, CherryPickStatus, CommitOptions, FastForwardMode, FetchOptions,
    FetchOutcome, Identity, PullOptions, PullOutcome, PushOptions, PushRefStatus, RefPushReport,
    ResetMode, ResetOptions, WorkTreeStatus,
};

pub use publish::{publish, PublishReceipt, PublishRequest};

pub use repo::RepoContext;

pub use report::{BranchOutcome, DistributionReport, INITIAL_BRANCH};

pub use retry::attempt;

pub use telemetry::init_tracing;
