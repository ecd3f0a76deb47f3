//! AutoGit - git change automation CLI
//!
//! The `autogit` command lands a change across many maintained branches
//! of one repository and reports per-branch results as JSON.
//!
//! ## Commands
//!
//! - `distribute`: replay commits (or publish the working tree) onto a
//!   list of target branches
//! - `publish`: pull, stage, commit, and push the working tree as one step
//! - `checkout` / `pull` / `push` / `cherry-pick` / `fetch` / `reset` /
//!   `status`: the underlying atomic operations

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use tracing::Level;

use autogit_core::{
    distribute, publish, AddOptions, ChangeSource, CheckoutOptions, CherryPickOptions,
    CommitOptions, DistributionRequest, FastForwardMode, FetchOptions, GitEngine, Identity,
    PublishRequest, PullOptions, PushOptions, RepoContext, ResetMode, ResetOptions,
};

#[derive(Parser)]
#[command(name = "autogit")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Git change automation: land one change on many branches", long_about = None)]
struct Cli {
    /// Path to the working repository
    #[arg(long, global = true, default_value = ".", env = "AUTOGIT_REPO")]
    repo: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay commits onto every target branch, reporting per-branch results
    Distribute {
        /// Existing commit to replay (repeatable, applied in order)
        #[arg(short = 'c', long = "commit", value_name = "REF")]
        refs: Vec<String>,

        /// Publish the working tree as a new commit with this message first
        #[arg(short, long, conflicts_with = "refs")]
        message: Option<String>,

        /// Path pattern to stage when publishing (repeatable; all changes
        /// when omitted)
        #[arg(long = "add", value_name = "PATTERN")]
        add: Vec<String>,

        /// Commit author as 'Name <email>' (publish mode)
        #[arg(long)]
        author: Option<String>,

        /// Commit committer as 'Name <email>' (publish mode)
        #[arg(long)]
        committer: Option<String>,

        /// Exit non-zero when any branch failed
        #[arg(long)]
        strict: bool,

        /// Target branches, processed in order
        #[arg(required = true, value_name = "BRANCH")]
        branches: Vec<String>,
    },

    /// Pull, stage, commit, and push the working tree as one step
    Publish {
        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Path pattern to stage (repeatable; all changes when omitted)
        #[arg(long = "add", value_name = "PATTERN")]
        add: Vec<String>,

        /// Commit author as 'Name <email>'
        #[arg(long)]
        author: Option<String>,

        /// Commit committer as 'Name <email>'
        #[arg(long)]
        committer: Option<String>,

        /// Skip the synchronizing pull before staging
        #[arg(long)]
        no_pull: bool,
    },

    /// Switch the work tree to a branch
    Checkout {
        branch: String,

        /// Throw away local modifications
        #[arg(short, long)]
        force: bool,

        /// Create the branch when it does not exist
        #[arg(short = 'b', long)]
        create: bool,

        /// Revision to create the branch from
        #[arg(long, requires = "create")]
        start_point: Option<String>,
    },

    /// Synchronize the current branch with its upstream
    Pull {
        /// Remote to pull from
        #[arg(long)]
        remote: Option<String>,

        /// Remote branch to pull
        #[arg(long)]
        branch: Option<String>,

        /// Merge instead of rebasing
        #[arg(long)]
        no_rebase: bool,
    },

    /// Publish local commits to the remote
    Push {
        /// Remote to push to
        #[arg(long)]
        remote: Option<String>,

        /// Explicit refspec (repeatable)
        #[arg(long = "refspec", value_name = "REFSPEC")]
        refspecs: Vec<String>,

        #[arg(short, long)]
        force: bool,

        #[arg(long)]
        dry_run: bool,

        /// Ask the remote to update all refs or none
        #[arg(long)]
        atomic: bool,
    },

    /// Replay commits onto the current branch
    CherryPick {
        /// Commits to replay, in order
        #[arg(required = true, value_name = "REF")]
        refs: Vec<String>,

        /// Apply to the tree and index without committing
        #[arg(short = 'n', long)]
        no_commit: bool,

        /// Parent number to pick against for merge commits
        #[arg(short, long)]
        mainline: Option<u32>,
    },

    /// Download objects and refs from a remote
    Fetch {
        /// Remote to fetch from
        #[arg(long)]
        remote: Option<String>,

        /// Remove remote-tracking refs gone upstream
        #[arg(short, long)]
        prune: bool,

        /// Also fetch all tags
        #[arg(short, long)]
        tags: bool,

        /// Limit history depth
        #[arg(long)]
        depth: Option<u32>,
    },

    /// Move the current branch head
    Reset {
        /// Revision to reset to (HEAD when omitted)
        target: Option<String>,

        /// How far the reset reaches
        #[arg(long, value_enum, default_value_t = ResetModeArg::Soft)]
        mode: ResetModeArg,

        /// Unstage these paths instead of moving the head (repeatable)
        #[arg(long = "path", value_name = "PATH")]
        paths: Vec<String>,
    },

    /// Inspect the work tree and index
    Status,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResetModeArg {
    Soft,
    Mixed,
    Hard,
}

impl From<ResetModeArg> for ResetMode {
    fn from(mode: ResetModeArg) -> Self {
        match mode {
            ResetModeArg::Soft => ResetMode::Soft,
            ResetModeArg::Mixed => ResetMode::Mixed,
            ResetModeArg::Hard => ResetMode::Hard,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    autogit_core::init_tracing(cli.json, level);

    let repo = RepoContext::open(&cli.repo)
        .with_context(|| format!("failed to open repository at {}", cli.repo.display()))?;

    match cli.command {
        Commands::Distribute {
            refs,
            message,
            add,
            author,
            committer,
            strict,
            branches,
        } => cmd_distribute(&repo, refs, message, add, author, committer, branches, strict),
        Commands::Publish {
            message,
            add,
            author,
            committer,
            no_pull,
        } => cmd_publish(&repo, message, add, author, committer, no_pull),
        Commands::Checkout {
            branch,
            force,
            create,
            start_point,
        } => {
            let outcome = repo.checkout(&CheckoutOptions {
                forced: force,
                create_branch: create,
                start_point,
                ..CheckoutOptions::branch(branch)
            })?;
            print_json(&outcome)
        }
        Commands::Pull {
            remote,
            branch,
            no_rebase,
        } => {
            let outcome = repo.pull(&PullOptions {
                remote,
                branch,
                rebase: !no_rebase,
                ff: FastForwardMode::Ff,
            })?;
            print_json(&outcome)
        }
        Commands::Push {
            remote,
            refspecs,
            force,
            dry_run,
            atomic,
        } => {
            let reports = repo.push(&PushOptions {
                remote,
                refspecs,
                force,
                dry_run,
                atomic,
            })?;
            print_json(&reports)
        }
        Commands::CherryPick {
            refs,
            no_commit,
            mainline,
        } => {
            let outcome = repo.cherry_pick(&CherryPickOptions {
                refs,
                no_commit,
                mainline,
            })?;
            print_json(&outcome)
        }
        Commands::Fetch {
            remote,
            prune,
            tags,
            depth,
        } => {
            let outcome = repo.fetch(&FetchOptions {
                remote,
                refspecs: Vec::new(),
                prune,
                tags,
                depth,
            })?;
            print_json(&outcome)
        }
        Commands::Reset {
            target,
            mode,
            paths,
        } => {
            let head = repo.reset(&ResetOptions {
                ref_name: target,
                mode: mode.into(),
                paths,
            })?;
            print_json(&json!({ "head": head }))
        }
        Commands::Status => {
            let status = repo.status()?;
            let branch = repo.current_branch()?;
            print_json(&json!({ "branch": branch, "status": status }))
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_distribute(
    repo: &RepoContext,
    refs: Vec<String>,
    message: Option<String>,
    add: Vec<String>,
    author: Option<String>,
    committer: Option<String>,
    branches: Vec<String>,
    strict: bool,
) -> Result<()> {
    let source = match message {
        Some(message) => ChangeSource::WorkingTree {
            message,
            add: add_options(add),
            author: parse_identity(author.as_deref(), "author")?,
            committer: parse_identity(committer.as_deref(), "committer")?,
        },
        None => ChangeSource::ExistingRefs { refs },
    };
    let request = DistributionRequest {
        source,
        branches,
        pull: PullOptions::default(),
        push: PushOptions::default(),
    };

    let report = distribute(repo, &request)?;
    print_json(&report)?;

    if strict && !report.overall_success() {
        bail!(
            "distribution failed for: {}",
            report.failed_branches().join(", ")
        );
    }
    Ok(())
}

fn cmd_publish(
    repo: &RepoContext,
    message: String,
    add: Vec<String>,
    author: Option<String>,
    committer: Option<String>,
    no_pull: bool,
) -> Result<()> {
    let mut request = PublishRequest::message(message);
    request.add = add_options(add);
    request.commit = CommitOptions {
        author: parse_identity(author.as_deref(), "author")?,
        committer: parse_identity(committer.as_deref(), "committer")?,
        ..request.commit
    };
    if no_pull {
        request.pull = None;
    }

    let receipt = publish(repo, &request)?;
    print_json(&receipt)
}

fn add_options(patterns: Vec<String>) -> AddOptions {
    if patterns.is_empty() {
        AddOptions::default()
    } else {
        AddOptions::patterns(patterns)
    }
}

fn parse_identity(raw: Option<&str>, role: &str) -> Result<Option<Identity>> {
    match raw {
        None => Ok(None),
        Some(raw) => Identity::parse(raw)
            .map(Some)
            .with_context(|| format!("{role} must look like 'Name <email>'")),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
