//! Skein CLI - skein command

use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use skein_cli::cmd;
use skein_history::SimilarityMetric;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Skein - a minimal snapshot version-control tool
#[derive(Parser)]
#[command(name = "skein")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a repository in the current directory
    Init,
    /// Record the working tree as a new commit
    Commit {
        /// Commit message (words are joined with spaces)
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Restore the working tree to a commit and move HEAD there
    Checkout {
        /// Commit hash, unique hash prefix or branch name
        commit: String,
    },
    /// Switch to a branch
    #[command(alias = "cb")]
    Switch {
        /// Branch name
        branch: String,
    },
    /// Show history reachable from HEAD
    Log {
        /// Number of commits to show (default: log.limit, else all)
        #[arg(long)]
        limit: Option<usize>,
        /// One line per commit
        #[arg(long)]
        oneline: bool,
    },
    /// Show the commits that changed a file
    #[command(alias = "fh")]
    FileHistory {
        /// Path relative to the repository root
        path: String,
    },
    /// Find commits whose message resembles a query
    Search {
        /// Query (words are joined with spaces)
        #[arg(required = true)]
        query: Vec<String>,
        /// Score with Levenshtein similarity
        #[arg(long, group = "metric")]
        lev: bool,
        /// Score with cosine similarity of character bigrams
        #[arg(long, group = "metric")]
        cos: bool,
        /// Score with Jaccard similarity of character bigrams
        #[arg(long, group = "metric")]
        jac: bool,
        /// Score with LCS similarity (default)
        #[arg(long, group = "metric")]
        lcs: bool,
    },
    /// Merge two commits into the working tree
    Merge {
        /// First commit
        a: String,
        /// Second commit
        b: String,
        /// Abort on conflicting paths instead of interleaving lines
        #[arg(long)]
        no_force: bool,
    },
    /// Merge a branch into the current branch and commit the result
    #[command(alias = "mb")]
    MergeBranch {
        /// Branch to merge
        branch: String,
        /// Abort on conflicting paths instead of interleaving lines
        #[arg(long)]
        no_force: bool,
    },
    /// Create, delete, rename or list branches
    #[command(subcommand)]
    Branch(BranchCommands),
    /// Delete commits unreachable from any branch head
    Gc {
        /// Report what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
    },
    /// Walk history interactively (l: parent, r: child)
    Play,
}

#[derive(Subcommand)]
enum BranchCommands {
    /// Create a branch and make it current
    Create {
        /// Branch name
        name: String,
        /// Commit to point at (default: HEAD)
        commit: Option<String>,
    },
    /// Delete a branch
    Delete {
        /// Branch name
        name: String,
    },
    /// Rename a branch
    Rename {
        /// Current name
        old: String,
        /// New name
        new: String,
    },
    /// List branches
    List,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Init => cmd::init::run(),
        Commands::Commit { message } => cmd::commit::run(&message),
        Commands::Checkout { commit } => cmd::checkout::run(&commit),
        Commands::Switch { branch } => cmd::switch::run(&branch),
        Commands::Log { limit, oneline } => cmd::log::run(limit, oneline),
        Commands::FileHistory { path } => cmd::file_history::run(&path),
        Commands::Search { query, lev, cos, jac, lcs: _ } => {
            let metric = if lev {
                SimilarityMetric::Levenshtein
            } else if cos {
                SimilarityMetric::Cosine
            } else if jac {
                SimilarityMetric::Jaccard
            } else {
                SimilarityMetric::Lcs
            };
            cmd::search::run(&query, metric)
        }
        Commands::Merge { a, b, no_force } => cmd::merge::run(&a, &b, no_force),
        Commands::MergeBranch { branch, no_force } => cmd::merge_branch::run(&branch, no_force),
        Commands::Branch(branch_cmd) => match branch_cmd {
            BranchCommands::Create { name, commit } => cmd::branch::create(&name, commit.as_deref()),
            BranchCommands::Delete { name } => cmd::branch::delete(&name),
            BranchCommands::Rename { old, new } => cmd::branch::rename(&old, &new),
            BranchCommands::List => cmd::branch::list(),
        },
        Commands::Gc { dry_run } => cmd::gc::run(dry_run),
        Commands::Play => cmd::play::run(),
    }
}
