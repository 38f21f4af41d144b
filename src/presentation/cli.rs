//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! ## Design Notes
//!
//! - Without a subcommand the binary is the hook itself and takes the
//!   Gerrit-style ref-update flags
//! - Global flags (--json, --config, --verbose) are inherited by all subcommands

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::value_objects::{ProjectId, RevisionId};

/// deploygate - build and deploy pushes to a remote host
#[derive(Parser, Debug)]
#[command(name = "deploygate")]
#[command(author, version, about, long_about = None)]
#[command(subcommand_negates_reqs = true, args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Emit NDJSON events instead of progress markers
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: $DEPLOYGATE_CONFIG, then ~/.config/deploygate/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub hook: HookArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Ref update as passed by the hook host
#[derive(Args, Debug, Default)]
pub struct HookArgs {
    /// Project name (default: derived from $GIT_DIR)
    #[arg(long)]
    pub project: Option<ProjectId>,

    /// Full ref name, e.g. refs/heads/master
    #[arg(long, required = true)]
    pub refname: Option<String>,

    /// Identity of the pusher
    #[arg(long, required = true)]
    pub uploader: Option<String>,

    /// Revision before the push
    #[arg(long, required = true, value_name = "REV")]
    pub oldrev: Option<RevisionId>,

    /// Revision after the push
    #[arg(long, required = true, value_name = "REV")]
    pub newrev: Option<RevisionId>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect or reset per-project mirror state
    Mirror {
        #[command(subcommand)]
        action: MirrorAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum MirrorAction {
    /// Print whether the remote mirror exists
    Status {
        #[arg(long)]
        project: ProjectId,
    },

    /// Forget the remote mirror so the next push bootstraps again
    Reset {
        #[arg(long)]
        project: ProjectId,
    },
}
