//! CLI command implementations
//!
//! `kernel` and `busybox` share [`build`]; `tags` indexes any source tree.

pub mod build;
pub mod tags;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::Context;
use crate::core::request::TargetKind;

const OPERATIONS_HELP: &str = "\
Operations:
  build        Build out of tree into <path>/out
  clean        Run 'make clean' in <path>/out, keeping the directory
  cleanall     Remove <path>/out entirely
  config       Run menuconfig and store .config in <path>/out
  resetconfig  Remove .config from <path> and <path>/out
  tags         Generate source indexes in <path>";

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Operate on a Linux kernel source tree
    #[command(after_help = OPERATIONS_HELP)]
    Kernel(KernelArgs),

    /// Operate on a busybox source tree
    #[command(after_help = OPERATIONS_HELP)]
    Busybox(BusyboxArgs),

    /// Generate source indexes for any source tree
    Tags(TagsArgs),
}

/// Arguments of `kbox kernel`
#[derive(Args, Debug)]
pub struct KernelArgs {
    /// Kernel source root
    #[arg(short, long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Cross toolchain prefix, e.g. /opt/gcc/bin/aarch64-linux-gnu-
    #[arg(short, long, value_name = "PREFIX")]
    pub toolchain: Option<String>,

    /// Operation to run
    #[arg(short, long, value_name = "OPERATION")]
    pub command: Option<String>,
}

/// Arguments of `kbox busybox`
#[derive(Args, Debug)]
pub struct BusyboxArgs {
    /// Busybox source root
    #[arg(short, long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Operation to run
    #[arg(short, long, value_name = "OPERATION")]
    pub command: Option<String>,
}

/// Arguments of `kbox tags`
#[derive(Args, Debug)]
pub struct TagsArgs {
    /// Source root to index
    #[arg(short, long, value_name = "PATH")]
    pub path: Option<PathBuf>,
}

impl Commands {
    /// Execute the command
    pub async fn run(&self, ctx: &Context) -> Result<()> {
        match self {
            Self::Kernel(args) => {
                build::execute(
                    ctx,
                    TargetKind::Kernel,
                    args.path.clone(),
                    args.toolchain.clone(),
                    args.command.as_deref(),
                )
                .await
            }
            Self::Busybox(args) => {
                build::execute(
                    ctx,
                    TargetKind::Busybox,
                    args.path.clone(),
                    None,
                    args.command.as_deref(),
                )
                .await
            }
            Self::Tags(args) => tags::execute(ctx, args.path.clone()).await,
        }
    }
}

/// Print the usage of one subcommand to stderr
pub fn print_usage(subcommand: &str) {
    use clap::CommandFactory;
    let mut cli = crate::cli::Cli::command();
    if let Some(cmd) = cli.find_subcommand_mut(subcommand) {
        eprintln!("{}", cmd.render_help());
    }
}
