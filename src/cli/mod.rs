//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no orchestration logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::core::config::KboxConfig;
use crate::error::KboxError;
use crate::infra::dirs::KboxDirs;
use commands::Commands;
use output::OutputConfig;

/// kbox - Linux kernel and busybox build orchestrator
///
/// Builds, cleans, configures and indexes kernel and busybox source trees,
/// and packages busybox into a root filesystem image.
#[derive(Parser, Debug)]
#[command(name = "kbox")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output phase reports as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (default: <config dir>/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Allow the cscope dependency-graph indexer
    #[arg(long, global = true)]
    pub depgraph: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Everything a command needs besides its own arguments
#[derive(Debug, Clone)]
pub struct Context {
    pub config: KboxConfig,
    pub output: OutputConfig,
}

impl Cli {
    /// Output settings selected by the global flags
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig::new(self.quiet, self.json, self.verbose)
    }

    /// Load configuration and apply flag overrides
    pub fn context(&self) -> Result<Context> {
        let mut config = KboxConfig::resolve(self.config.as_deref(), &KboxDirs::new())
            .map_err(KboxError::from)?;
        if self.depgraph {
            config.index.depgraph_enabled = true;
        }
        Ok(Context {
            config,
            output: self.output_config(),
        })
    }

    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        let Some(command) = &self.command else {
            // No subcommand provided, show usage
            use clap::CommandFactory;
            eprintln!("{}", Self::command().render_help());
            return Err(KboxError::MissingCommand.into());
        };
        let ctx = self.context()?;
        command.run(&ctx).await
    }
}
