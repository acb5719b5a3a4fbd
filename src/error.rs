//! Error types for kbox
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::config::ConfigError;
use crate::infra::process::ExitStatus;

/// Exit code used for usage errors (missing or unknown arguments)
pub const USAGE_EXIT_CODE: i32 = 2;

/// SIGINT, reported when the operator interrupts a running phase
const SIGINT: i32 = 2;

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to remove file
    #[error("Failed to remove file '{path}': {error}")]
    RemoveFile { path: PathBuf, error: String },

    /// Failed to move file
    #[error("Failed to move '{from}' to '{to}': {error}")]
    MoveFile {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },
}

/// Top-level kbox error type
#[derive(Error, Debug)]
pub enum KboxError {
    /// No subcommand given on the command line
    #[error("No command given. Use one of: kernel, busybox, tags")]
    MissingCommand,

    /// No source root given on the command line
    #[error("No target path given. Pass the source root with -p <path>")]
    MissingTargetPath,

    /// Source root is missing or not the expected kind of tree
    #[error("Invalid {kind} target '{path}': {reason}")]
    InvalidTarget {
        path: PathBuf,
        kind: String,
        reason: String,
    },

    /// No operation given on the command line
    #[error("No operation given. Pass one with -c <operation>")]
    MissingOperation,

    /// Operation name is not one of the known operations
    #[error("Unrecognized operation '{name}'")]
    UnrecognizedOperation { name: String },

    /// Optional tool is not installed (advisory)
    #[error("{tool} not found in PATH, install '{package}' to enable it")]
    ToolUnavailable { tool: String, package: String },

    /// External step reported failure
    #[error("Phase '{phase}' failed at step '{step}' ({status})")]
    ExternalPhaseFailure {
        phase: String,
        step: String,
        status: ExitStatus,
    },

    /// External program could not be started
    #[error("Failed to run '{program}': {error}")]
    Spawn { program: String, error: String },

    /// Configurator succeeded without writing a configuration
    #[error("Configuration step finished but produced no {path}")]
    ConfigNotProduced { path: PathBuf },

    /// Packaging started before the install phase populated the staging tree
    #[error("Staging directory '{path}' does not exist. Run the install phase first")]
    MissingStaging { path: PathBuf },

    /// Operator interrupted a running phase
    #[error("Interrupted while running '{program}'")]
    Interrupted { program: String },

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl KboxError {
    /// Whether this error should be accompanied by usage output
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::MissingCommand
                | Self::MissingTargetPath
                | Self::MissingOperation
                | Self::UnrecognizedOperation { .. }
        )
    }

    /// Status recorded for a phase that ended with this error
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Self::ExternalPhaseFailure { status, .. } => *status,
            Self::Interrupted { .. } => ExitStatus::from_signal(SIGINT),
            _ => ExitStatus::from_code(1),
        }
    }

    /// Process exit code for an invocation that failed with this error
    ///
    /// External failures pass the child's own code through unchanged.
    pub fn exit_code(&self) -> i32 {
        if self.is_usage() {
            USAGE_EXIT_CODE
        } else {
            self.exit_status().exit_code()
        }
    }
}
