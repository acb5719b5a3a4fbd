//! kbox - Linux kernel and busybox build orchestrator
//!
//! Drives the Kbuild make interface of a kernel or busybox source tree:
//! out-of-tree builds, cleaning, configuration, source indexing and packaging
//! busybox into a root filesystem image.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Orchestration logic
//! - [`infra`] - Infrastructure layer (processes, filesystem, mounts)
//! - [`config`] - Defaults and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
