//! Core orchestration logic
//!
//! Request parsing, validation, environment resolution and dispatch. Child
//! processes are only ever started through [`crate::infra::process`].
//!
//! # Submodules
//!
//! - [`request`] - Target kinds, operations and the build request
//! - [`target`] - Source tree validation
//! - [`build_env`] - Native/cross environment resolution
//! - [`kbuild`] - Kbuild make invocations
//! - [`clean`] - Output and configuration removal
//! - [`capabilities`] - Optional tool probing
//! - [`index`] - Source index generation
//! - [`image`] - Root filesystem image packaging
//! - [`phase`] - Phase timing and reporting
//! - [`dispatch`] - Operation dispatch
//! - [`config`] - User configuration

pub mod build_env;
pub mod capabilities;
pub mod clean;
pub mod config;
pub mod dispatch;
pub mod image;
pub mod index;
pub mod kbuild;
pub mod phase;
pub mod request;
pub mod target;
