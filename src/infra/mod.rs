//! Infrastructure layer
//!
//! Handles I/O that the core delegates: child processes, filesystem
//! operations, the mount table and platform directories.

pub mod dirs;
pub mod filesystem;
pub mod mounts;
pub mod process;
