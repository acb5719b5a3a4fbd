//! Build requests
//!
//! A [`BuildRequest`] is constructed once from command-line input and passed
//! by value through validation, environment resolution and dispatch.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::KboxError;

/// Kind of source tree being driven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Linux kernel tree
    Kernel,
    /// Busybox tree
    Busybox,
}

impl TargetKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Kernel => "kernel",
            Self::Busybox => "busybox",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operation requested with `-c`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Compile the tree into the output directory
    Build,
    /// Remove built objects, keep the output directory
    Clean,
    /// Remove the output directory entirely
    CleanAll,
    /// Run the interactive configurator and move `.config` into the output directory
    Config,
    /// Discard configuration files, keep build output
    ResetConfig,
    /// Generate source indexes with whatever indexers are installed
    GenerateIndex,
}

impl Operation {
    /// All operations, in usage order
    pub const ALL: [Operation; 6] = [
        Self::Build,
        Self::Clean,
        Self::CleanAll,
        Self::Config,
        Self::ResetConfig,
        Self::GenerateIndex,
    ];

    /// Canonical command-line name
    pub fn name(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Clean => "clean",
            Self::CleanAll => "cleanall",
            Self::Config => "config",
            Self::ResetConfig => "resetconfig",
            Self::GenerateIndex => "tags",
        }
    }

    /// Phase name used in timing reports
    pub fn phase_name(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Clean => "clean",
            Self::CleanAll => "clean-all",
            Self::Config => "config",
            Self::ResetConfig => "reset-config",
            Self::GenerateIndex => "generate-index",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = KboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "build" => Ok(Self::Build),
            "clean" => Ok(Self::Clean),
            "cleanall" | "clean-all" | "distclean" => Ok(Self::CleanAll),
            "config" | "menuconfig" => Ok(Self::Config),
            "resetconfig" | "reset-config" | "mrproper" => Ok(Self::ResetConfig),
            "tags" | "index" | "generate-index" => Ok(Self::GenerateIndex),
            _ => Err(KboxError::UnrecognizedOperation {
                name: s.to_string(),
            }),
        }
    }
}

/// One invocation's worth of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    target_path: PathBuf,
    toolchain_path: Option<String>,
    operation: Operation,
    target_kind: TargetKind,
}

impl BuildRequest {
    /// Create a request without a toolchain override
    pub fn new(target_kind: TargetKind, target_path: PathBuf, operation: Operation) -> Self {
        Self {
            target_path,
            toolchain_path: None,
            operation,
            target_kind,
        }
    }

    /// Set the cross-toolchain prefix given with `-t`
    #[must_use]
    pub fn with_toolchain(mut self, toolchain_path: Option<String>) -> Self {
        self.toolchain_path = toolchain_path.filter(|t| !t.trim().is_empty());
        self
    }

    /// Build a request from raw command-line values
    ///
    /// The target path is checked first, then the operation.
    pub fn from_args(
        target_kind: TargetKind,
        target_path: Option<PathBuf>,
        toolchain_path: Option<String>,
        operation: Option<&str>,
    ) -> Result<Self, KboxError> {
        let target_path = target_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(KboxError::MissingTargetPath)?;
        let operation = operation
            .filter(|op| !op.trim().is_empty())
            .ok_or(KboxError::MissingOperation)?
            .parse()?;

        Ok(Self::new(target_kind, target_path, operation).with_toolchain(toolchain_path))
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    pub fn toolchain_path(&self) -> Option<&str> {
        self.toolchain_path.as_deref()
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn target_kind(&self) -> TargetKind {
        self.target_kind
    }
}
