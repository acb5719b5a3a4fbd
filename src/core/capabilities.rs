//! Optional tool probing
//!
//! Looks up the optional source indexers on the search path and records what
//! was found in a [`CapabilitySet`]. A missing tool is an expected state:
//! probing never fails, and each absent tool yields one advisory naming the
//! package that provides it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::KboxError;

/// Role an optional tool plays in index generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolRole {
    /// Symbol indexer (`tags`)
    Indexer,
    /// Cross-reference / call-graph database
    DepGraph,
    /// Secondary tag database
    SecondaryIndexer,
}

/// An optional external tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    /// Executable name
    pub name: &'static str,
    /// Distribution package providing it
    pub package: &'static str,
    pub role: ToolRole,
}

pub const CTAGS: Tool = Tool {
    name: "ctags",
    package: "universal-ctags",
    role: ToolRole::Indexer,
};

pub const CSCOPE: Tool = Tool {
    name: "cscope",
    package: "cscope",
    role: ToolRole::DepGraph,
};

pub const GTAGS: Tool = Tool {
    name: "gtags",
    package: "global",
    role: ToolRole::SecondaryIndexer,
};

/// All tools the prober looks for
pub const OPTIONAL_TOOLS: &[Tool] = &[CTAGS, CSCOPE, GTAGS];

/// Which optional tools may be used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    pub indexer_available: bool,
    pub depgraph_available: bool,
    pub secondary_indexer_available: bool,
}

impl CapabilitySet {
    /// No optional tools
    pub fn none() -> Self {
        Self::default()
    }

    /// Every optional tool
    pub fn all() -> Self {
        Self {
            indexer_available: true,
            depgraph_available: true,
            secondary_indexer_available: true,
        }
    }

    pub fn has(&self, role: ToolRole) -> bool {
        match role {
            ToolRole::Indexer => self.indexer_available,
            ToolRole::DepGraph => self.depgraph_available,
            ToolRole::SecondaryIndexer => self.secondary_indexer_available,
        }
    }

    fn set(&mut self, role: ToolRole, available: bool) {
        match role {
            ToolRole::Indexer => self.indexer_available = available,
            ToolRole::DepGraph => self.depgraph_available = available,
            ToolRole::SecondaryIndexer => self.secondary_indexer_available = available,
        }
    }

    /// Whether indexing would run no tool at all
    pub fn is_empty(&self) -> bool {
        self.available_count() == 0
    }

    pub fn available_count(&self) -> usize {
        OPTIONAL_TOOLS.iter().filter(|t| self.has(t.role)).count()
    }
}

/// Outcome of looking up one tool
#[derive(Debug, Clone)]
pub struct ToolCheck {
    pub tool: Tool,
    /// Resolved executable, if found
    pub path: Option<PathBuf>,
    /// Found but switched off by configuration
    pub disabled: bool,
}

impl ToolCheck {
    pub fn found(&self) -> bool {
        self.path.is_some()
    }

    pub fn usable(&self) -> bool {
        self.found() && !self.disabled
    }
}

/// Full probe outcome
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub capabilities: CapabilitySet,
    pub checks: Vec<ToolCheck>,
}

impl ProbeReport {
    /// One advisory per missing tool
    pub fn advisories(&self) -> Vec<KboxError> {
        self.checks
            .iter()
            .filter(|c| !c.found())
            .map(|c| KboxError::ToolUnavailable {
                tool: c.tool.name.to_string(),
                package: c.tool.package.to_string(),
            })
            .collect()
    }
}

/// Probes the search path for optional tools
#[derive(Debug, Clone, Default)]
pub struct CapabilityProber {
    search_path: Option<OsString>,
    depgraph_enabled: bool,
}

impl CapabilityProber {
    /// Probe `$PATH` with the dependency-graph indexer switched off
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe an explicit search path instead of `$PATH`
    #[must_use]
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    /// Allow the dependency-graph indexer to be used when found
    #[must_use]
    pub fn with_depgraph(mut self, enabled: bool) -> Self {
        self.depgraph_enabled = enabled;
        self
    }

    /// Resolve an executable on the search path
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        match &self.search_path {
            Some(paths) => which::which_in(name, Some(paths), Path::new(".")).ok(),
            None => which::which(name).ok(),
        }
    }

    /// Look up every optional tool
    pub fn probe(&self) -> ProbeReport {
        let mut capabilities = CapabilitySet::none();
        let checks: Vec<ToolCheck> = OPTIONAL_TOOLS
            .iter()
            .map(|&tool| {
                let path = self.locate(tool.name);
                let disabled = tool.role == ToolRole::DepGraph && !self.depgraph_enabled;
                match (&path, disabled) {
                    (Some(p), true) => tracing::info!(
                        "{} found at {} but disabled by configuration",
                        tool.name,
                        p.display()
                    ),
                    (Some(p), false) => tracing::debug!("{} found at {}", tool.name, p.display()),
                    (None, _) => tracing::debug!("{} not found", tool.name),
                }
                let check = ToolCheck {
                    tool,
                    path,
                    disabled,
                };
                capabilities.set(tool.role, check.usable());
                check
            })
            .collect();

        ProbeReport {
            capabilities,
            checks,
        }
    }
}
