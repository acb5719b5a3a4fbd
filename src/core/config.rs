//! kbox configuration
//!
//! Reads settings from `config.toml` in the config directory, or from a file
//! given with `--config`. A missing default file yields the built-in defaults;
//! a file that exists but does not parse is an error.
//!
//! ```toml
//! [build]
//! deployment_arch = "arm64"
//! cross_compile = "aarch64-linux-gnu-"
//!
//! [index]
//! depgraph_enabled = false
//!
//! [package]
//! size_mb = 128
//! privilege_command = ""
//! ```

use crate::config::defaults;
use crate::infra::dirs::KboxDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: String, error: String },

    /// A setting holds an unusable value
    #[error("Invalid '{key}' in config file '{path}': {reason}")]
    InvalidValue {
        path: String,
        key: &'static str,
        reason: String,
    },
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KboxConfig {
    /// Build settings shared by all targets
    pub build: BuildConfig,

    /// Source indexing settings
    pub index: IndexConfig,

    /// Busybox root filesystem image settings
    pub package: PackageConfig,
}

/// Build settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Output directory name, relative to the target root
    pub output_dir: String,

    /// Parallel jobs passed to make (defaults to the CPU count)
    pub jobs: Option<usize>,

    /// Kernel `ARCH` of the board the images are deployed to
    pub deployment_arch: String,

    /// Cross-compile prefix used when `-t` is not given
    pub cross_compile: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::DEFAULT_OUTPUT_DIR.to_string(),
            jobs: None,
            deployment_arch: defaults::DEFAULT_DEPLOYMENT_ARCH.to_string(),
            cross_compile: defaults::DEFAULT_CROSS_COMPILE.to_string(),
        }
    }
}

impl BuildConfig {
    /// Job count for make; zero or unset means one per CPU
    pub fn jobs(&self) -> usize {
        self.jobs.filter(|&j| j > 0).unwrap_or_else(num_cpus::get)
    }
}

/// Indexing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Use cscope even when it is installed; off unless asked for
    pub depgraph_enabled: bool,

    /// File extensions collected into the index file list
    pub extensions: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            depgraph_enabled: false,
            extensions: defaults::DEFAULT_INDEX_EXTENSIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Image packaging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Install staging directory, relative to the output directory
    pub staging_dir: String,

    /// Image file, relative to the output directory
    pub image: String,

    /// Image size in MiB
    pub size_mb: u64,

    /// Scratch mount point
    pub mount_point: PathBuf,

    /// Filesystem type passed to `mkfs.<fs_type>`
    pub fs_type: String,

    /// Wrapper for privileged steps; empty runs them directly
    pub privilege_command: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            staging_dir: defaults::DEFAULT_STAGING_DIR.to_string(),
            image: defaults::DEFAULT_IMAGE.to_string(),
            size_mb: defaults::DEFAULT_IMAGE_SIZE_MB,
            mount_point: PathBuf::from(defaults::DEFAULT_MOUNT_POINT),
            fs_type: defaults::DEFAULT_FS_TYPE.to_string(),
            privilege_command: defaults::DEFAULT_PRIVILEGE_COMMAND.to_string(),
        }
    }
}

impl PackageConfig {
    /// Privilege wrapper, or `None` when disabled
    pub fn privilege(&self) -> Option<&str> {
        let command = self.privilege_command.trim();
        (!command.is_empty()).then_some(command)
    }
}

impl KboxConfig {
    /// Load configuration from an explicit file or the config directory
    ///
    /// An explicit file must exist; the default location may be absent.
    pub fn resolve(explicit: Option<&Path>, dirs: &KboxDirs) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) if !path.exists() => Err(ConfigError::ReadError {
                path: path.display().to_string(),
                error: "file not found".to_string(),
            }),
            Some(path) => Self::load_from_path(path),
            None => Self::load(dirs),
        }
    }

    /// Load configuration from the config directory
    pub fn load(dirs: &KboxDirs) -> Result<Self, ConfigError> {
        Self::load_from_path(&dirs.config_path())
    }

    /// Load configuration from a specific path
    ///
    /// Returns defaults if the file doesn't exist.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        config.validate().map_err(|(key, reason)| ConfigError::InvalidValue {
            path: path.display().to_string(),
            key,
            reason,
        })?;
        Ok(config)
    }

    /// Check settings that name paths inside the target root
    ///
    /// The output directory is removed by `cleanall`, so it must stay below
    /// the root and never be the root itself.
    fn validate(&self) -> Result<(), (&'static str, String)> {
        for (key, value) in [
            ("build.output_dir", &self.build.output_dir),
            ("package.staging_dir", &self.package.staging_dir),
            ("package.image", &self.package.image),
        ] {
            check_nested_path(value).map_err(|reason| (key, reason))?;
        }
        Ok(())
    }
}

/// Accept only non-empty relative paths made of plain names
fn check_nested_path(value: &str) -> Result<(), String> {
    let path = Path::new(value);
    if value.trim().is_empty() {
        return Err("must not be empty".to_string());
    }
    if path.is_absolute() {
        return Err(format!("'{value}' must be relative"));
    }
    if !path.components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(format!("'{value}' must not contain '.' or '..'"));
    }
    Ok(())
}
