//! Clean and configuration-file logic
//!
//! `clean-all` removes the whole output directory. `reset-config` removes
//! configuration files only and leaves build output alone. After a
//! `menuconfig` run the fresh `.config` is relocated from the source root into
//! the output directory.

use std::path::{Path, PathBuf};

use crate::error::{FilesystemError, KboxError};
use crate::infra::filesystem;

/// Kbuild configuration file
pub const CONFIG_FILE: &str = ".config";

/// Configuration files discarded by `reset-config`
pub const CONFIG_FILES: &[&str] = &[".config", ".config.old"];

/// Result of a clean operation
#[derive(Debug, Default)]
pub struct CleanResult {
    /// Paths that were removed
    pub removed: Vec<PathBuf>,
    /// Paths that didn't exist (skipped)
    pub skipped: Vec<PathBuf>,
}

impl CleanResult {
    fn record(&mut self, path: PathBuf, removed: bool) {
        if removed {
            self.removed.push(path);
        } else {
            self.skipped.push(path);
        }
    }
}

/// Remove the output directory entirely
///
/// A missing output directory is not an error.
pub fn clean_all(out_dir: &Path) -> Result<CleanResult, FilesystemError> {
    let mut result = CleanResult::default();
    let removed = filesystem::remove_dir_all(out_dir)?;
    result.record(out_dir.to_path_buf(), removed);
    Ok(result)
}

/// Remove configuration files from the source root and the output directory
pub fn reset_config(root: &Path, out_dir: &Path) -> Result<CleanResult, FilesystemError> {
    let mut result = CleanResult::default();
    for dir in [root, out_dir] {
        for name in CONFIG_FILES {
            let path = dir.join(name);
            let removed = filesystem::remove_file(&path)?;
            result.record(path, removed);
        }
    }
    Ok(result)
}

/// Move `<root>/.config` to `<out_dir>/.config`, creating `out_dir` if needed
///
/// Returns the new location.
pub fn relocate_config(root: &Path, out_dir: &Path) -> Result<PathBuf, KboxError> {
    let source = root.join(CONFIG_FILE);
    if !source.is_file() {
        return Err(KboxError::ConfigNotProduced { path: source });
    }

    filesystem::create_dir_all(out_dir)?;
    let dest = out_dir.join(CONFIG_FILE);
    filesystem::move_file(&source, &dest)?;
    Ok(dest)
}

/// Check whether the output directory has anything in it
pub fn has_build_output(out_dir: &Path) -> bool {
    std::fs::read_dir(out_dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}
