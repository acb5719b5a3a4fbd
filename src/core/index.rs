//! Source index generation
//!
//! Collects the tree's source files into a file list, then runs each available
//! indexer over that list from the source root. With no indexers installed
//! the file list alone is produced.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::core::capabilities::{CapabilitySet, ToolRole, CSCOPE, CTAGS, GTAGS};
use crate::error::KboxError;
use crate::infra::filesystem;
use crate::infra::process::Invocation;

/// File list written at the top of the source root
pub const FILE_LIST: &str = "kbox.files";

/// Collect source files below `root`, relative to it and sorted
///
/// Hidden directories and the top-level output directory are skipped.
/// Unreadable entries and names that are not UTF-8 are left out with a
/// warning, since indexers read the file list as text.
pub fn collect_sources(root: &Path, extensions: &[String], output_dir: &str) -> Vec<PathBuf> {
    let skip = root.join(output_dir);
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !(is_hidden(entry) || entry.path() == skip));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry while indexing: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_extension(entry.path(), extensions) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if relative.to_str().is_none() {
            tracing::warn!(
                "Skipping non-UTF-8 file name {}",
                relative.to_string_lossy()
            );
            continue;
        }
        files.push(relative.to_path_buf());
    }

    files.sort();
    files
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext))
}

/// Write the file list used by every indexer
pub fn write_file_list(root: &Path, files: &[PathBuf]) -> Result<PathBuf, KboxError> {
    let path = root.join(FILE_LIST);
    let mut content = String::new();
    for file in files.iter().filter_map(|f| f.to_str()) {
        content.push_str(file);
        content.push('\n');
    }
    filesystem::write_file(&path, &content)?;
    Ok(path)
}

/// Indexer invocations for the available tools, in run order
pub fn index_invocations(root: &Path, capabilities: &CapabilitySet) -> Vec<(&'static str, Invocation)> {
    let mut steps = Vec::new();

    if capabilities.has(ToolRole::Indexer) {
        steps.push((
            CTAGS.name,
            Invocation::new(CTAGS.name).args(["-L", FILE_LIST, "-f", "tags"]),
        ));
    }
    if capabilities.has(ToolRole::DepGraph) {
        steps.push((
            CSCOPE.name,
            Invocation::new(CSCOPE.name).args(["-b", "-q", "-k", "-i", FILE_LIST]),
        ));
    }
    if capabilities.has(ToolRole::SecondaryIndexer) {
        steps.push((
            GTAGS.name,
            Invocation::new(GTAGS.name).args(["-f", FILE_LIST]),
        ));
    }

    steps
        .into_iter()
        .map(|(name, inv)| (name, inv.current_dir(root)))
        .collect()
}
