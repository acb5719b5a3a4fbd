//! Target path validation
//!
//! Confirms that a directory really is the source root of the requested kind
//! before anything long-running or destructive touches it.

use std::path::Path;

use crate::core::request::TargetKind;
use crate::error::KboxError;

/// Something that must be present at the top of a source root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    File(&'static str),
    Dir(&'static str),
}

impl Marker {
    fn is_present(self, root: &Path) -> bool {
        match self {
            Self::File(name) => root.join(name).is_file(),
            Self::Dir(name) => root.join(name).is_dir(),
        }
    }

    fn describe(self) -> String {
        match self {
            Self::File(name) => format!("missing '{name}' file"),
            Self::Dir(name) => format!("missing '{name}/' directory"),
        }
    }
}

const KERNEL_MARKERS: &[Marker] = &[
    Marker::File("Makefile"),
    Marker::Dir("arch"),
    Marker::Dir("kernel"),
];

const BUSYBOX_MARKERS: &[Marker] = &[
    Marker::File("Makefile"),
    Marker::File("Config.in"),
    Marker::Dir("applets"),
];

/// Markers identifying a source root of the given kind
pub fn markers(kind: TargetKind) -> &'static [Marker] {
    match kind {
        TargetKind::Kernel => KERNEL_MARKERS,
        TargetKind::Busybox => BUSYBOX_MARKERS,
    }
}

/// Validate a kernel or busybox source root
pub fn validate_target(path: &Path, kind: TargetKind) -> Result<(), KboxError> {
    check_directory(path, kind.name())?;

    if let Some(marker) = markers(kind).iter().find(|m| !m.is_present(path)) {
        return Err(invalid(path, kind.name(), marker.describe()));
    }
    Ok(())
}

/// Validate a directory to index; any existing directory qualifies
pub fn validate_source_root(path: &Path) -> Result<(), KboxError> {
    check_directory(path, "source")
}

fn check_directory(path: &Path, kind: &str) -> Result<(), KboxError> {
    if path.as_os_str().is_empty() {
        return Err(invalid(path, kind, "path is empty".to_string()));
    }
    if !path.exists() {
        return Err(invalid(path, kind, "path does not exist".to_string()));
    }
    if !path.is_dir() {
        return Err(invalid(path, kind, "not a directory".to_string()));
    }
    Ok(())
}

fn invalid(path: &Path, kind: &str, reason: String) -> KboxError {
    KboxError::InvalidTarget {
        path: path.to_path_buf(),
        kind: kind.to_string(),
        reason,
    }
}
