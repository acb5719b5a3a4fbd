//! Mount table inspection
//!
//! Reads the kernel's mount table to find mounts left attached by an earlier
//! failed packaging run.

use std::path::{Path, PathBuf};

/// Mount table of the current process
pub const PROC_MOUNTS: &str = "/proc/self/mounts";

/// Check whether `mount_point` appears as a mount target in `table`
///
/// An unreadable table is treated as "not mounted".
pub fn is_mounted(table: &Path, mount_point: &Path) -> bool {
    let Ok(content) = std::fs::read_to_string(table) else {
        return false;
    };
    let wanted = normalize(mount_point);
    let found = mount_targets(&content).any(|target| normalize(&target) == wanted);
    found
}

/// Mount targets listed in mount-table text (second field of each line)
pub fn mount_targets(content: &str) -> impl Iterator<Item = PathBuf> + '_ {
    content
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(|field| PathBuf::from(unescape(field)))
}

/// Decode the octal escapes (`\040` for space etc.) used in mount tables
fn unescape(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let value = std::str::from_utf8(&bytes[i + 1..i + 4])
                .ok()
                .and_then(|digits| u8::from_str_radix(digits, 8).ok());
            if let Some(value) = value {
                out.push(value);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
