// Cache path utilities.
// Locates the cache directory and maps cache keys onto file names.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Get the base cache directory (~/.cache/huddle on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "huddle").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Directory holding the persisted key-value entries.
pub fn store_dir(base: &Path) -> PathBuf {
    base.join("kv")
}

/// Path to the application log file.
pub fn log_path(base: &Path) -> PathBuf {
    base.join("huddle.log")
}

/// Path of the file backing a single key.
pub fn entry_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.json", encode_name(key)))
}

/// Encode a key as a file name.
/// ASCII letters, digits, `_` and `-` pass through; every other byte becomes
/// `%XX`, so distinct keys always get distinct names.
fn encode_name(name: &str) -> String {
    let mut encoded = String::with_capacity(name.len());
    for byte in name.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'-' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
