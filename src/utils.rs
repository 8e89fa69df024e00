//! Utility functions for paths, file names and digests

use crate::core::error::{ResultExt, ShipResult};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Check if a remote spec is a local filesystem path (not a GitHub `owner/repo`)
///
/// Returns true for:
/// - Absolute paths on Unix: /path/to/releases
/// - Absolute paths on Windows: C:\path\to\releases or C:/path/to/releases
/// - Relative paths: ./path or ../path
/// - UNC paths on Windows: \\server\share
///
/// Returns false for:
/// - GitHub slugs: owner/repo
/// - URLs: <https://github.com/owner/repo>
pub fn is_local_path(path: &str) -> bool {
  let p = Path::new(path);

  if path.starts_with("./") || path.starts_with("../") {
    return true;
  }

  // Windows drive letter (C:\ or C:/), checked before the URL check since it contains ':'
  if path.len() >= 3 {
    let bytes = path.as_bytes();
    if bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && (bytes[2] == b'\\' || bytes[2] == b'/') {
      return true;
    }
  }

  if path.starts_with("\\\\") {
    return true;
  }

  // Path::is_absolute() returns false for Unix-style paths on Windows
  if path.starts_with('/') && !path.contains("://") && !path.contains('@') {
    return true;
  }

  if p.is_absolute() {
    return true;
  }

  false
}

/// Make a string safe to use as a single file name component
///
/// Tags and group names may contain `/` (e.g. `agent/v1.2.3`).
pub fn sanitize_component(raw: &str) -> String {
  let cleaned: String = raw
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
        c
      } else {
        '_'
      }
    })
    .collect();
  match cleaned.as_str() {
    "" | "." | ".." => format!("_{}", cleaned),
    _ => cleaned,
  }
}

/// Hex-encoded SHA-256 of a file's contents
pub fn sha256_file(path: &Path) -> ShipResult<String> {
  let mut file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
  let mut hasher = Sha256::new();
  let mut buf = [0u8; 64 * 1024];
  loop {
    let n = file
      .read(&mut buf)
      .with_context(|| format!("Failed to read {}", path.display()))?;
    if n == 0 {
      break;
    }
    hasher.update(&buf[..n]);
  }
  Ok(format!("{:x}", hasher.finalize()))
}

/// File name of a path as an owned string (empty if the path has none)
pub fn file_name_of(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().to_string())
    .unwrap_or_default()
}
