//! Input file fingerprint.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Identity of the input a run read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFingerprint {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 of the raw file contents, `sha256:`-prefixed.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Encoding the contents were decoded with.
    pub encoding: String,
    /// Whether undecodable bytes were replaced while decoding.
    pub had_replacements: bool,
}

impl InputFingerprint {
    pub fn new(path: PathBuf, contents: &[u8], encoding: &str, had_replacements: bool) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        Self {
            file,
            path,
            hash,
            size_bytes: contents.len() as u64,
            encoding: encoding.to_string(),
            had_replacements,
        }
    }
}
