//! Track identifiers that stay unique across every file of a movie.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A (source file, in-file stream index) pair.
///
/// Ordering is by file path, then index, which keeps sorted collections of
/// ids deterministic across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedId {
    source: PathBuf,
    index: u32,
}

impl QualifiedId {
    pub fn new(source: impl Into<PathBuf>, index: u32) -> Self {
        Self {
            source: source.into(),
            index,
        }
    }

    /// The file this stream lives in.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Zero-based stream index inside [`source`](Self::source).
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for QualifiedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .source
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| self.source.to_string_lossy());
        write!(f, "{}:{}", name, self.index)
    }
}
