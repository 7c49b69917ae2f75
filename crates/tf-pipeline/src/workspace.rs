//! Temp path allocation for one movie.
//!
//! The plan is emitted, not executed, so nothing is created here: the
//! [`Workspace`] only hands out names. Names are derived from the movie stem
//! and a counter, which keeps the emitted script identical across runs over
//! the same input. Movies of one batch share the temp directory, so a batch
//! numbers each workspace to keep equal stems apart.

use std::path::{Path, PathBuf};

/// Allocator of intermediate file names inside a temp directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    temp_dir: PathBuf,
    stem: String,
    next: u32,
}

impl Workspace {
    /// A workspace for the movie whose main file is `main_file`.
    pub fn new(temp_dir: impl Into<PathBuf>, main_file: &Path) -> Self {
        let stem = main_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "movie".to_string());
        Self {
            temp_dir: temp_dir.into(),
            stem,
            next: 1,
        }
    }

    /// Tag every name with the movie's position in its batch.
    pub fn numbered(mut self, number: usize) -> Self {
        self.stem = format!("{}.{number:03}", self.stem);
        self
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// A fresh intermediate path with the given extension.
    pub fn temp_file(&mut self, extension: &str) -> PathBuf {
        let name = format!(
            "{}.tf{:02}.{}",
            self.stem,
            self.next,
            extension.trim_start_matches('.')
        );
        self.next += 1;
        self.temp_dir.join(name)
    }

    /// The temp name the muxer writes to before promotion.
    pub fn mux_output(&self) -> PathBuf {
        self.temp_dir.join(format!("{}.tfmux.mkv", self.stem))
    }
}

/// The `.sub` half of a VobSub pair whose index is `idx`.
pub fn vobsub_companion(idx: &Path) -> PathBuf {
    idx.with_extension("sub")
}
