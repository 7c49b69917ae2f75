//! Recover the CRF of a previous x264 encode.
//!
//! x264 embeds its settings string in an SEI message. Decoding a single frame
//! at debug verbosity makes ffmpeg log it, `crf=22.0` included.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::command::ToolCommand;

static CRF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"crf=([\d.]+)").expect("valid regex"));

/// Single-frame decode probe.
#[derive(Debug, Clone)]
pub struct CrfProbe {
    ffmpeg_path: PathBuf,
}

impl CrfProbe {
    pub fn new(ffmpeg_path: PathBuf) -> Self {
        Self { ffmpeg_path }
    }

    /// CRF logged for the first video frame of `path`, if any.
    pub fn detect(&self, path: &Path) -> tf_core::Result<Option<f32>> {
        let output = ToolCommand::new(&self.ffmpeg_path)
            .arg("-i")
            .path(path)
            .args(["-an", "-vframes", "1", "-f", "null", "-", "-v", "48"])
            .run()?;
        Ok(parse_crf(&output.stderr))
    }
}

/// Extract the first `crf=` value from ffmpeg's log.
pub fn parse_crf(log: &str) -> Option<f32> {
    CRF.captures(log)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
