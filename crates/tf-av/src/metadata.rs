//! [`MetadataSource`] backed by the external tools in a [`ToolRegistry`].

use std::path::Path;

use tf_probe::{CharsetGuess, MetadataSource, TrackDetail};

use crate::charset;
use crate::crf::CrfProbe;
use crate::probe::MediaInfoProbe;
use crate::tools::ToolRegistry;

/// Answers enrichment queries with ffmpeg, mediainfo and the charset
/// detector. A missing tool turns the corresponding query into an error,
/// which enrichment logs and treats as "unknown".
#[derive(Debug, Clone)]
pub struct ToolMetadataSource {
    crf: Option<CrfProbe>,
    mediainfo: Option<MediaInfoProbe>,
}

impl ToolMetadataSource {
    pub fn new(registry: &ToolRegistry) -> Self {
        Self {
            crf: registry
                .require("ffmpeg")
                .ok()
                .map(|cfg| CrfProbe::new(cfg.path.clone())),
            mediainfo: registry
                .require("mediainfo")
                .ok()
                .map(|cfg| MediaInfoProbe::new(cfg.path.clone())),
        }
    }
}

impl MetadataSource for ToolMetadataSource {
    fn detect_crf(&self, path: &Path) -> tf_core::Result<Option<f32>> {
        match &self.crf {
            Some(probe) => probe.detect(path),
            None => Err(tf_core::Error::tool("ffmpeg", "not available for CRF probing")),
        }
    }

    fn detect_charset(&self, path: &Path) -> tf_core::Result<Option<CharsetGuess>> {
        charset::detect_file(path)
    }

    fn track_details(&self, path: &Path) -> tf_core::Result<Vec<TrackDetail>> {
        match &self.mediainfo {
            Some(probe) => probe.track_details(path),
            None => Err(tf_core::Error::tool("mediainfo", "not available for track details")),
        }
    }
}
