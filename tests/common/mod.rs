//! Shared fixtures for integration tests: an in-memory prober and a
//! metadata source that knows nothing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tf_core::{Error, QualifiedId, Result, TrackType};
use tf_probe::{CharsetGuess, MetadataSource, ProbeRecord, ProbedFile, Prober, TrackDetail};

/// Serves canned probe results keyed by path.
#[derive(Default)]
pub struct FakeProber {
    files: HashMap<PathBuf, Vec<ProbeRecord>>,
}

impl FakeProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: &str, records: Vec<ProbeRecord>) -> Self {
        self.files.insert(PathBuf::from(path), records);
        self
    }
}

impl Prober for FakeProber {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn probe(&self, path: &Path) -> Result<ProbedFile> {
        self.files
            .get(path)
            .map(|records| ProbedFile::new(path, records.clone()))
            .ok_or_else(|| Error::Probe(format!("no fixture for {}", path.display())))
    }

    fn supports(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

/// Answers every enrichment query with "unknown", except for canned CRFs.
#[derive(Default)]
pub struct QuietSource {
    pub crf: HashMap<PathBuf, f32>,
}

impl MetadataSource for QuietSource {
    fn detect_crf(&self, path: &Path) -> Result<Option<f32>> {
        Ok(self.crf.get(path).copied())
    }

    fn detect_charset(&self, _path: &Path) -> Result<Option<CharsetGuess>> {
        Ok(None)
    }

    fn track_details(&self, _path: &Path) -> Result<Vec<TrackDetail>> {
        Ok(Vec::new())
    }
}

pub fn video(path: &str, index: u32, height: u32) -> ProbeRecord {
    let mut r = ProbeRecord::new(QualifiedId::new(path, index), TrackType::Video, "h264");
    r.width = Some(if height >= 720 { 1920 } else { 720 });
    r.height = Some(height);
    r.pixel_format = Some("yuv420p".into());
    r.field_order = Some("progressive".into());
    r.frame_rate = Some(if height >= 720 { "24000/1001" } else { "25/1" }.into());
    r.language = Some("eng".into());
    r
}

pub fn audio(path: &str, index: u32, codec: &str, language: &str, channels: u32) -> ProbeRecord {
    let mut r = ProbeRecord::new(QualifiedId::new(path, index), TrackType::Audio, codec);
    r.language = Some(language.into());
    r.channels = Some(channels);
    r
}

pub fn subtitle(path: &str, index: u32, language: &str, name: &str, captions: u64) -> ProbeRecord {
    let mut r = ProbeRecord::new(QualifiedId::new(path, index), TrackType::Subtitle, "subrip");
    r.language = Some(language.into());
    r.name = Some(name.into());
    r.caption_count = Some(captions);
    r
}
