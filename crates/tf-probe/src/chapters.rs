//! Chapter files (`*chapters*.txt`, `*chapters*.xml`) need no external tool:
//! the whole file is one Chapters track.

use std::path::Path;

use tf_core::{Codec, QualifiedId, TrackType};

use crate::prober::Prober;
use crate::record::{ProbeRecord, ProbedFile};

/// Reports a chapters file as a single Chapters record.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChaptersProber;

/// Whether `path` names a chapters file.
pub fn is_chapters_file(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    name.contains("chapters") && (name.ends_with(".txt") || name.ends_with(".xml"))
}

impl Prober for ChaptersProber {
    fn name(&self) -> &'static str {
        "chapters"
    }

    fn probe(&self, path: &Path) -> tf_core::Result<ProbedFile> {
        let record = ProbeRecord::new(
            QualifiedId::new(path, 0),
            TrackType::Chapters,
            Codec::Chapters.props().id,
        );
        Ok(ProbedFile::new(path, vec![record]))
    }

    fn supports(&self, path: &Path) -> bool {
        is_chapters_file(path)
    }
}
