//! Raw per-track probe records, as produced by a [`Prober`](crate::Prober).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use tf_core::{QualifiedId, TrackType};

/// One stream as reported by an external metadata source, before any
/// normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeRecord {
    pub id: QualifiedId,
    pub track_type: TrackType,
    /// Normalized codec id, e.g. `aac_lc` (see [`tf_core::Codec::probe_id`]).
    pub codec_id: String,
    /// Codec profile as reported (`High`, `Main`, ...).
    pub codec_profile: Option<String>,
    /// Codec level, e.g. `41` for H.264 level 4.1.
    pub level: Option<u32>,
    pub language: Option<String>,
    pub name: Option<String>,
    /// Container duration tag, `hh:mm:ss.fffffffff`.
    pub duration_tag: Option<String>,
    pub disposition_forced: bool,
    pub disposition_default: bool,
    pub frame_count: Option<u64>,
    pub caption_count: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub pixel_format: Option<String>,
    pub color_range: Option<String>,
    pub color_space: Option<String>,
    pub field_order: Option<String>,
    /// Rational frame rate, e.g. `24000/1001`.
    pub frame_rate: Option<String>,
    pub channels: Option<u32>,
    pub sample_rate: Option<u32>,
}

impl ProbeRecord {
    /// A record with only the mandatory fields set.
    pub fn new(id: QualifiedId, track_type: TrackType, codec_id: impl Into<String>) -> Self {
        Self {
            id,
            track_type,
            codec_id: codec_id.into(),
            codec_profile: None,
            level: None,
            language: None,
            name: None,
            duration_tag: None,
            disposition_forced: false,
            disposition_default: false,
            frame_count: None,
            caption_count: None,
            width: None,
            height: None,
            pixel_format: None,
            color_range: None,
            color_space: None,
            field_order: None,
            frame_rate: None,
            channels: None,
            sample_rate: None,
        }
    }
}

/// Everything one probe run learned about one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbedFile {
    pub path: PathBuf,
    pub records: Vec<ProbeRecord>,
}

impl ProbedFile {
    pub fn new(path: impl Into<PathBuf>, records: Vec<ProbeRecord>) -> Self {
        Self {
            path: path.into(),
            records,
        }
    }
}
