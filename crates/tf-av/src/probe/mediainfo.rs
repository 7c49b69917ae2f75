//! MediaInfo-backed per-track details.
//!
//! Shells out to `mediainfo --Output=JSON <file>`. MediaInfo distinguishes
//! codec sub-variants (DTS-ES, DTS 96/24) that ffprobe folds together, so it
//! feeds codec-variant refinement rather than the main probe.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tf_probe::TrackDetail;

use crate::command::ToolCommand;

/// Reads per-track format details with the `mediainfo` CLI.
#[derive(Debug, Clone)]
pub struct MediaInfoProbe {
    mediainfo_path: PathBuf,
}

impl MediaInfoProbe {
    /// Create a new probe using the given mediainfo path.
    pub fn new(mediainfo_path: PathBuf) -> Self {
        Self { mediainfo_path }
    }

    /// Create a probe that finds mediainfo on `PATH`.
    pub fn from_path() -> Option<Self> {
        which::which("mediainfo")
            .ok()
            .map(|p| Self { mediainfo_path: p })
    }

    /// Details of every elementary stream of `path`.
    pub fn track_details(&self, path: &Path) -> tf_core::Result<Vec<TrackDetail>> {
        let output = ToolCommand::new(&self.mediainfo_path)
            .arg("--Output=JSON")
            .path(path)
            .run()?;
        parse_mediainfo_json(&output.stdout)
    }
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MiOutput {
    media: MiMedia,
}

#[derive(Debug, Deserialize)]
struct MiMedia {
    #[serde(default)]
    track: Vec<MiTrack>,
}

#[derive(Debug, Deserialize)]
struct MiTrack {
    #[serde(rename = "@type")]
    track_type: String,

    #[serde(rename = "ID")]
    id: Option<String>,

    #[serde(rename = "StreamOrder")]
    stream_order: Option<String>,

    #[serde(rename = "Format")]
    format: Option<String>,

    #[serde(rename = "Format_Profile")]
    format_profile: Option<String>,

    #[serde(rename = "Format_AdditionalFeatures")]
    additional_features: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse mediainfo's JSON into track details keyed by probe stream index.
///
/// # Errors
///
/// Returns [`tf_core::Error::Probe`] if the JSON is malformed.
pub fn parse_mediainfo_json(json: &str) -> tf_core::Result<Vec<TrackDetail>> {
    let mi: MiOutput = serde_json::from_str(json)
        .map_err(|e| tf_core::Error::Probe(format!("mediainfo JSON parse error: {e}")))?;

    Ok(mi
        .media
        .track
        .into_iter()
        .filter(|t| matches!(t.track_type.as_str(), "Video" | "Audio" | "Text"))
        .filter_map(|t| {
            let index = stream_index(&t)?;
            Some(TrackDetail {
                index,
                format: t.format.unwrap_or_default(),
                profile: t.format_profile,
                features: t
                    .additional_features
                    .map(|f| f.split_whitespace().map(str::to_string).collect())
                    .unwrap_or_default(),
            })
        })
        .collect())
}

/// Probe index of a mediainfo track: `StreamOrder` when present, otherwise
/// the 1-based `ID` minus one.
fn stream_index(track: &MiTrack) -> Option<u32> {
    if let Some(order) = track.stream_order.as_deref().and_then(|s| s.parse().ok()) {
        return Some(order);
    }
    let id: u32 = track.id.as_deref()?.split_whitespace().next()?.parse().ok()?;
    id.checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_use_zero_based_indices() {
        let json = r#"{"media": {"track": [
            {"@type": "General", "Format": "Matroska"},
            {"@type": "Video", "ID": "1", "Format": "AVC", "Format_Profile": "High@L4.1"},
            {"@type": "Audio", "ID": "2", "Format": "DTS", "Format_Profile": "ES Matrix / Core"},
            {"@type": "Audio", "ID": "3", "Format": "DTS", "Format_AdditionalFeatures": "XLL X"},
            {"@type": "Menu"}
        ]}}"#;
        let details = parse_mediainfo_json(json).unwrap();
        assert_eq!(details.len(), 3);
        assert_eq!(details[1].index, 1);
        assert_eq!(details[1].profile.as_deref(), Some("ES Matrix / Core"));
        assert_eq!(details[2].index, 2);
        assert_eq!(details[2].features, vec!["XLL", "X"]);
    }

    #[test]
    fn stream_order_wins_over_id() {
        let json = r#"{"media": {"track": [
            {"@type": "Audio", "ID": "7", "StreamOrder": "1", "Format": "AC-3"}
        ]}}"#;
        let details = parse_mediainfo_json(json).unwrap();
        assert_eq!(details[0].index, 1);
    }

    #[test]
    fn tracks_without_ids_are_skipped() {
        let json = r#"{"media": {"track": [{"@type": "Text", "Format": "UTF-8"}]}}"#;
        assert!(parse_mediainfo_json(json).unwrap().is_empty());
    }
}
