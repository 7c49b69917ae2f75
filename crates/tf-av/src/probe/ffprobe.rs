//! FFprobe-based [`tf_probe::Prober`] implementation.
//!
//! Shells out to `ffprobe -v quiet -print_format json -show_streams` and maps
//! every carried stream to a [`ProbeRecord`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tf_core::{Codec, QualifiedId, TrackType};
use tf_probe::{ProbeRecord, ProbedFile, Prober};

use crate::command::ToolCommand;

/// Caption counts some rippers put in subtitle file names, e.g.
/// `Heat.eng, 1532 captions.srt`.
static CAPTION_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r", (\d+) caption").expect("valid regex"));

/// A prober backed by the `ffprobe` CLI.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    /// Path to the ffprobe binary.
    ffprobe_path: PathBuf,
}

impl FfprobeProber {
    /// Create a new prober using the given ffprobe path.
    pub fn new(ffprobe_path: PathBuf) -> Self {
        Self { ffprobe_path }
    }

    /// Create a prober that finds ffprobe on `PATH`.
    pub fn from_path() -> Option<Self> {
        which::which("ffprobe")
            .ok()
            .map(|p| Self { ffprobe_path: p })
    }
}

impl Prober for FfprobeProber {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    fn probe(&self, path: &Path) -> tf_core::Result<ProbedFile> {
        let output = ToolCommand::new(&self.ffprobe_path)
            .args(["-v", "quiet", "-print_format", "json", "-show_streams"])
            .path(path)
            .run()?;
        parse_ffprobe_json(path, &output.stdout)
    }

    fn supports(&self, path: &Path) -> bool {
        // ffprobe supports basically all media formats.
        path.extension().is_some()
    }
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: u32,
    codec_type: Option<String>,
    codec_name: Option<String>,
    profile: Option<String>,
    level: Option<i64>,
    width: Option<u32>,
    height: Option<u32>,
    pix_fmt: Option<String>,
    color_range: Option<String>,
    color_space: Option<String>,
    field_order: Option<String>,
    r_frame_rate: Option<String>,
    channels: Option<u32>,
    sample_rate: Option<String>,
    #[serde(default)]
    disposition: FfprobeDisposition,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeDisposition {
    #[serde(default)]
    default: u8,
    #[serde(default)]
    forced: u8,
    #[serde(default)]
    attached_pic: u8,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Parse ffprobe's JSON for `path` into probe records.
///
/// # Errors
///
/// Returns [`tf_core::Error::Probe`] if the JSON is malformed.
pub fn parse_ffprobe_json(path: &Path, json: &str) -> tf_core::Result<ProbedFile> {
    let output: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| tf_core::Error::Probe(format!("ffprobe JSON parse error: {e}")))?;

    let caption_count = caption_count_from_name(path);
    let records = output
        .streams
        .into_iter()
        .filter_map(|stream| map_stream(path, stream, caption_count))
        .collect();
    Ok(ProbedFile::new(path, records))
}

fn map_stream(path: &Path, stream: FfprobeStream, caption_count: Option<u64>) -> Option<ProbeRecord> {
    let track_type = match stream.codec_type.as_deref() {
        Some("video") if stream.disposition.attached_pic == 1 => return None,
        Some("video") => TrackType::Video,
        Some("audio") => TrackType::Audio,
        Some("subtitle") => TrackType::Subtitle,
        _ => return None,
    };

    let codec_name = stream.codec_name.as_deref().unwrap_or("unknown");
    // Only audio codecs encode their variant in the profile.
    let codec_id = match track_type {
        TrackType::Audio => Codec::probe_id(codec_name, stream.profile.as_deref()),
        _ => Codec::probe_id(codec_name, None),
    };

    let mut record = ProbeRecord::new(QualifiedId::new(path, stream.index), track_type, codec_id);
    record.codec_profile = stream.profile;
    record.level = stream.level.and_then(|l| u32::try_from(l).ok());
    record.language = tag(&stream.tags, "language").map(str::to_string);
    record.name = tag(&stream.tags, "title").map(str::to_string);
    record.duration_tag = tag(&stream.tags, "DURATION").map(str::to_string);
    record.frame_count = tag(&stream.tags, "NUMBER_OF_FRAMES").and_then(|n| n.parse().ok());
    record.disposition_default = stream.disposition.default == 1;
    record.disposition_forced = stream.disposition.forced == 1;

    match track_type {
        TrackType::Video => {
            record.width = stream.width;
            record.height = stream.height;
            record.pixel_format = stream.pix_fmt;
            record.color_range = stream.color_range;
            record.color_space = stream.color_space;
            record.field_order = stream.field_order;
            record.frame_rate = stream.r_frame_rate;
        }
        TrackType::Audio => {
            record.channels = stream.channels;
            record.sample_rate = stream.sample_rate.and_then(|s| s.parse().ok());
        }
        TrackType::Subtitle => record.caption_count = caption_count,
        TrackType::Chapters => {}
    }
    Some(record)
}

/// Look up a Matroska tag, accepting the `-eng` suffixed variant mkvmerge
/// writes for statistics tags.
fn tag<'a>(tags: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    tags.get(key)
        .or_else(|| tags.get(&format!("{key}-eng")))
        .map(String::as_str)
}

fn caption_count_from_name(path: &Path) -> Option<u64> {
    let name = path.file_name()?.to_string_lossy();
    CAPTION_COUNT
        .captures(&name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MKV_JSON: &str = r#"{
        "streams": [
            {
                "index": 0, "codec_type": "video", "codec_name": "h264",
                "profile": "High", "level": 41, "width": 1920, "height": 1080,
                "pix_fmt": "yuv420p", "color_range": "tv", "color_space": "bt709",
                "field_order": "progressive", "r_frame_rate": "24000/1001",
                "disposition": {"default": 1, "forced": 0, "attached_pic": 0},
                "tags": {"DURATION": "01:50:00.000000000", "NUMBER_OF_FRAMES-eng": "158241"}
            },
            {
                "index": 1, "codec_type": "audio", "codec_name": "dts",
                "profile": "DTS-HD MA", "channels": 6, "sample_rate": "48000",
                "disposition": {"default": 1, "forced": 0},
                "tags": {"language": "eng", "title": "Main"}
            },
            {
                "index": 2, "codec_type": "subtitle", "codec_name": "hdmv_pgs_subtitle",
                "disposition": {"default": 0, "forced": 1},
                "tags": {"language": "rus", "NUMBER_OF_FRAMES": "212"}
            },
            {
                "index": 3, "codec_type": "video", "codec_name": "mjpeg",
                "disposition": {"attached_pic": 1}
            },
            {
                "index": 4, "codec_type": "attachment", "codec_name": "ttf"
            }
        ]
    }"#;

    #[test]
    fn maps_streams_to_records() {
        let probed = parse_ffprobe_json(Path::new("/m/Heat.mkv"), MKV_JSON).unwrap();
        assert_eq!(probed.records.len(), 3);

        let video = &probed.records[0];
        assert_eq!(video.track_type, TrackType::Video);
        assert_eq!(video.codec_id, "h264");
        assert_eq!(video.codec_profile.as_deref(), Some("High"));
        assert_eq!(video.level, Some(41));
        assert_eq!(video.frame_count, Some(158_241));
        assert_eq!(video.duration_tag.as_deref(), Some("01:50:00.000000000"));
        assert_eq!(video.frame_rate.as_deref(), Some("24000/1001"));
        assert!(video.disposition_default);

        let audio = &probed.records[1];
        assert_eq!(audio.codec_id, "dts_dts_hd_ma");
        assert_eq!(audio.channels, Some(6));
        assert_eq!(audio.sample_rate, Some(48_000));
        assert_eq!(audio.language.as_deref(), Some("eng"));
        assert_eq!(audio.name.as_deref(), Some("Main"));

        let sub = &probed.records[2];
        assert_eq!(sub.id, QualifiedId::new("/m/Heat.mkv", 2));
        assert!(sub.disposition_forced);
        assert_eq!(sub.frame_count, Some(212));
    }

    #[test]
    fn caption_count_comes_from_file_name() {
        let json = r#"{"streams": [{"index": 0, "codec_type": "subtitle", "codec_name": "subrip"}]}"#;
        let probed = parse_ffprobe_json(Path::new("/m/Heat.eng, 1532 captions.srt"), json).unwrap();
        assert_eq!(probed.records[0].caption_count, Some(1532));

        let probed = parse_ffprobe_json(Path::new("/m/Heat.eng.srt"), json).unwrap();
        assert_eq!(probed.records[0].caption_count, None);
    }

    #[test]
    fn negative_level_is_dropped() {
        let json = r#"{"streams": [{"index": 0, "codec_type": "video", "codec_name": "mpeg2video", "level": -99}]}"#;
        let probed = parse_ffprobe_json(Path::new("/m/a.mpg"), json).unwrap();
        assert_eq!(probed.records[0].level, None);
    }

    #[test]
    fn video_profile_is_not_part_of_codec_id() {
        let probed = parse_ffprobe_json(Path::new("/m/Heat.mkv"), MKV_JSON).unwrap();
        assert!(probed
            .records
            .iter()
            .all(|r| tf_core::Codec::from_id(&r.codec_id).is_some()));
    }

    #[test]
    fn malformed_json_is_probe_error() {
        let err = parse_ffprobe_json(Path::new("/m/a.mkv"), "not json").unwrap_err();
        assert!(matches!(err, tf_core::Error::Probe(_)));
    }
}
