//! Policy and configuration types.
//!
//! The top-level [`Config`] is deserialized from TOML by the binary and
//! carries the wanted-track slots, encode policy, audio classification,
//! heuristic thresholds, and tool overrides. Every section defaults sensibly
//! so an empty file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::codec::{Codec, CodecKind};
use crate::error::Result;
use crate::lang;
use crate::media::{CropRect, TrackType, Tune};
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tracks: WantedTracks,
    pub policy: Policy,
    pub audio: AudioPolicy,
    pub thresholds: Thresholds,
    pub tools: ToolsConfig,
    pub paths: PathsConfig,
}

impl Config {
    /// Reject conflicting or out-of-range settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.tracks.validate()?;
        self.policy.validate()?;
        self.audio.validate()?;
        self.thresholds.validate()
    }
}

// ---------------------------------------------------------------------------
// Wanted tracks
// ---------------------------------------------------------------------------

/// One (track type, forced-class) slot and its ordered languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WantedSlot {
    #[serde(rename = "type")]
    pub track_type: TrackType,
    #[serde(default)]
    pub forced: bool,
    pub languages: Vec<String>,
}

impl WantedSlot {
    pub fn new(track_type: TrackType, forced: bool, languages: &[&str]) -> Self {
        Self {
            track_type,
            forced,
            languages: languages.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Ordered wanted-track specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WantedTracks(Vec<WantedSlot>);

impl Default for WantedTracks {
    fn default() -> Self {
        Self(vec![
            WantedSlot::new(TrackType::Video, false, &[lang::UNDETERMINED]),
            WantedSlot::new(TrackType::Audio, false, &[lang::UNDETERMINED]),
        ])
    }
}

impl WantedTracks {
    pub fn new(slots: Vec<WantedSlot>) -> Self {
        Self(slots)
    }

    pub fn slots(&self) -> &[WantedSlot] {
        &self.0
    }

    /// Languages of the slot for `(track_type, forced)`, if declared.
    pub fn languages(&self, track_type: TrackType, forced: bool) -> Option<&[String]> {
        self.0
            .iter()
            .find(|s| s.track_type == track_type && s.forced == forced)
            .map(|s| s.languages.as_slice())
    }

    /// Rewrite every language to its table code (`deu` becomes `ger`).
    pub fn normalized(mut self) -> Self {
        for slot in &mut self.0 {
            for language in &mut slot.languages {
                *language = lang::normalize(Some(language));
            }
        }
        self
    }

    fn validate(&self) -> Result<()> {
        let mut seen = Vec::new();
        for slot in &self.0 {
            let key = (slot.track_type, slot.forced);
            if seen.contains(&key) {
                return Err(Error::config(format!(
                    "duplicate {} slot (forced = {})",
                    slot.track_type, slot.forced
                )));
            }
            seen.push(key);

            if slot.languages.is_empty() {
                return Err(Error::config(format!(
                    "{} slot (forced = {}) has no languages",
                    slot.track_type, slot.forced
                )));
            }
            match slot.track_type {
                TrackType::Chapters => {
                    return Err(Error::config(
                        "chapters are carried automatically and cannot be requested",
                    ))
                }
                TrackType::Video if slot.forced || slot.languages.len() != 1 => {
                    return Err(Error::config(
                        "the video slot must be non-forced with exactly one language",
                    ))
                }
                _ => {}
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Global encode policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Keep the source video when it already meets the encode target.
    pub keep_video: bool,
    /// Always re-encode the video.
    pub recode_video: bool,
    /// Always re-encode every audio track.
    pub recode_audio: bool,
    /// Maximum channel count; wider tracks are downmixed.
    pub downmix_channels: Option<u32>,
    /// Forced subtitle slots may be left empty.
    pub optional_forced: bool,
    /// Crop window applied to every movie.
    pub crop: Option<CropRect>,
    /// Per-movie crop windows, keyed by main file stem.
    pub crop_map: Option<PathBuf>,
    /// Encode tune; asked per movie when unset.
    pub tune: Option<Tune>,
    /// Display aspect override, e.g. `16:9`.
    pub aspect: Option<String>,
    /// Scale filter target, e.g. `1280:-2`.
    pub scale: Option<String>,
    /// Accept a source colorspace that differs from the derived target.
    pub keep_colorspace: bool,
    /// Emit nothing for movies that need no processing.
    pub skip_unchanged: bool,
    /// Delete the source files after a successful promotion.
    pub remove_sources: bool,
}

impl Policy {
    fn validate(&self) -> Result<()> {
        if self.keep_video && self.recode_video {
            return Err(Error::config("keep_video and recode_video are mutually exclusive"));
        }
        if self.crop.is_some() && self.crop_map.is_some() {
            return Err(Error::config("crop and crop_map are mutually exclusive"));
        }
        if self.downmix_channels == Some(0) {
            return Err(Error::config("downmix_channels must be at least 1"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Audio
// ---------------------------------------------------------------------------

/// What the compiler does with an audio codec by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioClass {
    /// Muxed straight from the source.
    Keep,
    /// Stream-copied into its own file so the muxer re-frames it.
    Normalize,
    /// Re-encoded directly from the source.
    Recode,
    /// Decoded to a lossless intermediate, then re-encoded.
    LosslessIntermediate,
}

/// Lossy audio encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioEncoder {
    /// ffmpeg's native AAC encoder.
    #[default]
    Ffmpeg,
    /// Apple AAC through qaac; always reads a WAV intermediate.
    Qaac,
}

/// Audio classification sets and encoder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioPolicy {
    pub keep: Vec<Codec>,
    pub normalize: Vec<Codec>,
    pub recode: Vec<Codec>,
    pub lossless_intermediate: Vec<Codec>,
    pub encoder: AudioEncoder,
    /// Bitrate for the ffmpeg encoder.
    pub bitrate: String,
    /// Run a loudness normalization pass before encoding.
    pub loudnorm: bool,
}

impl Default for AudioPolicy {
    fn default() -> Self {
        Self {
            keep: vec![Codec::AacLc, Codec::AacHe, Codec::AacHeV2, Codec::Ac3, Codec::Eac3, Codec::Mp3],
            normalize: vec![Codec::Dts, Codec::DtsEs],
            recode: vec![Codec::Mp2, Codec::TrueHd, Codec::Opus, Codec::Vorbis],
            lossless_intermediate: vec![
                Codec::DtsHdMa,
                Codec::DtsHdHra,
                Codec::Flac,
                Codec::PcmS16le,
                Codec::PcmS24le,
            ],
            encoder: AudioEncoder::default(),
            bitrate: "256k".to_string(),
            loudnorm: false,
        }
    }
}

impl AudioPolicy {
    /// Classification of `codec`, if it appears in any set.
    pub fn class_of(&self, codec: Codec) -> Option<AudioClass> {
        [
            (&self.keep, AudioClass::Keep),
            (&self.normalize, AudioClass::Normalize),
            (&self.recode, AudioClass::Recode),
            (&self.lossless_intermediate, AudioClass::LosslessIntermediate),
        ]
        .into_iter()
        .find(|(set, _)| set.contains(&codec))
        .map(|(_, class)| class)
    }

    fn validate(&self) -> Result<()> {
        let all = self
            .keep
            .iter()
            .chain(&self.normalize)
            .chain(&self.recode)
            .chain(&self.lossless_intermediate);
        let mut seen: Vec<Codec> = Vec::new();
        for codec in all {
            if codec.kind() != CodecKind::Audio {
                return Err(Error::config(format!("{codec} is not an audio codec")));
            }
            if seen.contains(codec) {
                return Err(Error::config(format!(
                    "{codec} appears in more than one audio class"
                )));
            }
            seen.push(*codec);
        }
        if self.bitrate.trim().is_empty() {
            return Err(Error::config("audio bitrate must not be empty"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Tunable heuristic cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// A subtitle is forced when its count falls more than this fraction of
    /// the group maximum below that maximum.
    pub forced_caption_gap: f64,
    /// Largest relative duration difference from the video for full tracks.
    pub duration_tolerance: f64,
    /// Minimum detector confidence to accept a charset language guess.
    pub charset_confidence: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            forced_caption_gap: 0.5,
            duration_tolerance: 0.2,
            charset_confidence: 0.8,
        }
    }
}

impl Thresholds {
    fn validate(&self) -> Result<()> {
        let fractions = [
            ("forced_caption_gap", self.forced_caption_gap),
            ("duration_tolerance", self.duration_tolerance),
            ("charset_confidence", f64::from(self.charset_confidence)),
        ];
        for (name, value) in fractions {
            if !(value > 0.0 && value <= 1.0) {
                return Err(Error::config(format!(
                    "threshold {name} must be in (0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tools & paths
// ---------------------------------------------------------------------------

/// Optional overrides for external tool locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
    pub mediainfo_path: Option<PathBuf>,
    pub mkvmerge_path: Option<PathBuf>,
    pub qaac_path: Option<PathBuf>,
    pub bdsup2sub_path: Option<PathBuf>,
}

/// Working and output directories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory for intermediate files; the system temp dir when unset.
    pub temp_dir: Option<PathBuf>,
    /// Directory for finished files; next to the main file when unset.
    pub output_dir: Option<PathBuf>,
}
