//! Transcode plan types.
//!
//! A [`Plan`] is everything the emitter needs to know about one movie. The
//! emitter does not look at the catalog again, so every parameter that
//! shapes a command is recorded here.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tf_core::{ColorRange, ColorSpace, CropRect, QualifiedId, TrackType, Tune};

/// What happens to a selected track before it is muxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackAction {
    /// Muxed straight from its source file.
    PassThrough,
    /// Copied or converted into a file of its own without re-encoding.
    Extract,
    /// Re-encoded.
    Recode,
}

impl fmt::Display for TrackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PassThrough => write!(f, "pass-through"),
            Self::Extract => write!(f, "extract"),
            Self::Recode => write!(f, "recode"),
        }
    }
}

// ---------------------------------------------------------------------------
// Video
// ---------------------------------------------------------------------------

/// One entry of the video filter chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "filter", content = "value", rename_all = "snake_case")]
pub enum VideoFilter {
    Deinterlace { parity: u8 },
    Crop(CropRect),
    Aspect(String),
    Scale(String),
}

impl fmt::Display for VideoFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deinterlace { parity } => write!(f, "yadif=1:-1:{parity}"),
            Self::Crop(rect) => write!(f, "crop={rect}"),
            Self::Aspect(dar) => write!(f, "setdar=dar={dar}"),
            Self::Scale(size) => write!(f, "scale={size}"),
        }
    }
}

/// x264 encode parameters for the video track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoEncode {
    pub tune: Tune,
    pub crf: u8,
    /// In application order: deinterlace, crop, aspect, scale.
    pub filters: Vec<VideoFilter>,
    pub source_range: ColorRange,
    pub color_space: ColorSpace,
}

// ---------------------------------------------------------------------------
// Audio
// ---------------------------------------------------------------------------

/// Lossy audio encoder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "encoder", rename_all = "lowercase")]
pub enum AudioEncode {
    /// Apple AAC through qaac at a true-VBR quality.
    Qaac { tvbr: u8 },
    /// ffmpeg's native AAC encoder at a fixed bitrate.
    Ffmpeg { bitrate: String },
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// One external operation in a track's chain.
///
/// Every operation reads either a stream of a container (`input` plus
/// `stream`) or a whole intermediate file produced by the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Re-encode a video stream with x264.
    EncodeVideo {
        input: PathBuf,
        stream: u32,
        output: PathBuf,
        encode: VideoEncode,
    },
    /// Copy one stream into its own file.
    CopyStream {
        input: PathBuf,
        stream: u32,
        output: PathBuf,
    },
    /// Decode one audio stream to WAV, optionally downmixing.
    DecodeAudio {
        input: PathBuf,
        stream: u32,
        output: PathBuf,
        channels: Option<u32>,
    },
    /// Loudness-normalize a WAV file.
    Loudnorm { input: PathBuf, output: PathBuf },
    /// Encode audio to AAC, from a WAV file (`stream` is `None`) or straight
    /// from a container stream.
    EncodeAudio {
        input: PathBuf,
        stream: Option<u32>,
        output: PathBuf,
        channels: Option<u32>,
        encode: AudioEncode,
    },
    /// Convert a text subtitle stream to SubRip.
    ConvertSubtitle {
        input: PathBuf,
        stream: u32,
        output: PathBuf,
    },
    /// Convert a PGS `.sup` file to a VobSub `.idx`/`.sub` pair.
    BitmapToVobSub {
        input: PathBuf,
        output: PathBuf,
        language: String,
    },
}

/// An operation plus the files it brings into existence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub operation: Operation,
    pub creates: Vec<PathBuf>,
}

impl Step {
    pub fn new(operation: Operation, creates: Vec<PathBuf>) -> Self {
        Self { operation, creates }
    }
}

// ---------------------------------------------------------------------------
// Tracks and plans
// ---------------------------------------------------------------------------

/// Where the muxer reads a track from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MuxSource {
    pub path: PathBuf,
    /// Stream index inside `path`.
    pub stream: u32,
}

/// The compiled decision for one selected track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackPlan {
    pub id: QualifiedId,
    pub track_type: TrackType,
    pub action: TrackAction,
    pub language: String,
    pub forced: bool,
    /// First track of its type in the output.
    pub default: bool,
    /// Character set the muxer must read a text subtitle with.
    pub charset: Option<String>,
    pub steps: Vec<Step>,
    pub source: MuxSource,
    /// Files the muxer consumes besides `source.path` (a VobSub `.sub`).
    pub companions: Vec<PathBuf>,
}

impl TrackPlan {
    /// A track muxed from where it already is.
    pub fn pass_through(id: QualifiedId, track_type: TrackType) -> Self {
        let source = MuxSource {
            path: id.source().to_path_buf(),
            stream: id.index(),
        };
        Self {
            id,
            track_type,
            action: TrackAction::PassThrough,
            language: tf_core::lang::UNDETERMINED.to_string(),
            forced: false,
            default: false,
            charset: None,
            steps: Vec::new(),
            source,
            companions: Vec::new(),
        }
    }

    /// Temp files read by the muxer; they live until the mux succeeds.
    pub fn mux_files(&self) -> Vec<&Path> {
        if self.action == TrackAction::PassThrough {
            return Vec::new();
        }
        std::iter::once(self.source.path.as_path())
            .chain(self.companions.iter().map(PathBuf::as_path))
            .collect()
    }

    /// Temp files only needed inside this track's chain.
    pub fn intermediates(&self) -> Vec<&Path> {
        let mux = self.mux_files();
        self.steps
            .iter()
            .flat_map(|s| s.creates.iter().map(PathBuf::as_path))
            .filter(|p| !mux.contains(p))
            .collect()
    }
}

/// The compiled plan for one movie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    /// The movie's main file.
    pub main_file: PathBuf,
    /// Every source file of the movie, main file first.
    pub sources: Vec<PathBuf>,
    /// Tracks in output order: video, audio, subtitles.
    pub tracks: Vec<TrackPlan>,
    /// Chapters file passed to the muxer, if any.
    pub chapters: Option<PathBuf>,
    /// Temp name the muxer writes to.
    pub mux_output: PathBuf,
    /// Final path the muxed file is promoted to.
    pub target: PathBuf,
}

impl Plan {
    pub fn video(&self) -> Option<&TrackPlan> {
        self.tracks.iter().find(|t| t.track_type == TrackType::Video)
    }

    pub fn of_type(&self, track_type: TrackType) -> impl Iterator<Item = &TrackPlan> {
        self.tracks.iter().filter(move |t| t.track_type == track_type)
    }

    /// Nothing is transformed and the movie is a single file.
    pub fn is_unchanged(&self) -> bool {
        self.sources.len() == 1
            && self
                .tracks
                .iter()
                .all(|t| t.action == TrackAction::PassThrough)
    }
}
