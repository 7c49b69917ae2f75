//! Unified error type for the trackforge workspace.
//!
//! All crates funnel their failures into [`Error`], which carries enough
//! context for the batch processor to decide, via [`Error::scope`], whether a
//! failure ends the current movie or the whole run.

use std::fmt;
use std::path::PathBuf;

use crate::media::TrackType;

/// How far a failure propagates through a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// The current movie is abandoned; the batch continues with the next one.
    Movie,
    /// The whole run stops.
    Run,
}

/// Unified error type covering all failure modes in trackforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Conflicting or out-of-range policy settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Two probe records claimed the same qualified id.
    #[error("Duplicate track id: {0}")]
    DuplicateTrack(String),

    /// The catalog violates a structural invariant (e.g. two chapters files).
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A movie must contain exactly one video track.
    #[error("Expected exactly one video track, found {found}")]
    MissingVideo {
        /// Number of video tracks actually present.
        found: usize,
    },

    /// A mandatory wanted-track slot had no candidates.
    #[error("Required {track_type} track not found: language {language}, {}", forced_label(.forced))]
    TrackNotFound {
        /// Track type of the slot.
        track_type: TrackType,
        /// Requested language code.
        language: String,
        /// Forced-class of the slot.
        forced: bool,
    },

    /// Several candidates matched and nobody was available to choose.
    #[error("Ambiguous {track_type} track for language {language}: candidates {candidates}")]
    Ambiguous {
        /// Track type of the slot.
        track_type: TrackType,
        /// Requested language code.
        language: String,
        /// Comma-separated candidate ids.
        candidates: String,
    },

    /// A codec string has no entry in the codec table.
    #[error("Unsupported codec '{codec}' in {}", .source_file.display())]
    UnsupportedCodec {
        /// Raw codec id as reported by the probe.
        codec: String,
        /// File the track came from.
        source_file: PathBuf,
    },

    /// The source colorspace differs from the derived target.
    #[error("Colorspace conversion from {found} to {target} is not implemented")]
    ColorspaceConversion {
        /// Colorspace tagged on the source.
        found: String,
        /// Colorspace derived from height and frame rate.
        target: String,
    },

    /// Deinterlace decision needs a field order nobody could supply.
    #[error("Field order of {track} is unknown and cannot be asked")]
    FieldOrderUndetermined {
        /// Display form of the video track id.
        track: String,
    },

    /// Source characteristics the compiler cannot handle.
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// A question was asked with no interactive channel available.
    #[error("No answer available for: {question}")]
    Unanswered {
        /// The question text.
        question: String,
    },

    /// The user aborted an interactive prompt.
    #[error("Cancelled by user")]
    Cancelled,

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An external tool (ffprobe, mediainfo, etc.) returned an error.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// Media probing failed.
    #[error("Probe error: {0}")]
    Probe(String),
}

fn forced_label(forced: &bool) -> &'static str {
    if *forced {
        "forced"
    } else {
        "full"
    }
}

impl Error {
    /// Classify how far this error propagates in a batch run.
    pub fn scope(&self) -> ErrorScope {
        match self {
            Error::Configuration(_) | Error::Cancelled => ErrorScope::Run,
            _ => ErrorScope::Movie,
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Configuration`].
    pub fn config(message: impl fmt::Display) -> Self {
        Error::Configuration(message.to_string())
    }

    /// Convenience constructor for [`Error::TrackNotFound`].
    pub fn track_not_found(track_type: TrackType, language: impl Into<String>, forced: bool) -> Self {
        Error::TrackNotFound {
            track_type,
            language: language.into(),
            forced,
        }
    }

    /// Convenience constructor for [`Error::UnsupportedCodec`].
    pub fn unsupported_codec(codec: impl Into<String>, source_file: impl Into<PathBuf>) -> Self {
        Error::UnsupportedCodec {
            codec: codec.into(),
            source_file: source_file.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
