//! Media-domain enums for track types, colorimetry, field order, and encode tunes.
//!
//! All enums serialize in lowercase (via `serde(rename_all = "lowercase")`) and
//! implement `Display` manually for consistent string representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

// ---------------------------------------------------------------------------
// TrackType
// ---------------------------------------------------------------------------

/// Kind of elementary stream. The declaration order is the mux order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    Video,
    Audio,
    Subtitle,
    Chapters,
}

impl TrackType {
    /// All track types in mux order.
    pub const ALL: [TrackType; 4] = [
        TrackType::Video,
        TrackType::Audio,
        TrackType::Subtitle,
        TrackType::Chapters,
    ];

    /// Capitalized label used in prompts and reports.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Subtitle => "Subtitle",
            Self::Chapters => "Chapters",
        }
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
            Self::Subtitle => write!(f, "subtitle"),
            Self::Chapters => write!(f, "chapters"),
        }
    }
}

impl FromStr for TrackType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "subtitle" | "subtitles" => Ok(Self::Subtitle),
            "chapters" => Ok(Self::Chapters),
            other => Err(Error::config(format!("unknown track type '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// ColorSpace
// ---------------------------------------------------------------------------

/// Target colorspace for an encode, named after ffmpeg's matrix coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    /// BT.709, used for HD sources.
    Bt709,
    /// BT.601 with PAL primaries.
    Bt470bg,
    /// BT.601 with NTSC primaries.
    Smpte170m,
}

impl ColorSpace {
    /// Value for ffmpeg's `-colorspace`.
    pub fn matrix(&self) -> &'static str {
        match self {
            Self::Bt709 => "bt709",
            Self::Bt470bg => "bt470bg",
            Self::Smpte170m => "smpte170m",
        }
    }

    /// Value for ffmpeg's `-color_primaries`.
    pub fn primaries(&self) -> &'static str {
        self.matrix()
    }

    /// Value for ffmpeg's `-color_trc`.
    pub fn transfer(&self) -> &'static str {
        match self {
            Self::Bt709 => "bt709",
            Self::Bt470bg => "gamma28",
            Self::Smpte170m => "smpte170m",
        }
    }

    /// Derive the target colorspace from frame height and field-rate standard.
    ///
    /// Returns `None` for SD sources whose standard is unknown.
    pub fn for_source(height: u32, standard: Option<FpsStandard>) -> Option<Self> {
        if height >= 720 {
            return Some(Self::Bt709);
        }
        match standard? {
            FpsStandard::Pal => Some(Self::Bt470bg),
            FpsStandard::Ntsc => Some(Self::Smpte170m),
        }
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.matrix())
    }
}

// ---------------------------------------------------------------------------
// ColorRange
// ---------------------------------------------------------------------------

/// Sample value range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorRange {
    /// Limited range.
    Tv,
    /// Full range.
    Pc,
}

impl ColorRange {
    /// Parse ffprobe's `color_range` value.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "tv" | "mpeg" => Some(Self::Tv),
            "pc" | "jpeg" => Some(Self::Pc),
            _ => None,
        }
    }
}

impl fmt::Display for ColorRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tv => write!(f, "tv"),
            Self::Pc => write!(f, "pc"),
        }
    }
}

// ---------------------------------------------------------------------------
// FieldOrder
// ---------------------------------------------------------------------------

/// Scan type of a video track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldOrder {
    Progressive,
    /// Interlaced, top field first.
    #[serde(rename = "tt")]
    TopFirst,
    /// Interlaced, bottom field first.
    #[serde(rename = "bb")]
    BottomFirst,
}

impl FieldOrder {
    /// All field orders, in the order they are offered to the user.
    pub const ALL: [FieldOrder; 3] = [Self::Progressive, Self::TopFirst, Self::BottomFirst];

    /// Parse ffprobe's `field_order` value. Mixed orders are treated as unknown.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "progressive" => Some(Self::Progressive),
            "tt" => Some(Self::TopFirst),
            "bb" => Some(Self::BottomFirst),
            _ => None,
        }
    }

    /// yadif parity argument, or `None` when no deinterlacing is needed.
    pub fn yadif_parity(&self) -> Option<u8> {
        match self {
            Self::Progressive => None,
            Self::TopFirst => Some(0),
            Self::BottomFirst => Some(1),
        }
    }
}

impl fmt::Display for FieldOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Progressive => write!(f, "progressive"),
            Self::TopFirst => write!(f, "tt"),
            Self::BottomFirst => write!(f, "bb"),
        }
    }
}

// ---------------------------------------------------------------------------
// FpsStandard
// ---------------------------------------------------------------------------

/// Broadcast standard inferred from a source frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FpsStandard {
    Ntsc,
    Pal,
}

const NTSC_RATES: &[&str] = &["13978/583", "24000/1001", "2997/125", "30000/1001"];
const PAL_RATES: &[&str] = &["20327/813", "20877/835", "25/1", "29976/1199"];

impl FpsStandard {
    /// Classify an ffprobe rational frame rate such as `24000/1001`.
    pub fn from_rate(rate: &str) -> Option<Self> {
        if NTSC_RATES.contains(&rate) {
            Some(Self::Ntsc)
        } else if PAL_RATES.contains(&rate) {
            Some(Self::Pal)
        } else {
            None
        }
    }
}

impl fmt::Display for FpsStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ntsc => write!(f, "ntsc"),
            Self::Pal => write!(f, "pal"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tune
// ---------------------------------------------------------------------------

/// Quality preset for x264 encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tune {
    Animation,
    Film,
    Trash,
    Supertrash,
}

impl Tune {
    /// All tunes, in the order they are offered to the user.
    pub const ALL: [Tune; 4] = [Self::Animation, Self::Film, Self::Trash, Self::Supertrash];

    /// Constant rate factor used for this tune.
    pub fn crf(&self) -> u8 {
        match self {
            Self::Animation => 18,
            Self::Film => 22,
            Self::Trash => 23,
            Self::Supertrash => 25,
        }
    }

    /// Value passed to x264's `-tune`.
    pub fn x264_tune(&self) -> &'static str {
        match self {
            Self::Animation => "animation",
            Self::Film | Self::Trash | Self::Supertrash => "film",
        }
    }
}

impl fmt::Display for Tune {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Animation => write!(f, "animation"),
            Self::Film => write!(f, "film"),
            Self::Trash => write!(f, "trash"),
            Self::Supertrash => write!(f, "supertrash"),
        }
    }
}

impl FromStr for Tune {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tune::ALL
            .into_iter()
            .find(|t| t.to_string() == s.to_ascii_lowercase())
            .ok_or_else(|| Error::config(format!("unknown tune '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// CropRect
// ---------------------------------------------------------------------------

/// A crop window in source pixels, written `w:h:x:y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CropRect {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

impl CropRect {
    pub fn new(width: u32, height: u32, x: u32, y: u32) -> Self {
        Self {
            width,
            height,
            x,
            y,
        }
    }

    /// Whether this window covers the whole `width`x`height` frame.
    pub fn is_full_frame(&self, width: u32, height: u32) -> bool {
        self.x == 0 && self.y == 0 && self.width == width && self.height == height
    }

    /// Whether the encoder's macroblock constraints (width % 16, height % 8)
    /// hold.
    pub fn is_aligned(&self) -> bool {
        self.width % 16 == 0 && self.height % 8 == 0
    }

    /// Shrink to the nearest aligned size, moving the origin by half the
    /// discarded amount (rounded up) so the window stays centered.
    pub fn corrected(&self) -> Self {
        let dw = self.width % 16;
        let dh = self.height % 8;
        Self {
            width: self.width - dw,
            height: self.height - dh,
            x: self.x + dw.div_ceil(2),
            y: self.y + dh.div_ceil(2),
        }
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

impl FromStr for CropRect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<u32> = s
            .trim()
            .split(':')
            .map(|p| p.parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|e| Error::config(format!("invalid crop '{s}': {e}")))?;

        match parts.as_slice() {
            [w, h, x, y] if *w > 0 && *h > 0 => Ok(Self::new(*w, *h, *x, *y)),
            _ => Err(Error::config(format!("invalid crop '{s}': expected w:h:x:y"))),
        }
    }
}

impl TryFrom<String> for CropRect {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CropRect> for String {
    fn from(value: CropRect) -> Self {
        value.to_string()
    }
}
