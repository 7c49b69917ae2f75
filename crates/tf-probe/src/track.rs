//! Normalized tracks.
//!
//! A [`Track`] is created once from a [`ProbeRecord`] and afterwards only
//! mutated by enrichment (language, forced flag, charset, codec variant, CRF)
//! and by the resolver's relabeling of language and forced flag.

use serde::{Deserialize, Serialize};

use tf_core::{lang, Codec, ColorRange, Error, FieldOrder, QualifiedId, TrackType};

use crate::record::ProbeRecord;

/// Video-specific properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoProps {
    pub width: u32,
    pub height: u32,
    pub pixel_format: Option<String>,
    pub color_range: Option<ColorRange>,
    /// Matrix coefficients as tagged on the source (`bt709`, `smpte170m`, ...).
    pub color_space: Option<String>,
    pub field_order: Option<FieldOrder>,
    /// Rational frame rate, e.g. `25/1`.
    pub frame_rate: Option<String>,
    /// CRF recovered from a previous encode's settings.
    pub crf: Option<f32>,
}

/// Audio-specific properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioProps {
    pub channels: u32,
    pub sample_rate: Option<u32>,
}

/// One elementary stream of a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: QualifiedId,
    pub track_type: TrackType,
    pub codec: Codec,
    pub profile: Option<String>,
    pub level: Option<u32>,
    /// Table language code or `und`.
    pub language: String,
    pub name: String,
    /// `None` means not yet decided; only text subtitles start out that way.
    pub forced: Option<bool>,
    pub default: bool,
    pub duration: Option<f64>,
    pub frame_count: Option<u64>,
    pub caption_count: Option<u64>,
    /// Text encoding, subtitles only.
    pub encoding: Option<String>,
    pub video: Option<VideoProps>,
    pub audio: Option<AudioProps>,
}

impl Track {
    /// A bare track of `codec`'s type with every optional attribute unset.
    pub fn new(id: QualifiedId, codec: Codec) -> Self {
        let track_type = codec.kind().track_type();
        Self {
            id,
            track_type,
            codec,
            profile: None,
            level: None,
            language: lang::UNDETERMINED.to_string(),
            name: String::new(),
            forced: Some(false),
            default: false,
            duration: None,
            frame_count: None,
            caption_count: None,
            encoding: None,
            video: (track_type == TrackType::Video).then(VideoProps::default),
            audio: (track_type == TrackType::Audio).then(AudioProps::default),
        }
    }

    /// Normalize a probe record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedCodec`] if the codec id is not in the codec
    /// table or belongs to a different track type than the record claims.
    pub fn from_record(record: ProbeRecord) -> tf_core::Result<Self> {
        let codec = Codec::from_id(&record.codec_id)
            .filter(|c| c.kind().track_type() == record.track_type)
            .ok_or_else(|| Error::unsupported_codec(&record.codec_id, record.id.source()))?;

        let mut track = Track::new(record.id, codec);
        track.profile = record.codec_profile;
        track.level = record.level;
        track.language = lang::normalize(record.language.as_deref());
        track.name = record.name.unwrap_or_default();
        track.forced = Some(record.disposition_forced);
        track.default = record.disposition_default;
        track.duration = record.duration_tag.as_deref().and_then(parse_duration_tag);
        track.frame_count = record.frame_count;
        track.caption_count = record.caption_count;

        if let Some(video) = track.video.as_mut() {
            video.width = record.width.unwrap_or(0);
            video.height = record.height.unwrap_or(0);
            video.pixel_format = record.pixel_format;
            video.color_range = record.color_range.as_deref().and_then(ColorRange::parse);
            video.color_space = record.color_space.filter(|s| s != "unknown");
            video.field_order = record.field_order.as_deref().and_then(FieldOrder::parse);
            video.frame_rate = record.frame_rate;
        }
        if let Some(audio) = track.audio.as_mut() {
            audio.channels = record.channels.unwrap_or(2);
            audio.sample_rate = record.sample_rate;
        }
        Ok(track)
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = lang::normalize(Some(language));
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_forced(mut self, forced: Option<bool>) -> Self {
        self.forced = forced;
        self
    }

    pub fn with_default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_frame_count(mut self, count: u64) -> Self {
        self.frame_count = Some(count);
        self
    }

    pub fn with_caption_count(mut self, count: u64) -> Self {
        self.caption_count = Some(count);
        self
    }

    pub fn with_video(mut self, video: VideoProps) -> Self {
        self.video = Some(video);
        self
    }

    pub fn with_channels(mut self, channels: u32) -> Self {
        self.audio = Some(AudioProps {
            channels,
            sample_rate: self.audio.and_then(|a| a.sample_rate),
        });
        self
    }

    /// Channel count for audio tracks.
    pub fn channels(&self) -> Option<u32> {
        self.audio.map(|a| a.channels)
    }

    /// Whether the name marks this as a commentary track.
    pub fn is_commentary(&self) -> bool {
        let name = self.name.to_lowercase();
        name.contains("comment") || name.contains("коммент")
    }
}

/// Parse a Matroska `DURATION` tag (`01:52:03.125000000`) into seconds.
pub fn parse_duration_tag(tag: &str) -> Option<f64> {
    let mut parts = tag.trim().split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}
