//! The closed codec table.
//!
//! Every codec trackforge knows how to handle is a [`Codec`] variant, and
//! [`Codec::props`] is an exhaustive match, so adding a variant without its
//! properties fails to compile. Raw probe ids are resolved through
//! [`Codec::from_id`]; anything missing from the table is rejected as
//! [`Error::UnsupportedCodec`](crate::Error::UnsupportedCodec) by the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Error;
use crate::media::TrackType;

/// Broad family of a codec, deciding which plan branch handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    Video,
    Audio,
    /// Timed text (SubRip, ASS/SSA).
    TextSubtitle,
    /// Bitmap subtitles (PGS, VobSub).
    ImageSubtitle,
    Chapters,
}

impl CodecKind {
    /// Track type carrying codecs of this kind.
    pub fn track_type(&self) -> TrackType {
        match self {
            Self::Video => TrackType::Video,
            Self::Audio => TrackType::Audio,
            Self::TextSubtitle | Self::ImageSubtitle => TrackType::Subtitle,
            Self::Chapters => TrackType::Chapters,
        }
    }
}

/// Static properties of one codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecProps {
    /// Canonical id: ffprobe `codec_name`, plus the normalized profile for audio.
    pub id: &'static str,
    /// Human-readable name shown in prompts.
    pub name: &'static str,
    /// File extension used when the stream is extracted as-is.
    pub extension: &'static str,
    pub kind: CodecKind,
    /// The terse probe cannot tell this codec from an extended variant;
    /// richer per-track metadata must be consulted.
    pub variant_probe: bool,
}

/// Every supported codec. Serialized as its canonical id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Codec {
    H264,
    Hevc,
    Mpeg2Video,
    Mpeg4,
    Vc1,
    AacLc,
    AacHe,
    AacHeV2,
    Ac3,
    Eac3,
    Dts,
    DtsEs,
    DtsHdMa,
    DtsHdHra,
    TrueHd,
    Flac,
    Mp2,
    Mp3,
    PcmS16le,
    PcmS24le,
    Opus,
    Vorbis,
    Subrip,
    Ass,
    Ssa,
    Pgs,
    DvdSub,
    Chapters,
}

/// Probe ids that resolve to a codec without being its canonical id.
const ALIASES: &[(&str, Codec)] = &[
    ("aac", Codec::AacLc),
    ("dts_dts", Codec::Dts),
    ("dts_dts_96_24", Codec::Dts),
    ("dts_dts_es", Codec::DtsEs),
    ("srt", Codec::Subrip),
    ("text", Codec::Subrip),
    ("mov_text", Codec::Subrip),
];

impl Codec {
    /// All codecs, in table order.
    pub const ALL: [Codec; 28] = [
        Codec::H264,
        Codec::Hevc,
        Codec::Mpeg2Video,
        Codec::Mpeg4,
        Codec::Vc1,
        Codec::AacLc,
        Codec::AacHe,
        Codec::AacHeV2,
        Codec::Ac3,
        Codec::Eac3,
        Codec::Dts,
        Codec::DtsEs,
        Codec::DtsHdMa,
        Codec::DtsHdHra,
        Codec::TrueHd,
        Codec::Flac,
        Codec::Mp2,
        Codec::Mp3,
        Codec::PcmS16le,
        Codec::PcmS24le,
        Codec::Opus,
        Codec::Vorbis,
        Codec::Subrip,
        Codec::Ass,
        Codec::Ssa,
        Codec::Pgs,
        Codec::DvdSub,
        Codec::Chapters,
    ];

    /// Properties of this codec.
    pub const fn props(self) -> CodecProps {
        use CodecKind::*;
        let (id, name, extension, kind, variant_probe) = match self {
            Codec::H264 => ("h264", "H.264/AVC", "h264", Video, false),
            Codec::Hevc => ("hevc", "H.265/HEVC", "hevc", Video, false),
            Codec::Mpeg2Video => ("mpeg2video", "MPEG-2 Video", "m2v", Video, false),
            Codec::Mpeg4 => ("mpeg4", "MPEG-4 Visual", "m4v", Video, false),
            Codec::Vc1 => ("vc1", "VC-1", "vc1", Video, false),
            Codec::AacLc => ("aac_lc", "AAC LC", "aac", Audio, false),
            Codec::AacHe => ("aac_he_aac", "HE-AAC", "aac", Audio, false),
            Codec::AacHeV2 => ("aac_he_aacv2", "HE-AACv2", "aac", Audio, false),
            Codec::Ac3 => ("ac3", "Dolby Digital", "ac3", Audio, false),
            Codec::Eac3 => ("eac3", "Dolby Digital Plus", "eac3", Audio, false),
            Codec::Dts => ("dts", "DTS", "dts", Audio, true),
            Codec::DtsEs => ("dts_es", "DTS-ES", "dts", Audio, false),
            Codec::DtsHdMa => ("dts_dts_hd_ma", "DTS-HD MA", "dts", Audio, false),
            Codec::DtsHdHra => ("dts_dts_hd_hra", "DTS-HD HRA", "dts", Audio, false),
            Codec::TrueHd => ("truehd", "Dolby TrueHD", "thd", Audio, false),
            Codec::Flac => ("flac", "FLAC", "flac", Audio, false),
            Codec::Mp2 => ("mp2", "MPEG Layer 2", "mp2", Audio, false),
            Codec::Mp3 => ("mp3", "MPEG Layer 3", "mp3", Audio, false),
            Codec::PcmS16le => ("pcm_s16le", "PCM 16-bit", "wav", Audio, false),
            Codec::PcmS24le => ("pcm_s24le", "PCM 24-bit", "wav", Audio, false),
            Codec::Opus => ("opus", "Opus", "opus", Audio, false),
            Codec::Vorbis => ("vorbis", "Vorbis", "ogg", Audio, false),
            Codec::Subrip => ("subrip", "SubRip", "srt", TextSubtitle, false),
            Codec::Ass => ("ass", "Advanced SubStation Alpha", "ass", TextSubtitle, false),
            Codec::Ssa => ("ssa", "SubStation Alpha", "ssa", TextSubtitle, false),
            Codec::Pgs => ("hdmv_pgs_subtitle", "PGS", "sup", ImageSubtitle, false),
            Codec::DvdSub => ("dvd_subtitle", "VobSub", "sub", ImageSubtitle, false),
            Codec::Chapters => ("chapters", "Chapters", "txt", Chapters, false),
        };
        CodecProps {
            id,
            name,
            extension,
            kind,
            variant_probe,
        }
    }

    /// Resolve a normalized probe id (see [`Codec::probe_id`]) to a codec.
    pub fn from_id(id: &str) -> Option<Codec> {
        Codec::ALL
            .into_iter()
            .find(|c| c.props().id == id)
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == id)
                    .map(|(_, codec)| *codec)
            })
    }

    /// Build the normalized probe id from a raw codec name and optional profile.
    ///
    /// Audio codecs carry their profile as a suffix (`aac` + `LC` becomes
    /// `aac_lc`, `dts` + `DTS-HD MA` becomes `dts_dts_hd_ma`); the result is
    /// lowercased with dashes, spaces and slashes mapped to underscores.
    pub fn probe_id(codec_name: &str, profile: Option<&str>) -> String {
        let raw = match profile.filter(|p| !p.is_empty() && *p != "unknown") {
            Some(profile) => format!("{codec_name}_{profile}"),
            None => codec_name.to_string(),
        };
        raw.to_lowercase().replace(['-', ' ', '/'], "_")
    }

    pub fn name(&self) -> &'static str {
        self.props().name
    }

    pub fn extension(&self) -> &'static str {
        self.props().extension
    }

    pub fn kind(&self) -> CodecKind {
        self.props().kind
    }

    pub fn is_text_subtitle(&self) -> bool {
        self.kind() == CodecKind::TextSubtitle
    }

    pub fn is_image_subtitle(&self) -> bool {
        self.kind() == CodecKind::ImageSubtitle
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.props().id)
    }
}

impl TryFrom<String> for Codec {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Codec::from_id(&value).ok_or_else(|| Error::config(format!("unknown codec '{value}'")))
    }
}

impl From<Codec> for String {
    fn from(value: Codec) -> Self {
        value.props().id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<&str> = Codec::ALL.iter().map(|c| c.props().id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), Codec::ALL.len());
    }

    #[test]
    fn every_codec_round_trips_through_its_id() {
        for codec in Codec::ALL {
            assert_eq!(Codec::from_id(codec.props().id), Some(codec));
        }
    }

    #[test]
    fn probe_id_appends_profile() {
        assert_eq!(Codec::probe_id("aac", Some("LC")), "aac_lc");
        assert_eq!(Codec::probe_id("aac", Some("HE-AAC")), "aac_he_aac");
        assert_eq!(Codec::probe_id("dts", Some("DTS-HD MA")), "dts_dts_hd_ma");
        assert_eq!(Codec::probe_id("dts", Some("DTS 96/24")), "dts_dts_96_24");
        assert_eq!(Codec::probe_id("ac3", None), "ac3");
        assert_eq!(Codec::probe_id("ac3", Some("unknown")), "ac3");
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(Codec::from_id("dts_dts"), Some(Codec::Dts));
        assert_eq!(Codec::from_id("dts_dts_es"), Some(Codec::DtsEs));
        assert_eq!(Codec::from_id("aac"), Some(Codec::AacLc));
        assert_eq!(Codec::from_id("cook"), None);
    }

    #[test]
    fn kinds_map_to_track_types() {
        assert_eq!(Codec::Pgs.kind().track_type(), TrackType::Subtitle);
        assert!(Codec::Ass.is_text_subtitle());
        assert!(Codec::DvdSub.is_image_subtitle());
        assert_eq!(Codec::Flac.kind().track_type(), TrackType::Audio);
    }

    #[test]
    fn serde_uses_canonical_id() {
        let json = serde_json::to_string(&Codec::DtsHdMa).unwrap();
        assert_eq!(json, "\"dts_dts_hd_ma\"");
        let codec: Codec = serde_json::from_str("\"aac_he_aac\"").unwrap();
        assert_eq!(codec, Codec::AacHe);
        assert!(serde_json::from_str::<Codec>("\"cook\"").is_err());
    }

    #[test]
    fn only_base_dts_needs_variant_probe() {
        let probed: Vec<Codec> = Codec::ALL
            .into_iter()
            .filter(|c| c.props().variant_probe)
            .collect();
        assert_eq!(probed, vec![Codec::Dts]);
    }
}
