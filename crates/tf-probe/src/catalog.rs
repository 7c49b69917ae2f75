//! The per-movie track catalog.
//!
//! A [`Catalog`] owns every track of one logical movie, across the main file
//! and its satellites. Tracks are kept in a deterministic order: main file
//! first, satellites by numeric-aware name comparison, then by stream index.
//! Outside this crate the only permitted mutation is [`Catalog::relabel`].

use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tf_core::{Error, QualifiedId, Result, TrackType};

use crate::record::ProbedFile;
use crate::track::Track;

/// All tracks of one logical movie.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    main: PathBuf,
    files: Vec<PathBuf>,
    tracks: Vec<Track>,
}

impl Catalog {
    /// Build a catalog from tracks that are already normalized.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateTrack`] if two tracks share a qualified id.
    /// - [`Error::InvalidCatalog`] if more than one chapters track exists.
    pub fn new(main: impl Into<PathBuf>, tracks: Vec<Track>) -> Result<Self> {
        let main = main.into();

        let mut seen = HashSet::new();
        for track in &tracks {
            if !seen.insert(&track.id) {
                return Err(Error::DuplicateTrack(track.id.to_string()));
            }
        }

        let chapters = tracks
            .iter()
            .filter(|t| t.track_type == TrackType::Chapters)
            .count();
        if chapters > 1 {
            return Err(Error::InvalidCatalog(format!(
                "{chapters} chapters tracks in {}",
                main.display()
            )));
        }

        let mut files: Vec<PathBuf> = Vec::new();
        for track in &tracks {
            if !files.iter().any(|f| f == track.id.source()) {
                files.push(track.id.source().to_path_buf());
            }
        }
        files.sort_by(|a, b| file_order(&main, a, b));

        let mut tracks = tracks;
        tracks.sort_by_key(|t| (file_position(&files, t.id.source()), t.id.index()));

        Ok(Self {
            main,
            files,
            tracks,
        })
    }

    /// Normalize the probe output of every file of a movie.
    ///
    /// Text subtitles that are the only stream of their file carry no
    /// container disposition, so their forced state starts out unknown unless
    /// the probe explicitly flagged them.
    ///
    /// # Errors
    ///
    /// Everything [`Track::from_record`] and [`Catalog::new`] can return.
    pub fn from_probes(main: &Path, probes: Vec<ProbedFile>) -> Result<Self> {
        let tracks = probes
            .into_iter()
            .flat_map(|file| file.records)
            .map(Track::from_record)
            .collect::<Result<Vec<_>>>()?;

        let mut catalog = Self::new(main, tracks)?;
        let undecided: Vec<QualifiedId> = catalog
            .tracks
            .iter()
            .filter(|t| t.codec.is_text_subtitle() && t.forced == Some(false))
            .filter(|t| catalog.is_sole_track(&t.id))
            .map(|t| t.id.clone())
            .collect();
        for id in undecided {
            if let Some(track) = catalog.track_mut(&id) {
                track.forced = None;
            }
        }
        Ok(catalog)
    }

    /// The main (video-bearing) file.
    pub fn main_file(&self) -> &Path {
        &self.main
    }

    /// Every file contributing tracks, main file first.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// All tracks in catalog order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, id: &QualifiedId) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.id == id)
    }

    pub(crate) fn track_mut(&mut self, id: &QualifiedId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| &t.id == id)
    }

    pub(crate) fn tracks_mut(&mut self) -> impl Iterator<Item = &mut Track> {
        self.tracks.iter_mut()
    }

    /// Tracks of one type, in catalog order.
    pub fn of_type(&self, track_type: TrackType) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(move |t| t.track_type == track_type)
    }

    /// Zero-based position of a track among the tracks of its type.
    pub fn index_in_type(&self, id: &QualifiedId) -> Option<usize> {
        let track = self.track(id)?;
        self.of_type(track.track_type).position(|t| &t.id == id)
    }

    /// The single video track.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingVideo`] unless exactly one video track exists.
    pub fn video(&self) -> Result<&Track> {
        let mut videos = self.of_type(TrackType::Video);
        match (videos.next(), videos.next()) {
            (Some(video), None) => Ok(video),
            _ => Err(Error::MissingVideo {
                found: self.of_type(TrackType::Video).count(),
            }),
        }
    }

    /// The chapters track, if any.
    pub fn chapters(&self) -> Option<&Track> {
        self.of_type(TrackType::Chapters).next()
    }

    /// Duration of the video track, used to reject mismatched full tracks.
    pub fn reference_duration(&self) -> Option<f64> {
        self.video().ok().and_then(|v| v.duration)
    }

    /// Number of tracks contributed by `path`.
    pub fn file_track_count(&self, path: &Path) -> usize {
        self.tracks.iter().filter(|t| t.id.source() == path).count()
    }

    /// Whether the track is the only stream of its file.
    pub fn is_sole_track(&self, id: &QualifiedId) -> bool {
        self.file_track_count(id.source()) == 1
    }

    /// Overwrite a track's language and forced state after resolution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCatalog`] if the id is not in this catalog.
    pub fn relabel(&mut self, id: &QualifiedId, language: &str, forced: bool) -> Result<()> {
        let track = self
            .track_mut(id)
            .ok_or_else(|| Error::InvalidCatalog(format!("unknown track {id}")))?;
        track.language = language.to_string();
        track.forced = Some(forced);
        Ok(())
    }
}

fn file_position(files: &[PathBuf], path: &Path) -> usize {
    files.iter().position(|f| f == path).unwrap_or(files.len())
}

fn file_order(main: &Path, a: &Path, b: &Path) -> Ordering {
    match (a == main, b == main) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()),
    }
}

/// Compare strings treating runs of digits as numbers, so `Part 2` sorts
/// before `Part 10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a.chars().peekable(), b.chars().peekable());
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let na = take_number(&mut a);
                let nb = take_number(&mut b);
                let ord = na
                    .trim_start_matches('0')
                    .len()
                    .cmp(&nb.trim_start_matches('0').len())
                    .then_with(|| na.trim_start_matches('0').cmp(nb.trim_start_matches('0')));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ProbeRecord;
    use tf_core::Codec;

    fn id(file: &str, index: u32) -> QualifiedId {
        QualifiedId::new(file, index)
    }

    fn sample() -> Catalog {
        Catalog::new(
            "/m/Heat.mkv",
            vec![
                Track::new(id("/m/Heat.rus.srt", 0), Codec::Subrip),
                Track::new(id("/m/Heat.mkv", 1), Codec::Ac3),
                Track::new(id("/m/Heat.mkv", 0), Codec::H264).with_duration(6000.0),
                Track::new(id("/m/Heat.eng.srt", 0), Codec::Subrip),
                Track::new(id("/m/Heat.mkv", 2), Codec::Pgs),
            ],
        )
        .unwrap()
    }

    #[test]
    fn main_file_first_then_satellites() {
        let catalog = sample();
        assert_eq!(
            catalog.files(),
            &[
                PathBuf::from("/m/Heat.mkv"),
                PathBuf::from("/m/Heat.eng.srt"),
                PathBuf::from("/m/Heat.rus.srt"),
            ]
        );
        assert_eq!(catalog.tracks()[0].id, id("/m/Heat.mkv", 0));
    }

    #[test]
    fn duplicate_id_fails() {
        let err = Catalog::new(
            "/m/a.mkv",
            vec![
                Track::new(id("/m/a.mkv", 0), Codec::H264),
                Track::new(id("/m/a.mkv", 0), Codec::Ac3),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateTrack(_)));
    }

    #[test]
    fn two_chapters_fail() {
        let err = Catalog::new(
            "/m/a.mkv",
            vec![
                Track::new(id("/m/a.chapters.txt", 0), Codec::Chapters),
                Track::new(id("/m/b.chapters.xml", 0), Codec::Chapters),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidCatalog(_)));
    }

    #[test]
    fn index_in_type_spans_files() {
        let catalog = sample();
        assert_eq!(catalog.index_in_type(&id("/m/Heat.mkv", 2)), Some(0));
        assert_eq!(catalog.index_in_type(&id("/m/Heat.eng.srt", 0)), Some(1));
        assert_eq!(catalog.index_in_type(&id("/m/Heat.rus.srt", 0)), Some(2));
        assert_eq!(catalog.index_in_type(&id("/m/none.mkv", 0)), None);
    }

    #[test]
    fn video_requires_exactly_one() {
        let catalog = sample();
        assert_eq!(catalog.video().unwrap().codec, Codec::H264);
        assert_eq!(catalog.reference_duration(), Some(6000.0));

        let none = Catalog::new("/m/a.mkv", vec![Track::new(id("/m/a.mkv", 0), Codec::Ac3)])
            .unwrap();
        assert!(matches!(none.video(), Err(Error::MissingVideo { found: 0 })));

        let two = Catalog::new(
            "/m/a.mkv",
            vec![
                Track::new(id("/m/a.mkv", 0), Codec::H264),
                Track::new(id("/m/a.mkv", 1), Codec::Hevc),
            ],
        )
        .unwrap();
        assert!(matches!(two.video(), Err(Error::MissingVideo { found: 2 })));
    }

    #[test]
    fn sole_track_detection() {
        let catalog = sample();
        assert!(catalog.is_sole_track(&id("/m/Heat.eng.srt", 0)));
        assert!(!catalog.is_sole_track(&id("/m/Heat.mkv", 1)));
        assert!(!catalog.is_sole_track(&id("/m/none.mkv", 0)));
    }

    #[test]
    fn from_probes_leaves_external_text_subtitles_undecided() {
        let main = Path::new("/m/Heat.mkv");
        let mut video = ProbeRecord::new(id("/m/Heat.mkv", 0), TrackType::Video, "h264");
        video.height = Some(1080);
        let embedded = ProbeRecord::new(id("/m/Heat.mkv", 1), TrackType::Subtitle, "subrip");
        let external = ProbeRecord::new(id("/m/Heat.eng.srt", 0), TrackType::Subtitle, "subrip");
        let mut flagged = ProbeRecord::new(id("/m/Heat.forced.srt", 0), TrackType::Subtitle, "subrip");
        flagged.disposition_forced = true;

        let catalog = Catalog::from_probes(
            main,
            vec![
                ProbedFile::new("/m/Heat.mkv", vec![video, embedded]),
                ProbedFile::new("/m/Heat.eng.srt", vec![external]),
                ProbedFile::new("/m/Heat.forced.srt", vec![flagged]),
            ],
        )
        .unwrap();

        assert_eq!(catalog.track(&id("/m/Heat.mkv", 1)).unwrap().forced, Some(false));
        assert_eq!(catalog.track(&id("/m/Heat.eng.srt", 0)).unwrap().forced, None);
        assert_eq!(catalog.track(&id("/m/Heat.forced.srt", 0)).unwrap().forced, Some(true));
    }

    #[test]
    fn relabel_overwrites_language_and_forced() {
        let mut catalog = sample();
        let sub = id("/m/Heat.eng.srt", 0);
        catalog.relabel(&sub, "eng", true).unwrap();
        let track = catalog.track(&sub).unwrap();
        assert_eq!(track.language, "eng");
        assert_eq!(track.forced, Some(true));
        assert!(catalog.relabel(&id("/m/x.mkv", 9), "eng", false).is_err());
    }

    #[test]
    fn natural_ordering() {
        assert_eq!(natural_cmp("Part 2", "Part 10"), Ordering::Less);
        assert_eq!(natural_cmp("a01", "a1"), Ordering::Equal);
        assert_eq!(natural_cmp("abc", "abd"), Ordering::Less);
        assert_eq!(natural_cmp("ep9.srt", "ep10.srt"), Ordering::Less);
    }
}
