//! The resolver's output: which tracks go into the output, in final order.

use serde::Serialize;
use tf_core::{QualifiedId, TrackType};

/// Resolved tracks of one movie, per type, in output order.
///
/// There is always exactly one video track. The chapters track, if the
/// movie has one, is carried without being requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    video: QualifiedId,
    audio: Vec<QualifiedId>,
    subtitles: Vec<QualifiedId>,
    chapters: Option<QualifiedId>,
}

impl Selection {
    pub(crate) fn new(
        video: QualifiedId,
        audio: Vec<QualifiedId>,
        subtitles: Vec<QualifiedId>,
        chapters: Option<QualifiedId>,
    ) -> Self {
        Self {
            video,
            audio,
            subtitles,
            chapters,
        }
    }

    pub fn video(&self) -> &QualifiedId {
        &self.video
    }

    pub fn chapters(&self) -> Option<&QualifiedId> {
        self.chapters.as_ref()
    }

    /// Selected tracks of one type, in output order.
    pub fn of_type(&self, track_type: TrackType) -> &[QualifiedId] {
        match track_type {
            TrackType::Video => std::slice::from_ref(&self.video),
            TrackType::Audio => &self.audio,
            TrackType::Subtitle => &self.subtitles,
            TrackType::Chapters => self.chapters.as_slice(),
        }
    }

    /// Every selected track in mux order: video, audio, subtitles, chapters.
    pub fn iter(&self) -> impl Iterator<Item = &QualifiedId> {
        TrackType::ALL.into_iter().flat_map(move |t| self.of_type(t))
    }

    pub fn contains(&self, id: &QualifiedId) -> bool {
        self.iter().any(|selected| selected == id)
    }

    /// Whether `id` is the first of its type, i.e. the output default.
    pub fn is_first_of_type(&self, track_type: TrackType, id: &QualifiedId) -> bool {
        self.of_type(track_type).first() == Some(id)
    }

    /// Number of selected tracks, chapters included.
    pub fn track_count(&self) -> usize {
        self.iter().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: u32) -> QualifiedId {
        QualifiedId::new("/m/Heat.mkv", index)
    }

    #[test]
    fn iterates_in_mux_order() {
        let selection = Selection::new(
            id(0),
            vec![id(2), id(1)],
            vec![id(4)],
            Some(QualifiedId::new("/m/Heat.chapters.txt", 0)),
        );
        let order: Vec<String> = selection.iter().map(|i| i.to_string()).collect();
        assert_eq!(
            order,
            ["Heat.mkv:0", "Heat.mkv:2", "Heat.mkv:1", "Heat.mkv:4", "Heat.chapters.txt:0"]
        );
        assert_eq!(selection.track_count(), 5);
        assert!(selection.is_first_of_type(TrackType::Audio, &id(2)));
        assert!(!selection.is_first_of_type(TrackType::Audio, &id(1)));
        assert!(!selection.contains(&id(3)));
    }

    #[test]
    fn chapters_are_optional() {
        let selection = Selection::new(id(0), vec![], vec![], None);
        assert!(selection.of_type(TrackType::Chapters).is_empty());
        assert_eq!(selection.of_type(TrackType::Video), &[id(0)]);
        assert_eq!(selection.track_count(), 1);
    }

    #[test]
    fn serializes_per_type() {
        let selection = Selection::new(id(0), vec![id(1)], vec![], None);
        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(json["audio"][0]["index"], 1);
        assert!(json["chapters"].is_null());
    }
}
