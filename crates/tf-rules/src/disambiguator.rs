//! The [`Disambiguator`] capability.
//!
//! Resolution and compilation stay deterministic by never talking to a user
//! directly: whenever they need a human decision they ask a
//! `Disambiguator`. The terminal implementation lives in the binary; this
//! module provides the scripted and non-interactive ones.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;
use tf_core::{Error, QualifiedId, Result, TrackType};
use tf_probe::Track;

/// The slot a track choice is being made for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotRequest {
    pub track_type: TrackType,
    pub language: String,
    pub forced: bool,
}

impl fmt::Display for SlotRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}",
            self.track_type.title(),
            self.language.to_uppercase(),
            if self.forced { "Forced" } else { "Full" }
        )
    }
}

/// What the user gets to see about one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackChoice {
    pub id: QualifiedId,
    /// Position among all tracks of the same type.
    pub type_index: usize,
    pub language: String,
    pub codec: String,
    pub channels: Option<u32>,
    pub name: String,
    pub default: bool,
    /// Originating file name, set only when candidates span several files.
    pub file: Option<String>,
}

impl TrackChoice {
    pub(crate) fn from_track(track: &Track, type_index: usize, show_file: bool) -> Self {
        Self {
            id: track.id.clone(),
            type_index,
            language: track.language.clone(),
            codec: track.codec.name().to_string(),
            channels: track.channels(),
            name: track.name.clone(),
            default: track.default,
            file: show_file.then(|| {
                track
                    .id
                    .source()
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default()
            }),
        }
    }
}

impl fmt::Display for TrackChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(ID {}) {} {}", self.id.index(), self.language, self.codec)?;
        if let Some(channels) = self.channels {
            write!(f, " {channels}ch")?;
        }
        if !self.name.is_empty() {
            write!(f, " {}", self.name)?;
        }
        if self.default {
            write!(f, " (default)")?;
        }
        if let Some(file) = &self.file {
            write!(f, " [{file}]")?;
        }
        Ok(())
    }
}

/// Source of human decisions.
pub trait Disambiguator {
    /// Pick exactly one of `candidates` (at least two) for `slot`, returning
    /// its position in the slice.
    ///
    /// # Errors
    ///
    /// [`Error::Cancelled`] aborts the whole run; [`Error::Ambiguous`] fails
    /// only the current movie.
    fn choose_track(&mut self, slot: &SlotRequest, candidates: &[TrackChoice]) -> Result<usize>;

    /// Pick one of `options` in answer to `question`.
    ///
    /// # Errors
    ///
    /// [`Error::Unanswered`] when no answer can be obtained.
    fn choose_option(&mut self, question: &str, options: &[String]) -> Result<usize>;
}

/// Never blocks: every question fails the current movie.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractive;

impl Disambiguator for NonInteractive {
    fn choose_track(&mut self, slot: &SlotRequest, candidates: &[TrackChoice]) -> Result<usize> {
        Err(Error::Ambiguous {
            track_type: slot.track_type,
            language: slot.language.clone(),
            candidates: candidates
                .iter()
                .map(|c| c.id.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    fn choose_option(&mut self, question: &str, _options: &[String]) -> Result<usize> {
        Err(Error::Unanswered {
            question: question.to_string(),
        })
    }
}

/// Replays prepared answers, recording every question asked.
///
/// Track answers name the wanted track by id; option answers are positions.
/// Running out of answers behaves like [`NonInteractive`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedDisambiguator {
    tracks: VecDeque<QualifiedId>,
    options: VecDeque<usize>,
    /// Slots that required a choice, in the order they were asked.
    pub track_prompts: Vec<SlotRequest>,
    /// Option questions, in the order they were asked.
    pub option_prompts: Vec<String>,
}

impl ScriptedDisambiguator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer to the next track question.
    pub fn pick_track(mut self, id: QualifiedId) -> Self {
        self.tracks.push_back(id);
        self
    }

    /// Queue the answer to the next option question.
    pub fn pick_option(mut self, index: usize) -> Self {
        self.options.push_back(index);
        self
    }
}

impl Disambiguator for ScriptedDisambiguator {
    fn choose_track(&mut self, slot: &SlotRequest, candidates: &[TrackChoice]) -> Result<usize> {
        self.track_prompts.push(slot.clone());
        let Some(wanted) = self.tracks.pop_front() else {
            return NonInteractive.choose_track(slot, candidates);
        };
        candidates
            .iter()
            .position(|c| c.id == wanted)
            .ok_or_else(|| Error::Unanswered {
                question: format!("{slot}: scripted answer {wanted} is not a candidate"),
            })
    }

    fn choose_option(&mut self, question: &str, options: &[String]) -> Result<usize> {
        self.option_prompts.push(question.to_string());
        match self.options.pop_front() {
            Some(index) if index < options.len() => Ok(index),
            Some(index) => Err(Error::Unanswered {
                question: format!("{question}: scripted answer {index} out of range"),
            }),
            None => NonInteractive.choose_option(question, options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(file: &str, index: u32) -> TrackChoice {
        TrackChoice {
            id: QualifiedId::new(file, index),
            type_index: index as usize,
            language: "eng".into(),
            codec: "AAC LC".into(),
            channels: Some(2),
            name: String::new(),
            default: false,
            file: None,
        }
    }

    fn slot() -> SlotRequest {
        SlotRequest {
            track_type: TrackType::Audio,
            language: "eng".into(),
            forced: false,
        }
    }

    #[test]
    fn slot_display() {
        assert_eq!(slot().to_string(), "Audio, ENG, Full");
    }

    #[test]
    fn choice_display() {
        let mut c = choice("/m/Heat.mkv", 1);
        c.name = "Director".into();
        c.default = true;
        c.file = Some("Heat.mkv".into());
        assert_eq!(c.to_string(), "(ID 1) eng AAC LC 2ch Director (default) [Heat.mkv]");
    }

    #[test]
    fn non_interactive_reports_candidates() {
        let err = NonInteractive
            .choose_track(&slot(), &[choice("/m/a.mkv", 1), choice("/m/a.mkv", 2)])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Ambiguous audio track for language eng: candidates a.mkv:1, a.mkv:2"
        );
        assert!(matches!(
            NonInteractive.choose_option("Tune?", &[]),
            Err(Error::Unanswered { .. })
        ));
    }

    #[test]
    fn scripted_answers_by_id() {
        let mut d = ScriptedDisambiguator::new()
            .pick_track(QualifiedId::new("/m/a.mkv", 2))
            .pick_option(1);
        let picked = d
            .choose_track(&slot(), &[choice("/m/a.mkv", 1), choice("/m/a.mkv", 2)])
            .unwrap();
        assert_eq!(picked, 1);
        assert_eq!(d.choose_option("Tune?", &["a".into(), "b".into()]).unwrap(), 1);
        assert_eq!(d.track_prompts, vec![slot()]);
        assert_eq!(d.option_prompts, vec!["Tune?"]);

        // Exhausted script.
        assert!(d.choose_option("Again?", &["a".into()]).is_err());
    }
}
