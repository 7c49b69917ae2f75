//! The track resolver.
//!
//! Slots are resolved in declaration order and, within a slot, language by
//! language. A track picked for one slot is consumed and never offered
//! again. A single candidate is taken automatically; several are handed to
//! the [`Disambiguator`]. Picked tracks are relabelled in the catalog with
//! the requested language and the slot's forced class.

use std::collections::HashSet;

use tf_core::config::{Config, Thresholds, WantedSlot, WantedTracks};
use tf_core::{lang, Error, QualifiedId, Result, TrackType};
use tf_probe::{Catalog, Track};
use tracing::{debug, info};

use crate::disambiguator::{Disambiguator, SlotRequest, TrackChoice};
use crate::matching::SlotFilter;
use crate::selection::Selection;

/// Resolves a [`WantedTracks`] specification against one movie at a time.
#[derive(Debug, Clone)]
pub struct Resolver {
    wanted: WantedTracks,
    optional_forced: bool,
    duration_tolerance: f64,
}

/// A track picked for a slot, with the keys that decide its final position.
#[derive(Debug)]
struct Pick {
    id: QualifiedId,
    track_type: TrackType,
    language_index: usize,
    forced: bool,
}

impl Resolver {
    pub fn new(wanted: WantedTracks) -> Self {
        Self {
            wanted,
            optional_forced: false,
            duration_tolerance: Thresholds::default().duration_tolerance,
        }
    }

    /// Resolver configured from the `[tracks]`, `[policy]` and `[thresholds]`
    /// sections.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tracks.clone())
            .optional_forced(config.policy.optional_forced)
            .duration_tolerance(config.thresholds.duration_tolerance)
    }

    /// Skip forced slots that have no candidate instead of failing.
    pub fn optional_forced(mut self, optional: bool) -> Self {
        self.optional_forced = optional;
        self
    }

    /// Largest relative duration difference accepted for full tracks.
    pub fn duration_tolerance(mut self, tolerance: f64) -> Self {
        self.duration_tolerance = tolerance;
        self
    }

    /// Resolve every slot against `catalog`.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingVideo`] unless the catalog (and the selection) hold
    ///   exactly one video track; checked before any slot is looked at.
    /// - [`Error::TrackNotFound`] for a mandatory slot language with no
    ///   candidate.
    /// - Whatever the disambiguator returns when asked.
    pub fn resolve(
        &self,
        catalog: &mut Catalog,
        disambiguator: &mut dyn Disambiguator,
    ) -> Result<Selection> {
        catalog.video()?;
        let reference_duration = catalog.reference_duration();

        let mut consumed: HashSet<QualifiedId> = HashSet::new();
        let mut picks: Vec<Pick> = Vec::new();

        for slot in self.wanted.slots() {
            for (language_index, language) in slot.languages.iter().enumerate() {
                let filter = SlotFilter {
                    language,
                    forced: slot.forced,
                    reference_duration,
                    duration_tolerance: self.duration_tolerance,
                };
                let candidates: Vec<&Track> = catalog
                    .of_type(slot.track_type)
                    .filter(|t| !consumed.contains(&t.id))
                    .filter(|t| filter.accepts(t))
                    .collect();

                let (chosen, track_language) = match candidates.as_slice() {
                    [] if slot.forced && self.optional_forced => {
                        debug!(
                            track_type = %slot.track_type,
                            language = %language,
                            "optional forced track not found, skipping"
                        );
                        continue;
                    }
                    [] => {
                        return Err(Error::track_not_found(
                            slot.track_type,
                            language.as_str(),
                            slot.forced,
                        ))
                    }
                    [only] => (only.id.clone(), only.language.clone()),
                    many => {
                        let track = ask(catalog, slot, language, many, disambiguator)?;
                        (track.id.clone(), track.language.clone())
                    }
                };

                // An `und` request keeps whatever the track already knows.
                let label = if lang::is_undetermined(language) {
                    track_language
                } else {
                    language.clone()
                };
                catalog.relabel(&chosen, &label, slot.forced)?;
                info!(
                    track = %chosen,
                    track_type = %slot.track_type,
                    language = %label,
                    forced = slot.forced,
                    "track selected"
                );

                consumed.insert(chosen.clone());
                picks.push(Pick {
                    id: chosen,
                    track_type: slot.track_type,
                    language_index,
                    forced: slot.forced,
                });
            }
        }

        // Full tracks first, then forced; each by language position.
        // Stable: ties keep slot order.
        picks.sort_by_key(|p| (p.forced, p.language_index));
        let of_type = |track_type: TrackType| -> Vec<QualifiedId> {
            picks
                .iter()
                .filter(|p| p.track_type == track_type)
                .map(|p| p.id.clone())
                .collect()
        };

        let mut videos = of_type(TrackType::Video);
        if videos.len() != 1 {
            return Err(Error::MissingVideo {
                found: videos.len(),
            });
        }
        let video = videos.remove(0);

        Ok(Selection::new(
            video,
            of_type(TrackType::Audio),
            of_type(TrackType::Subtitle),
            catalog.chapters().map(|t| t.id.clone()),
        ))
    }
}

/// Hand several candidates to the disambiguator, ordered by their position
/// among all tracks of the type.
fn ask<'c>(
    catalog: &Catalog,
    slot: &WantedSlot,
    language: &str,
    candidates: &[&'c Track],
    disambiguator: &mut dyn Disambiguator,
) -> Result<&'c Track> {
    let spans_files = candidates
        .iter()
        .any(|t| t.id.source() != candidates[0].id.source());

    let mut ordered: Vec<(&Track, usize)> = candidates
        .iter()
        .map(|t| (*t, catalog.index_in_type(&t.id).unwrap_or(usize::MAX)))
        .collect();
    ordered.sort_by_key(|(_, index)| *index);

    let choices: Vec<TrackChoice> = ordered
        .iter()
        .map(|(t, index)| TrackChoice::from_track(t, *index, spans_files))
        .collect();
    let request = SlotRequest {
        track_type: slot.track_type,
        language: language.to_string(),
        forced: slot.forced,
    };

    debug!(slot = %request, candidates = choices.len(), "asking for a track");
    let picked = disambiguator.choose_track(&request, &choices)?;
    ordered
        .get(picked)
        .map(|(t, _)| *t)
        .ok_or_else(|| Error::Unanswered {
            question: format!("{request}: choice {picked} out of range"),
        })
}
