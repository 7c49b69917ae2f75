//! Predicates deciding whether a track may fill a wanted-track slot.

use tf_core::lang;
use tf_probe::Track;

/// Whether a track labelled `track_language` may satisfy a request for
/// `requested`.
///
/// `und` is a wildcard on both sides: requesting `und` accepts any track, and
/// an untagged track is accepted for any request.
pub fn language_matches(requested: &str, track_language: &str) -> bool {
    lang::is_undetermined(requested)
        || lang::is_undetermined(track_language)
        || requested == track_language
}

/// Whether `duration` is within `tolerance` (a fraction) of `reference`.
///
/// Unknown durations always pass.
pub fn duration_matches(duration: Option<f64>, reference: Option<f64>, tolerance: f64) -> bool {
    match (duration, reference) {
        (Some(d), Some(r)) if r > 0.0 => (d - r).abs() / r <= tolerance,
        _ => true,
    }
}

/// One language of one slot, as seen by the candidate filter.
#[derive(Debug, Clone, Copy)]
pub struct SlotFilter<'a> {
    pub language: &'a str,
    pub forced: bool,
    pub reference_duration: Option<f64>,
    pub duration_tolerance: f64,
}

impl SlotFilter<'_> {
    /// Whether `track` (already known to be of the slot's type and not yet
    /// consumed) is a candidate.
    ///
    /// A track whose forced state is still unknown never matches.
    pub fn accepts(&self, track: &Track) -> bool {
        if track.forced != Some(self.forced) {
            return false;
        }
        if !language_matches(self.language, &track.language) {
            return false;
        }
        if !self.forced
            && !duration_matches(track.duration, self.reference_duration, self.duration_tolerance)
        {
            return false;
        }
        !track.is_commentary()
    }
}
