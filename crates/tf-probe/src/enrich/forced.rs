//! Forced-subtitle inference.
//!
//! Explicit names win: a track or standalone file named "forced" (in any of
//! the usual spellings) is forced unless it also says "normal", and "sdh"
//! means full. Track names may also say "caption". Everything else falls to a statistical rule: within the image
//! group and the text group separately, a track whose frame or caption count
//! lies far below the group maximum is forced. Text subtitles nobody could
//! decide end up non-forced.

use std::collections::HashSet;

use tf_core::{lang, QualifiedId, TrackType};

use crate::catalog::Catalog;
use crate::track::Track;

const FORCED_MARKERS: &[&str] = &["forced", "forsed", "форсир", "только надписи", "tolko nadpisi"];
/// Markers honoured in track names but not in file names.
const TRACK_NAME_MARKERS: &[&str] = &["caption"];
const NORMAL_MARKER: &str = "normal";
const SDH_MARKER: &str = "sdh";

/// Lowercase `raw`, keeping letters, digits and single spaces.
fn normalize_name(raw: &str) -> String {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Forced state implied by a name, if it says anything.
fn name_rule(raw: &str, extra_markers: &[&str]) -> Option<bool> {
    let name = normalize_name(raw);
    if name.split(' ').any(|w| w == SDH_MARKER) {
        return Some(false);
    }
    let marked = FORCED_MARKERS
        .iter()
        .chain(extra_markers)
        .any(|m| name.contains(m));
    if marked && !name.contains(NORMAL_MARKER) {
        return Some(true);
    }
    None
}

fn decide_by_name(catalog: &Catalog, track: &Track) -> Option<bool> {
    name_rule(&track.name, TRACK_NAME_MARKERS).or_else(|| {
        if !catalog.is_sole_track(&track.id) {
            return None;
        }
        let file_name = track.id.source().file_name()?.to_string_lossy();
        name_rule(&file_name, &[])
    })
}

fn in_statistics_pool(track: &Track) -> bool {
    track.forced != Some(true)
        && !lang::NON_LATIN_STATISTICS.contains(&track.language.as_str())
        && !normalize_name(&track.name).contains(SDH_MARKER)
}

/// Tracks of `group` whose metric lies more than `gap` of the maximum below it.
///
/// Returns `None` when any member lacks the metric.
fn below_gap<F>(group: &[&Track], gap: f64, metric: F) -> Option<Vec<QualifiedId>>
where
    F: Fn(&Track) -> Option<u64>,
{
    let values: Vec<u64> = group.iter().map(|t| metric(*t)).collect::<Option<_>>()?;
    let max = values.iter().copied().max()? as f64;
    Some(
        group
            .iter()
            .zip(values)
            .filter(|(_, v)| max - *v as f64 > max * gap)
            .map(|(t, _)| t.id.clone())
            .collect(),
    )
}

pub(super) fn apply(catalog: &mut Catalog, gap: f64) {
    let mut decided: Vec<(QualifiedId, bool)> = Vec::new();
    for track in catalog.of_type(TrackType::Subtitle) {
        if let Some(forced) = decide_by_name(catalog, track) {
            tracing::debug!(track = %track.id, forced, "forced state from name");
            decided.push((track.id.clone(), forced));
        }
    }
    let by_name: HashSet<QualifiedId> = decided.iter().map(|(id, _)| id.clone()).collect();

    let pool: Vec<&Track> = catalog
        .of_type(TrackType::Subtitle)
        .filter(|t| !by_name.contains(&t.id))
        .filter(|t| in_statistics_pool(t))
        .collect();
    let (image, text): (Vec<&Track>, Vec<&Track>) =
        pool.into_iter().partition(|t| t.codec.is_image_subtitle());

    let metrics: [(&str, fn(&Track) -> Option<u64>); 2] = [
        ("frames", |t| t.frame_count),
        ("captions", |t| t.caption_count),
    ];

    let mut forced: HashSet<QualifiedId> = HashSet::new();
    let mut measured: HashSet<QualifiedId> = HashSet::new();
    for group in [&image, &text] {
        for (metric_name, metric) in metrics {
            match below_gap(group, gap, metric) {
                Some(ids) => {
                    measured.extend(group.iter().map(|t| t.id.clone()));
                    for id in ids {
                        tracing::debug!(track = %id, metric = metric_name, "forced by statistics");
                        forced.insert(id);
                    }
                }
                None if !group.is_empty() => {
                    tracing::debug!(metric = metric_name, "metric incomplete, skipped for group");
                }
                None => {}
            }
        }
    }

    for id in measured {
        decided.push((id.clone(), forced.contains(&id)));
    }

    for (id, value) in decided {
        if let Some(track) = catalog.track_mut(&id) {
            // Statistics only fill gaps; a measured full track keeps its
            // container disposition.
            if value || by_name.contains(&id) || track.forced.is_none() {
                track.forced = Some(value);
            }
        }
    }

    for track in catalog.tracks_mut() {
        if track.track_type == TrackType::Subtitle && track.forced.is_none() {
            tracing::debug!(track = %track.id, "no forced evidence, treating as full");
            track.forced = Some(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tf_core::Codec;

    fn id(file: &str, index: u32) -> QualifiedId {
        QualifiedId::new(file, index)
    }

    fn video() -> Track {
        Track::new(id("/m/Heat.mkv", 0), Codec::H264)
    }

    fn forced_of(catalog: &Catalog, id: &QualifiedId) -> Option<bool> {
        catalog.track(id).and_then(|t| t.forced)
    }

    #[test]
    fn name_markers() {
        assert_eq!(name_rule("Forced", &[]), Some(true));
        assert_eq!(name_rule("Heat.rus.FORSED.srt", &[]), Some(true));
        assert_eq!(name_rule("Форсированные", &[]), Some(true));
        assert_eq!(name_rule("Только надписи", &[]), Some(true));
        assert_eq!(name_rule("tolko_nadpisi", &[]), Some(true));
        assert_eq!(name_rule("Forced (normal)", &[]), None);
        assert_eq!(name_rule("English SDH", &[]), Some(false));
        assert_eq!(name_rule("Full", &[]), None);
    }

    #[test]
    fn caption_in_track_name_means_forced() {
        assert_eq!(name_rule("Captions", TRACK_NAME_MARKERS), Some(true));
        assert_eq!(name_rule("Heat.captions.srt", &[]), None);

        let mut catalog = Catalog::new(
            "/m/Heat.mkv",
            vec![
                video(),
                Track::new(id("/m/Heat.mkv", 1), Codec::Subrip)
                    .with_name("Captions")
                    .with_caption_count(1000),
                Track::new(id("/m/Heat.mkv", 2), Codec::Subrip)
                    .with_name("Full")
                    .with_caption_count(1100),
                Track::new(id("/m/Heat.captions.srt", 0), Codec::Subrip).with_forced(None),
            ],
        )
        .unwrap();
        apply(&mut catalog, 0.5);

        assert_eq!(forced_of(&catalog, &id("/m/Heat.mkv", 1)), Some(true));
        assert_eq!(forced_of(&catalog, &id("/m/Heat.mkv", 2)), Some(false));
        assert_eq!(forced_of(&catalog, &id("/m/Heat.captions.srt", 0)), Some(false));
    }

    #[test]
    fn caption_gap_marks_forced_for_every_order() {
        let counts = [100, 100, 40];
        let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        for order in orders {
            let mut tracks = vec![video()];
            for (slot, &which) in order.iter().enumerate() {
                tracks.push(
                    Track::new(id("/m/Heat.mkv", slot as u32 + 1), Codec::Subrip)
                        .with_name(&format!("sub{which}"))
                        .with_caption_count(counts[which]),
                );
            }
            let mut catalog = Catalog::new("/m/Heat.mkv", tracks).unwrap();
            apply(&mut catalog, 0.5);

            let forced: Vec<String> = catalog
                .of_type(TrackType::Subtitle)
                .filter(|t| t.forced == Some(true))
                .map(|t| t.name.clone())
                .collect();
            assert_eq!(forced, vec!["sub2"], "order {order:?}");
        }
    }

    #[test]
    fn groups_are_measured_separately() {
        let mut catalog = Catalog::new(
            "/m/Heat.mkv",
            vec![
                video(),
                Track::new(id("/m/Heat.mkv", 1), Codec::Pgs).with_frame_count(2000),
                Track::new(id("/m/Heat.mkv", 2), Codec::Pgs).with_frame_count(150),
                Track::new(id("/m/Heat.mkv", 3), Codec::Subrip).with_frame_count(160),
            ],
        )
        .unwrap();
        apply(&mut catalog, 0.5);

        assert_eq!(forced_of(&catalog, &id("/m/Heat.mkv", 1)), Some(false));
        assert_eq!(forced_of(&catalog, &id("/m/Heat.mkv", 2)), Some(true));
        // Alone in its group, so it is its own maximum.
        assert_eq!(forced_of(&catalog, &id("/m/Heat.mkv", 3)), Some(false));
    }

    #[test]
    fn incomplete_metric_is_skipped() {
        let mut catalog = Catalog::new(
            "/m/Heat.mkv",
            vec![
                video(),
                Track::new(id("/m/Heat.a.srt", 0), Codec::Subrip)
                    .with_forced(None)
                    .with_caption_count(900),
                Track::new(id("/m/Heat.b.srt", 0), Codec::Subrip).with_forced(None),
            ],
        )
        .unwrap();
        apply(&mut catalog, 0.5);

        assert_eq!(forced_of(&catalog, &id("/m/Heat.a.srt", 0)), Some(false));
        assert_eq!(forced_of(&catalog, &id("/m/Heat.b.srt", 0)), Some(false));
    }

    #[test]
    fn names_beat_statistics() {
        let mut catalog = Catalog::new(
            "/m/Heat.mkv",
            vec![
                video(),
                Track::new(id("/m/Heat.mkv", 1), Codec::Subrip)
                    .with_name("Forced")
                    .with_caption_count(5),
                Track::new(id("/m/Heat.mkv", 2), Codec::Subrip)
                    .with_name("Full")
                    .with_caption_count(1200),
                Track::new(id("/m/Heat.mkv", 3), Codec::Subrip)
                    .with_name("SDH")
                    .with_caption_count(20),
            ],
        )
        .unwrap();
        apply(&mut catalog, 0.5);

        assert_eq!(forced_of(&catalog, &id("/m/Heat.mkv", 1)), Some(true));
        assert_eq!(forced_of(&catalog, &id("/m/Heat.mkv", 2)), Some(false));
        assert_eq!(forced_of(&catalog, &id("/m/Heat.mkv", 3)), Some(false));
    }

    #[test]
    fn standalone_file_name_counts_as_name() {
        let mut catalog = Catalog::new(
            "/m/Heat.mkv",
            vec![
                video(),
                Track::new(id("/m/Heat.eng.forced.srt", 0), Codec::Subrip).with_forced(None),
                Track::new(id("/m/Heat.eng.srt", 0), Codec::Subrip).with_forced(None),
            ],
        )
        .unwrap();
        apply(&mut catalog, 0.5);

        assert_eq!(forced_of(&catalog, &id("/m/Heat.eng.forced.srt", 0)), Some(true));
        assert_eq!(forced_of(&catalog, &id("/m/Heat.eng.srt", 0)), Some(false));
    }

    #[test]
    fn non_latin_languages_stay_out_of_the_pool() {
        let mut catalog = Catalog::new(
            "/m/Heat.mkv",
            vec![
                video(),
                Track::new(id("/m/Heat.mkv", 1), Codec::Subrip).with_caption_count(1000),
                Track::new(id("/m/Heat.mkv", 2), Codec::Subrip)
                    .with_language("chi")
                    .with_caption_count(300),
            ],
        )
        .unwrap();
        apply(&mut catalog, 0.5);

        assert_eq!(forced_of(&catalog, &id("/m/Heat.mkv", 2)), Some(false));
    }

    #[test]
    fn disposition_forced_is_kept() {
        let mut catalog = Catalog::new(
            "/m/Heat.mkv",
            vec![
                video(),
                Track::new(id("/m/Heat.mkv", 1), Codec::Pgs)
                    .with_forced(Some(true))
                    .with_frame_count(3000),
                Track::new(id("/m/Heat.mkv", 2), Codec::Pgs).with_frame_count(2900),
            ],
        )
        .unwrap();
        apply(&mut catalog, 0.5);

        assert_eq!(forced_of(&catalog, &id("/m/Heat.mkv", 1)), Some(true));
        assert_eq!(forced_of(&catalog, &id("/m/Heat.mkv", 2)), Some(false));
    }
}
