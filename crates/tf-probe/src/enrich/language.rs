//! Language guessing from file names.
//!
//! Satellite files are usually named after their language
//! (`Heat.Russian.ac3`, `Heat.rus.forced.srt`). Only a track that is alone
//! in its file is guessed, and only when the name mentions exactly one
//! distinct language.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tf_core::{lang, QualifiedId, TrackType};

use crate::catalog::Catalog;

/// Channel layouts such as `5.1x` or `2x` that would otherwise leave stray
/// letters behind.
static LAYOUT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\dx").expect("valid regex"));

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z]+").expect("valid regex"));

/// Guess a language code from the stem of `path`.
///
/// Returns `None` when no word or more than one distinct language matches.
pub fn guess(path: &Path) -> Option<&'static str> {
    let stem = path.file_stem()?.to_string_lossy().to_lowercase();
    let stem = LAYOUT.replace_all(&stem, " ");

    let found: BTreeSet<&'static str> = WORD
        .find_iter(&stem)
        .filter_map(|word| lang::lookup_word(word.as_str()))
        .map(|language| language.code)
        .collect();

    let mut found = found.into_iter();
    match (found.next(), found.next()) {
        (Some(code), None) => Some(code),
        _ => None,
    }
}

pub(super) fn apply(catalog: &mut Catalog) {
    let pending: Vec<QualifiedId> = catalog
        .tracks()
        .iter()
        .filter(|t| matches!(t.track_type, TrackType::Audio | TrackType::Subtitle))
        .filter(|t| lang::is_undetermined(&t.language))
        .filter(|t| catalog.is_sole_track(&t.id))
        .map(|t| t.id.clone())
        .collect();

    for id in pending {
        let Some(code) = guess(id.source()) else {
            continue;
        };
        if let Some(track) = catalog.track_mut(&id) {
            tracing::debug!(track = %id, language = code, "guessed language from file name");
            track.language = code.to_string();
        }
    }
}
