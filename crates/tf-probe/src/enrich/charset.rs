//! Text subtitle charset and language detection.
//!
//! Only standalone subtitle files are inspected: the detector reads raw
//! bytes, which is meaningless for a track embedded in a container.

use tf_core::{lang, QualifiedId, TrackType};

use super::MetadataSource;
use crate::catalog::Catalog;

/// Map a detector encoding name to the name the muxer expects.
pub fn normalize_encoding(raw: &str) -> String {
    match raw.trim().to_lowercase().as_str() {
        "windows-1251" => "CP1251".to_string(),
        "ascii" => "US-ASCII".to_string(),
        "utf8" | "utf-8" | "utf-8-sig" => "UTF-8".to_string(),
        "utf-16" => "UTF-16".to_string(),
        other => other.to_uppercase(),
    }
}

pub(super) fn apply(catalog: &mut Catalog, source: &dyn MetadataSource, min_confidence: f32) {
    let pending: Vec<QualifiedId> = catalog
        .of_type(TrackType::Subtitle)
        .filter(|t| t.codec.is_text_subtitle())
        .filter(|t| lang::is_undetermined(&t.language) || t.encoding.is_none())
        .filter(|t| catalog.is_sole_track(&t.id))
        .map(|t| t.id.clone())
        .collect();

    for id in pending {
        let guess = match source.detect_charset(id.source()) {
            Ok(Some(guess)) => guess,
            Ok(None) => {
                tracing::debug!(track = %id, "charset detector had no answer");
                continue;
            }
            Err(e) => {
                tracing::warn!(track = %id, error = %e, "charset detection failed");
                continue;
            }
        };
        let Some(track) = catalog.track_mut(&id) else {
            continue;
        };

        track.encoding = Some(normalize_encoding(&guess.encoding));

        let language = guess
            .language
            .as_deref()
            .and_then(lang::lookup)
            .map(|l| l.code);
        match language {
            Some(code) if lang::is_undetermined(&track.language) && guess.confidence >= min_confidence => {
                tracing::debug!(
                    track = %id,
                    language = code,
                    confidence = guess.confidence,
                    "language from charset detector"
                );
                track.language = code.to_string();
            }
            Some(code) if lang::is_undetermined(&track.language) => {
                tracing::debug!(
                    track = %id,
                    language = code,
                    confidence = guess.confidence,
                    "charset language guess below threshold"
                );
            }
            _ => {}
        }
    }
}
