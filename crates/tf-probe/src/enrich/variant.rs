//! Codec-variant refinement.
//!
//! ffprobe reports DTS and DTS-ES with the same codec name. Tracks whose
//! codec needs a variant probe are looked up in the richer per-file track
//! details, fetched lazily and only for files that contain such a track.

use std::path::Path;

use tf_core::{Codec, QualifiedId};

use super::TrackDetail;
use crate::catalog::Catalog;

pub(super) fn refine<F>(catalog: &mut Catalog, mut details_for: F)
where
    F: FnMut(&Path) -> Vec<TrackDetail>,
{
    let pending: Vec<QualifiedId> = catalog
        .tracks()
        .iter()
        .filter(|t| t.codec.props().variant_probe)
        .map(|t| t.id.clone())
        .collect();

    for id in pending {
        let details = details_for(id.source());
        let Some(detail) = details.iter().find(|d| d.index == id.index()) else {
            continue;
        };
        let Some(track) = catalog.track_mut(&id) else {
            continue;
        };
        if let Some(codec) = variant_of(track.codec, detail) {
            tracing::debug!(track = %id, from = %track.codec, to = %codec, "refined codec variant");
            track.codec = codec;
        }
    }
}

fn variant_of(codec: Codec, detail: &TrackDetail) -> Option<Codec> {
    match codec {
        Codec::Dts if has_token(detail, "ES") => Some(Codec::DtsEs),
        _ => None,
    }
}

/// Whether `token` appears as a whole word in the profile or feature list.
fn has_token(detail: &TrackDetail, token: &str) -> bool {
    let words = |s: &str| {
        s.split(|c: char| c == '/' || c.is_whitespace())
            .any(|w| w.eq_ignore_ascii_case(token))
    };
    detail.profile.as_deref().is_some_and(words) || detail.features.iter().any(|f| words(f.as_str()))
}
