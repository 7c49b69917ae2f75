//! Source CRF discovery for video tracks.

use tf_core::{QualifiedId, TrackType};

use super::MetadataSource;
use crate::catalog::Catalog;

pub(super) fn apply(catalog: &mut Catalog, source: &dyn MetadataSource) {
    let pending: Vec<QualifiedId> = catalog
        .of_type(TrackType::Video)
        .filter(|t| t.video.as_ref().is_some_and(|v| v.crf.is_none()))
        .map(|t| t.id.clone())
        .collect();

    for id in pending {
        let crf = match source.detect_crf(id.source()) {
            Ok(crf) => crf,
            Err(e) => {
                tracing::warn!(track = %id, error = %e, "CRF probe failed");
                None
            }
        };
        tracing::debug!(track = %id, ?crf, "source CRF");
        if let Some(video) = catalog.track_mut(&id).and_then(|t| t.video.as_mut()) {
            video.crf = crf;
        }
    }
}
