//! Metadata enrichment.
//!
//! The [`Enricher`] consumes a freshly built [`Catalog`] and returns it with
//! gaps filled in. Every rule is best-effort: a failing [`MetadataSource`]
//! call is logged and the affected attribute stays unknown.
//!
//! Rules run in a fixed order because later ones read what earlier ones
//! wrote:
//!
//! 1. codec-variant refinement (DTS vs DTS-ES)
//! 2. language guessing from file names
//! 3. subtitle charset and language detection
//! 4. forced-subtitle inference
//! 5. CRF discovery on the video track

mod charset;
mod crf;
mod forced;
mod language;
mod variant;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tf_core::config::Thresholds;

use crate::catalog::Catalog;

pub use charset::normalize_encoding;
pub use language::guess as guess_language;

/// Result of running a charset detector over a subtitle file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharsetGuess {
    /// Encoding name as reported by the detector.
    pub encoding: String,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f32,
    /// Language the detector associates with the text, if any.
    pub language: Option<String>,
}

/// Per-track details from a richer metadata tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDetail {
    /// Stream index in probe numbering.
    pub index: u32,
    pub format: String,
    pub profile: Option<String>,
    pub features: Vec<String>,
}

/// External metadata the enrichment rules may consult.
///
/// Implementations shell out to real tools; tests substitute canned answers.
pub trait MetadataSource {
    /// CRF recorded by a previous encode of the video in `path`.
    fn detect_crf(&self, path: &Path) -> tf_core::Result<Option<f32>>;

    /// Charset (and possibly language) of a text subtitle file.
    fn detect_charset(&self, path: &Path) -> tf_core::Result<Option<CharsetGuess>>;

    /// Detailed per-track information for every stream of `path`.
    fn track_details(&self, path: &Path) -> tf_core::Result<Vec<TrackDetail>>;
}

/// Runs the enrichment rules over catalogs, one movie at a time.
///
/// Track details are fetched at most once per file for the lifetime of the
/// enricher.
pub struct Enricher<'a> {
    source: &'a dyn MetadataSource,
    thresholds: Thresholds,
    details: HashMap<PathBuf, Vec<TrackDetail>>,
}

impl<'a> Enricher<'a> {
    pub fn new(source: &'a dyn MetadataSource, thresholds: Thresholds) -> Self {
        Self {
            source,
            thresholds,
            details: HashMap::new(),
        }
    }

    /// Enrich `catalog` and hand it back.
    pub fn enrich(&mut self, mut catalog: Catalog) -> Catalog {
        tracing::debug!(main = %catalog.main_file().display(), "enriching catalog");
        variant::refine(&mut catalog, |path| self.details_for(path));
        language::apply(&mut catalog);
        charset::apply(&mut catalog, self.source, self.thresholds.charset_confidence);
        forced::apply(&mut catalog, self.thresholds.forced_caption_gap);
        crf::apply(&mut catalog, self.source);
        catalog
    }

    fn details_for(&mut self, path: &Path) -> Vec<TrackDetail> {
        if let Some(cached) = self.details.get(path) {
            return cached.clone();
        }
        let details = match self.source.track_details(path) {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "track details unavailable");
                Vec::new()
            }
        };
        self.details.insert(path.to_path_buf(), details.clone());
        details
    }
}
