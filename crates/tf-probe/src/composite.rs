//! A composite prober that delegates to multiple [`Prober`] implementations.

use std::path::Path;

use crate::prober::Prober;
use crate::record::ProbedFile;

/// Tries each registered [`Prober`] in order and returns the first successful result.
///
/// This allows layering probers, e.g. the tool-free chapters prober in front
/// of an ffprobe-backed one.
pub struct CompositeProber {
    probers: Vec<Box<dyn Prober>>,
}

impl CompositeProber {
    /// Create a new `CompositeProber` from an ordered list of probers.
    ///
    /// Probers are tried in the order provided. The first prober whose
    /// [`Prober::supports`] returns `true` and whose [`Prober::probe`] succeeds
    /// will have its result returned.
    pub fn new(probers: Vec<Box<dyn Prober>>) -> Self {
        Self { probers }
    }
}

impl Prober for CompositeProber {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn supports(&self, path: &Path) -> bool {
        self.probers.iter().any(|p| p.supports(path))
    }

    fn probe(&self, path: &Path) -> tf_core::Result<ProbedFile> {
        let mut last_err = None;

        for prober in &self.probers {
            if !prober.supports(path) {
                continue;
            }

            match prober.probe(path) {
                Ok(probed) => return Ok(probed),
                Err(e) => {
                    tracing::debug!(
                        prober = prober.name(),
                        error = %e,
                        "prober failed, trying next"
                    );
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            tf_core::Error::Probe(format!("no prober supports file: {}", path.display()))
        }))
    }
}
