//! The [`Prober`] trait defining the interface for metadata probing.

use std::path::Path;

use crate::record::ProbedFile;

/// A metadata source capable of listing the streams of one file.
///
/// Implementations must be safe to share across threads (`Send + Sync`).
pub trait Prober: Send + Sync {
    /// Human-readable name identifying this prober implementation.
    fn name(&self) -> &'static str;

    /// Probe a file at the given path and return one record per stream.
    ///
    /// Streams the pipeline cannot carry (attachments, cover art, data) are
    /// omitted rather than reported.
    fn probe(&self, path: &Path) -> tf_core::Result<ProbedFile>;

    /// Check whether this prober supports the given file path.
    ///
    /// Typically checks the file name or extension. A return value of `true`
    /// does not guarantee that [`Prober::probe`] will succeed.
    fn supports(&self, path: &Path) -> bool;
}
