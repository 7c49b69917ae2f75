//! # tf-probe
//!
//! Probe records, track normalization, the per-movie [`Catalog`], and the
//! metadata [`Enricher`].
//!
//! Data flows one way through this crate:
//!
//! 1. A [`Prober`] turns each file into [`ProbeRecord`]s.
//! 2. [`Catalog::from_probes`] normalizes them into [`Track`]s and checks the
//!    structural invariants (unique ids, at most one chapters track).
//! 3. [`Enricher::enrich`] consumes the raw catalog and returns an enriched
//!    one, filling languages, forced flags, charsets, codec variants and CRF
//!    values from heuristics and a [`MetadataSource`].
//!
//! ```no_run
//! use tf_probe::{Catalog, CompositeProber, Prober};
//! use std::path::Path;
//!
//! # fn example(prober: &CompositeProber) -> tf_core::Result<()> {
//! let main = Path::new("/movies/Heat.mkv");
//! let probes = vec![prober.probe(main)?];
//! let catalog = Catalog::from_probes(main, probes)?;
//! println!("{} tracks", catalog.tracks().len());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod chapters;
pub mod composite;
pub mod enrich;
pub mod prober;
pub mod record;
pub mod track;

// Re-export key types at crate root for convenience.
pub use catalog::Catalog;
pub use chapters::ChaptersProber;
pub use composite::CompositeProber;
pub use enrich::{CharsetGuess, Enricher, MetadataSource, TrackDetail};
pub use prober::Prober;
pub use record::{ProbeRecord, ProbedFile};
pub use track::{AudioProps, Track, VideoProps};
