//! tf-core: shared types, identifiers, errors, and policy configuration.
//!
//! This crate is the foundational dependency for all other tf-* crates,
//! providing the unified error type, media-domain enums, the closed codec
//! table, the language table, and the policy types that drive resolution
//! and plan compilation.

pub mod codec;
pub mod config;
pub mod error;
pub mod ids;
pub mod lang;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use codec::{Codec, CodecKind, CodecProps};
pub use error::{Error, ErrorScope, Result};
pub use ids::QualifiedId;
pub use media::*;
