//! # tf-rules
//!
//! Resolution of the wanted-track specification against a movie's
//! [`Catalog`](tf_probe::Catalog).
//!
//! ## Overview
//!
//! - [`matching`] -- the predicates deciding whether a track can fill a slot.
//! - [`Disambiguator`] -- the capability consulted when a slot has several
//!   equally valid candidates, or when the compiler needs an answer.
//! - [`Resolver`] -- walks the slots in order and produces a [`Selection`].

pub mod disambiguator;
pub mod matching;
pub mod resolver;
pub mod selection;

pub use disambiguator::{Disambiguator, NonInteractive, ScriptedDisambiguator, SlotRequest, TrackChoice};
pub use resolver::Resolver;
pub use selection::Selection;
