//! trackforge - track resolution and transcode planning for movie files
//!
//! This library crate exposes the binary's building blocks for integration
//! testing.

pub mod config;
pub mod grouping;
pub mod processor;
pub mod prompt;
