//! # tf-av
//!
//! External tool management and tool-backed metadata for trackforge.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache paths to ffmpeg,
//!   ffprobe, mediainfo, mkvmerge, qaac, and bdsup2sub.
//! - **Probe execution** ([`ToolCommand`]) -- blocking runs of the metadata
//!   tools with a timeout, on tokio's process support.
//! - **Probe backends** ([`probe::FfprobeProber`], [`probe::MediaInfoProbe`])
//!   -- turn CLI output into probe records and per-track details.
//! - **Enrichment queries** ([`ToolMetadataSource`]) -- CRF recovery,
//!   charset detection and codec-variant details behind
//!   [`tf_probe::MetadataSource`].

pub mod charset;
pub mod command;
pub mod crf;
pub mod metadata;
pub mod probe;
pub mod tools;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use crf::CrfProbe;
pub use metadata::ToolMetadataSource;
pub use probe::{FfprobeProber, MediaInfoProbe};
pub use tools::{ToolConfig, ToolInfo, ToolRegistry, KNOWN_TOOLS};
