//! # tf-pipeline
//!
//! From a resolved [`Selection`](tf_rules::Selection) to runnable commands.
//!
//! This crate provides:
//!
//! - **[`Compiler`]** -- decides per track whether it passes through, is
//!   extracted, or is re-encoded, producing a [`Plan`].
//! - **[`Workspace`]** -- deterministic temp-file naming for one movie.
//! - **[`Emitter`]** -- turns a plan into an ordered [`Pipeline`] of tool
//!   invocations and file bookkeeping, ending with the mkvmerge mux.
//! - **[`ScriptRenderer`]** -- renders pipelines as a POSIX shell script.

pub mod compiler;
pub mod emitter;
pub mod plan;
pub mod script;
pub mod workspace;

// Re-export key types at the crate root.
pub use compiler::{Compiler, MovieOptions};
pub use emitter::{CommandSpec, Emitter, ExitPolicy, Pipeline, PipelineStep};
pub use plan::{Operation, Plan, TrackAction, TrackPlan};
pub use script::{quote, ScriptRenderer};
pub use workspace::Workspace;
