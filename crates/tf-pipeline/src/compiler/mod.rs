//! The transcode plan compiler.
//!
//! Decides, per selected track, whether it is muxed as-is, extracted, or
//! re-encoded, and records every parameter the emitter will need. The
//! compiler never touches the filesystem; questions it cannot settle from
//! policy (tune, unknown field order) go to the [`Disambiguator`].

pub mod audio;
pub mod subtitle;
pub mod video;

use std::path::PathBuf;

use tf_core::config::{AudioPolicy, Config, Policy};
use tf_core::{CropRect, Error, Result, TrackType};
use tf_probe::Catalog;
use tf_rules::{Disambiguator, Selection};
use tracing::info;

use crate::plan::{Plan, TrackAction};
use crate::workspace::Workspace;

/// Per-movie inputs that do not come from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieOptions {
    /// Where the finished file goes.
    pub target: PathBuf,
    /// Crop window for this movie, from the policy or the crop map.
    pub crop: Option<CropRect>,
}

/// Compiles resolved selections into [`Plan`]s.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    policy: Policy,
    audio: AudioPolicy,
}

impl Compiler {
    pub fn new(policy: Policy, audio: AudioPolicy) -> Self {
        Self { policy, audio }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.policy.clone(), config.audio.clone())
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Compile the plan for one resolved movie.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedCodec`] for an audio codec in no class.
    /// - [`Error::ColorspaceConversion`], [`Error::UnsupportedInput`] and
    ///   [`Error::FieldOrderUndetermined`] from the video decisions.
    /// - Whatever the disambiguator returns when asked.
    pub fn compile(
        &self,
        catalog: &Catalog,
        selection: &Selection,
        options: &MovieOptions,
        workspace: &mut Workspace,
        disambiguator: &mut dyn Disambiguator,
    ) -> Result<Plan> {
        let mut tracks = Vec::with_capacity(selection.track_count());

        for track_type in [TrackType::Video, TrackType::Audio, TrackType::Subtitle] {
            for id in selection.of_type(track_type) {
                let track = catalog
                    .track(id)
                    .ok_or_else(|| Error::InvalidCatalog(format!("selected track {id} is not in the catalog")))?;

                let mut plan = match track_type {
                    TrackType::Video => {
                        video::compile(track, &self.policy, options.crop, workspace, disambiguator)?
                    }
                    TrackType::Audio => audio::compile(track, &self.policy, &self.audio, workspace)?,
                    _ => subtitle::compile(track, catalog, workspace)?,
                };
                plan.language = track.language.clone();
                plan.forced = track.forced.unwrap_or(false);
                plan.default = selection.is_first_of_type(track_type, id);
                tracks.push(plan);
            }
        }

        let plan = Plan {
            main_file: catalog.main_file().to_path_buf(),
            sources: catalog.files().to_vec(),
            tracks,
            chapters: selection.chapters().map(|id| id.source().to_path_buf()),
            mux_output: workspace.mux_output(),
            target: options.target.clone(),
        };
        info!(
            movie = %plan.main_file.display(),
            recoded = plan.tracks.iter().filter(|t| t.action == TrackAction::Recode).count(),
            extracted = plan.tracks.iter().filter(|t| t.action == TrackAction::Extract).count(),
            "plan compiled"
        );
        Ok(plan)
    }
}
