//! Subtitle decisions.
//!
//! Text tracks end up as SubRip: a standalone `.srt` passes through with its
//! detected charset, everything else is converted by ffmpeg. PGS tracks are
//! extracted and converted to a VobSub pair; VobSub passes through.

use tf_core::{lang, Codec, Error, Result, TrackType};
use tf_probe::{Catalog, Track};
use tracing::debug;

use crate::plan::{MuxSource, Operation, Step, TrackAction, TrackPlan};
use crate::workspace::{vobsub_companion, Workspace};

pub(crate) fn compile(
    track: &Track,
    catalog: &Catalog,
    workspace: &mut Workspace,
) -> Result<TrackPlan> {
    let mut plan = TrackPlan::pass_through(track.id.clone(), TrackType::Subtitle);
    let input = track.id.source().to_path_buf();
    let stream = track.id.index();

    match track.codec {
        Codec::Subrip if catalog.is_sole_track(&track.id) => {
            plan.charset = track.encoding.clone();
        }
        Codec::Subrip | Codec::Ass | Codec::Ssa => {
            let output = workspace.temp_file("srt");
            plan.action = if track.codec == Codec::Subrip {
                TrackAction::Extract
            } else {
                TrackAction::Recode
            };
            plan.steps.push(Step::new(
                Operation::ConvertSubtitle {
                    input,
                    stream,
                    output: output.clone(),
                },
                vec![output.clone()],
            ));
            plan.source = MuxSource {
                path: output,
                stream: 0,
            };
        }
        Codec::Pgs => {
            let language = lang::alpha2(&track.language).ok_or_else(|| {
                Error::UnsupportedInput(format!(
                    "{}: bitmap subtitles need a two-letter language, '{}' has none",
                    track.id, track.language
                ))
            })?;
            let sup = workspace.temp_file("sup");
            let idx = workspace.temp_file("idx");
            let sub = vobsub_companion(&idx);
            plan.action = TrackAction::Extract;
            plan.steps.push(Step::new(
                Operation::CopyStream {
                    input,
                    stream,
                    output: sup.clone(),
                },
                vec![sup.clone()],
            ));
            plan.steps.push(Step::new(
                Operation::BitmapToVobSub {
                    input: sup,
                    output: idx.clone(),
                    language: language.to_string(),
                },
                vec![idx.clone(), sub.clone()],
            ));
            plan.source = MuxSource {
                path: idx,
                stream: 0,
            };
            plan.companions.push(sub);
        }
        Codec::DvdSub => {}
        other => {
            return Err(Error::unsupported_codec(other.to_string(), track.id.source()));
        }
    }

    debug!(track = %track.id, codec = %track.codec, action = %plan.action, "subtitle planned");
    Ok(plan)
}
