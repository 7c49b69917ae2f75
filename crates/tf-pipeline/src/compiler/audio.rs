//! Audio decisions: keep, stream-copy, or run the recode chain.
//!
//! The recode chain is decode to WAV (downmixing on the way when needed),
//! an optional loudness pass, and the lossy encode. Codecs in the plain
//! recode set skip the WAV stage when ffmpeg encodes and nothing else needs
//! it.

use tf_core::config::{AudioClass, AudioEncoder, AudioPolicy, Policy};
use tf_core::{Error, Result, TrackType};
use tf_probe::Track;
use tracing::debug;

use crate::plan::{AudioEncode, MuxSource, Operation, Step, TrackAction, TrackPlan};
use crate::workspace::Workspace;

/// qaac true-VBR quality for full-channel and downmixed encodes.
const QAAC_TVBR: u8 = 91;
const QAAC_TVBR_DOWNMIX: u8 = 63;

/// Target channel count when the track is wider than the policy ceiling.
pub fn downmix_target(track: &Track, policy: &Policy) -> Option<u32> {
    let ceiling = policy.downmix_channels?;
    let channels = track.channels()?;
    (channels > ceiling).then_some(ceiling)
}

pub(crate) fn compile(
    track: &Track,
    policy: &Policy,
    audio: &AudioPolicy,
    workspace: &mut Workspace,
) -> Result<TrackPlan> {
    let class = audio
        .class_of(track.codec)
        .ok_or_else(|| Error::unsupported_codec(track.codec.to_string(), track.id.source()))?;
    let downmix = downmix_target(track, policy);
    let recode = policy.recode_audio
        || downmix.is_some()
        || matches!(class, AudioClass::Recode | AudioClass::LosslessIntermediate);

    let mut plan = TrackPlan::pass_through(track.id.clone(), TrackType::Audio);
    let input = track.id.source().to_path_buf();
    let stream = track.id.index();

    if !recode {
        if class == AudioClass::Normalize {
            let output = workspace.temp_file(track.codec.extension());
            plan.action = TrackAction::Extract;
            plan.steps.push(Step::new(
                Operation::CopyStream {
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
        debug!(track = %track.id, codec = %track.codec, action = %plan.action, "audio planned");
        return Ok(plan);
    }

    let encode = match audio.encoder {
        AudioEncoder::Qaac => AudioEncode::Qaac {
            tvbr: if downmix.is_some() {
                QAAC_TVBR_DOWNMIX
            } else {
                QAAC_TVBR
            },
        },
        AudioEncoder::Ffmpeg => AudioEncode::Ffmpeg {
            bitrate: audio.bitrate.clone(),
        },
    };
    let direct = class == AudioClass::Recode && audio.encoder == AudioEncoder::Ffmpeg && !audio.loudnorm;

    let (encode_input, encode_stream, encode_channels) = if direct {
        (input, Some(stream), downmix)
    } else {
        let wav = workspace.temp_file("wav");
        plan.steps.push(Step::new(
            Operation::DecodeAudio {
                input,
                stream,
                output: wav.clone(),
                channels: downmix,
            },
            vec![wav.clone()],
        ));
        let wav = if audio.loudnorm {
            let normalized = workspace.temp_file("wav");
            plan.steps.push(Step::new(
                Operation::Loudnorm {
                    input: wav,
                    output: normalized.clone(),
                },
                vec![normalized.clone()],
            ));
            normalized
        } else {
            wav
        };
        (wav, None, None)
    };

    let m4a = workspace.temp_file("m4a");
    plan.steps.push(Step::new(
        Operation::EncodeAudio {
            input: encode_input,
            stream: encode_stream,
            output: m4a.clone(),
            channels: encode_channels,
            encode,
        },
        vec![m4a.clone()],
    ));
    plan.action = TrackAction::Recode;
    plan.source = MuxSource {
        path: m4a,
        stream: 0,
    };
    debug!(
        track = %track.id,
        codec = %track.codec,
        downmix = ?downmix,
        steps = plan.steps.len(),
        "audio will be re-encoded"
    );
    Ok(plan)
}
