//! Video decisions: keep or re-encode, and the full x264 parameter set.

use tf_core::config::Policy;
use tf_core::{
    Codec, ColorRange, ColorSpace, CropRect, Error, FieldOrder, FpsStandard, Result, TrackType,
    Tune,
};
use tf_probe::{Track, VideoProps};
use tf_rules::Disambiguator;
use tracing::{debug, warn};

use crate::plan::{MuxSource, Operation, Step, TrackAction, TrackPlan, VideoEncode, VideoFilter};
use crate::workspace::Workspace;

const TARGET_PROFILE: &str = "High";
const TARGET_LEVEL: u32 = 41;
const TARGET_PIXEL_FORMAT: &str = "yuv420p";

/// Whether the source already matches the encode target and carries a
/// recoverable CRF, i.e. it was produced by an earlier run.
pub fn already_encoded(track: &Track) -> bool {
    track.codec == Codec::H264
        && track.profile.as_deref() == Some(TARGET_PROFILE)
        && track.level == Some(TARGET_LEVEL)
        && track.video.as_ref().is_some_and(|v| v.crf.is_some())
}

/// Whether policy and source history call for a re-encode.
pub fn needs_recode(track: &Track, policy: &Policy) -> bool {
    policy.recode_video || !(policy.keep_video && already_encoded(track))
}

pub(crate) fn compile(
    track: &Track,
    policy: &Policy,
    crop: Option<CropRect>,
    workspace: &mut Workspace,
    disambiguator: &mut dyn Disambiguator,
) -> Result<TrackPlan> {
    let mut plan = TrackPlan::pass_through(track.id.clone(), TrackType::Video);
    if !needs_recode(track, policy) {
        debug!(track = %track.id, "source video kept");
        return Ok(plan);
    }

    let props = track.video.as_ref().ok_or_else(|| {
        Error::UnsupportedInput(format!("{} has no picture properties", track.id))
    })?;
    if props.width == 0 || props.height == 0 {
        return Err(Error::UnsupportedInput(format!(
            "{} has an unknown frame size",
            track.id
        )));
    }

    let source_range = source_range(track, props)?;
    let color_space = target_color_space(track, props, policy.keep_colorspace)?;
    let field_order = field_order(track, props, disambiguator)?;
    let tune = match policy.tune {
        Some(tune) => tune,
        None => ask_tune(disambiguator)?,
    };

    let encode = VideoEncode {
        tune,
        crf: tune.crf(),
        filters: filters(props, field_order, crop, policy),
        source_range,
        color_space,
    };
    debug!(
        track = %track.id,
        tune = %tune,
        colorspace = %color_space,
        filters = encode.filters.len(),
        "video will be re-encoded"
    );

    let output = workspace.temp_file("mkv");
    plan.action = TrackAction::Recode;
    plan.steps.push(Step::new(
        Operation::EncodeVideo {
            input: track.id.source().to_path_buf(),
            stream: track.id.index(),
            output: output.clone(),
            encode,
        },
        vec![output.clone()],
    ));
    plan.source = MuxSource {
        path: output,
        stream: 0,
    };
    Ok(plan)
}

/// Only limited-range 4:2:0 sources are encoded; a missing range on such a
/// source is taken as limited.
fn source_range(track: &Track, props: &VideoProps) -> Result<ColorRange> {
    if let Some(format) = props.pixel_format.as_deref() {
        if format != TARGET_PIXEL_FORMAT {
            return Err(Error::UnsupportedInput(format!(
                "{} has pixel format {format}, expected {TARGET_PIXEL_FORMAT}",
                track.id
            )));
        }
    }
    match props.color_range.unwrap_or(ColorRange::Tv) {
        ColorRange::Tv => Ok(ColorRange::Tv),
        ColorRange::Pc => Err(Error::UnsupportedInput(format!(
            "{} is full range",
            track.id
        ))),
    }
}

/// Colorspace the encode is tagged with.
///
/// # Errors
///
/// - [`Error::UnsupportedInput`] for an SD source with an unrecognised
///   frame rate.
/// - [`Error::ColorspaceConversion`] when the source is tagged differently
///   from the derived target and `keep_source` is off.
pub fn target_color_space(track: &Track, props: &VideoProps, keep_source: bool) -> Result<ColorSpace> {
    let standard = props.frame_rate.as_deref().and_then(FpsStandard::from_rate);
    let derived = ColorSpace::for_source(props.height, standard).ok_or_else(|| {
        Error::UnsupportedInput(format!(
            "{}: frame rate {} is neither PAL nor NTSC",
            track.id,
            props.frame_rate.as_deref().unwrap_or("unknown")
        ))
    })?;

    let Some(found) = props.color_space.as_deref() else {
        return Ok(derived);
    };
    if found == derived.matrix() {
        return Ok(derived);
    }
    if !keep_source {
        return Err(Error::ColorspaceConversion {
            found: found.to_string(),
            target: derived.to_string(),
        });
    }
    let kept = [ColorSpace::Bt709, ColorSpace::Bt470bg, ColorSpace::Smpte170m]
        .into_iter()
        .find(|c| c.matrix() == found);
    match kept {
        Some(kept) => Ok(kept),
        None => {
            warn!(track = %track.id, colorspace = found, "unknown source colorspace, tagging {derived}");
            Ok(derived)
        }
    }
}

fn field_order(
    track: &Track,
    props: &VideoProps,
    disambiguator: &mut dyn Disambiguator,
) -> Result<FieldOrder> {
    if let Some(order) = props.field_order {
        return Ok(order);
    }
    let options: Vec<String> = FieldOrder::ALL.iter().map(ToString::to_string).collect();
    let question = format!("Specify field order of {}", track.id);
    match disambiguator.choose_option(&question, &options) {
        Ok(index) => FieldOrder::ALL.get(index).copied().ok_or(Error::Unanswered { question }),
        Err(Error::Unanswered { .. }) => Err(Error::FieldOrderUndetermined {
            track: track.id.to_string(),
        }),
        Err(e) => Err(e),
    }
}

fn ask_tune(disambiguator: &mut dyn Disambiguator) -> Result<Tune> {
    let options: Vec<String> = Tune::ALL.iter().map(ToString::to_string).collect();
    let question = "Enter tune".to_string();
    let index = disambiguator.choose_option(&question, &options)?;
    Tune::ALL.get(index).copied().ok_or(Error::Unanswered { question })
}

/// The filter chain in fixed order: deinterlace, crop, aspect, scale.
///
/// The crop window defaults to the full frame and is shrunk to the encoder's
/// alignment; it is only emitted when it differs from the full frame.
pub fn filters(
    props: &VideoProps,
    field_order: FieldOrder,
    crop: Option<CropRect>,
    policy: &Policy,
) -> Vec<VideoFilter> {
    let mut filters = Vec::new();
    if let Some(parity) = field_order.yadif_parity() {
        filters.push(VideoFilter::Deinterlace { parity });
    }

    let mut window = crop.unwrap_or(CropRect::new(props.width, props.height, 0, 0));
    if !window.is_aligned() {
        let fixed = window.corrected();
        debug!(from = %window, to = %fixed, "adjusting crop to encoder alignment");
        window = fixed;
    }
    if !window.is_full_frame(props.width, props.height) {
        filters.push(VideoFilter::Crop(window));
    }

    if let Some(aspect) = &policy.aspect {
        filters.push(VideoFilter::Aspect(aspect.clone()));
    }
    if let Some(scale) = &policy.scale {
        filters.push(VideoFilter::Scale(scale.clone()));
    }
    filters
}
