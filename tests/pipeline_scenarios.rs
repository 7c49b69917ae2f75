//! End-to-end planning scenarios: probe records in, plans and scripts out.

mod common;

use assert_matches::assert_matches;
use std::collections::HashMap;
use std::path::PathBuf;

use common::{audio, subtitle, video, FakeProber, QuietSource};
use tf_core::config::{Config, WantedSlot, WantedTracks};
use tf_core::{CropRect, Error, TrackType, Tune};
use tf_pipeline::plan::{Operation, VideoFilter};
use tf_pipeline::{Emitter, ScriptRenderer, TrackAction};
use tf_rules::{Disambiguator, NonInteractive, SlotRequest, TrackChoice};
use trackforge::config::CropMap;
use trackforge::grouping::Movie;
use trackforge::processor::Processor;

const HEAT: &str = "/movies/Heat/Heat.mkv";
const RONIN: &str = "/movies/Ronin/Ronin.mkv";

fn movie(main: &str, satellites: &[&str]) -> Movie {
    Movie {
        main: PathBuf::from(main),
        satellites: satellites.iter().map(PathBuf::from).collect(),
    }
}

fn config(slots: Vec<WantedSlot>) -> Config {
    let mut config = Config::default();
    config.tracks = WantedTracks::new(slots);
    config.policy.tune = Some(Tune::Film);
    config.paths.temp_dir = Some(PathBuf::from("/tmp/tf"));
    config
}

fn heat_prober() -> FakeProber {
    FakeProber::new().file(
        HEAT,
        vec![
            video(HEAT, 0, 1080),
            audio(HEAT, 1, "aac_lc", "eng", 2),
            audio(HEAT, 2, "ac3", "rus", 6),
            subtitle(HEAT, 3, "eng", "Forced", 5),
            subtitle(HEAT, 4, "eng", "Full", 120),
        ],
    )
}

fn heat_config() -> Config {
    let mut config = config(vec![
        WantedSlot::new(TrackType::Video, false, &["und"]),
        WantedSlot::new(TrackType::Audio, false, &["eng", "rus"]),
        WantedSlot::new(TrackType::Subtitle, true, &["eng"]),
    ]);
    config.policy.downmix_channels = Some(2);
    config
}

#[test]
fn forced_subtitle_and_downmix_scenario() {
    let config = heat_config();
    let prober = heat_prober();
    let source = QuietSource::default();
    let plan = Processor::new(&config, &prober, &source)
        .plan_movie(&movie(HEAT, &[]), &mut NonInteractive)
        .unwrap();

    let summary: Vec<(u32, TrackAction, &str, bool)> = plan
        .tracks
        .iter()
        .map(|t| (t.id.index(), t.action, t.language.as_str(), t.forced))
        .collect();
    assert_eq!(
        summary,
        [
            (0, TrackAction::Recode, "eng", false),
            (1, TrackAction::PassThrough, "eng", false),
            (2, TrackAction::Recode, "rus", false),
            (3, TrackAction::Extract, "eng", true),
        ]
    );

    let rus = &plan.tracks[2];
    assert_matches!(
        rus.steps[0].operation,
        Operation::DecodeAudio {
            channels: Some(2),
            ..
        }
    );
    assert_matches!(plan.tracks[3].steps[0].operation, Operation::ConvertSubtitle { stream: 3, .. });

    assert!(plan.tracks[1].default);
    assert!(!plan.tracks[2].default);
    assert!(plan.tracks[3].default);
    assert_eq!(plan.target, PathBuf::from(HEAT));
}

#[test]
fn scenario_script_runs_every_step_then_muxes() {
    let config = heat_config();
    let prober = heat_prober();
    let source = QuietSource::default();
    let plan = Processor::new(&config, &prober, &source)
        .plan_movie(&movie(HEAT, &[]), &mut NonInteractive)
        .unwrap();

    let pipeline = Emitter::new(&config.policy).emit(&plan);
    let programs: Vec<&str> = pipeline.commands().map(|c| c.program.as_str()).collect();
    assert_eq!(programs, ["ffmpeg", "ffmpeg", "ffmpeg", "ffmpeg", "mkvmerge"]);

    let paths = HashMap::new();
    let script = ScriptRenderer::new(&paths).render(&[pipeline]);
    assert!(script.contains("movie_1() {"));
    assert!(script.contains("-ac 2 -f wav -rf64 auto /tmp/tf/Heat.tf02.wav || return 1"));
    assert!(script.contains("--track-order 0:0,1:1,2:0,3:0 || [ $? -eq 1 ] || return 1"));
    assert!(script.contains("mv -f -- /tmp/tf/Heat.tfmux.mkv /movies/Heat/Heat.mkv || return 1"));
}

#[test]
fn satellite_subtitle_passes_through() {
    let srt = "/movies/Heat/Heat.rus.srt";
    let prober = heat_prober().file(srt, vec![subtitle(srt, 0, "rus", "", 900)]);
    let config = config(vec![
        WantedSlot::new(TrackType::Video, false, &["und"]),
        WantedSlot::new(TrackType::Audio, false, &["eng"]),
        WantedSlot::new(TrackType::Subtitle, false, &["rus"]),
    ]);
    let source = QuietSource::default();
    let plan = Processor::new(&config, &prober, &source)
        .plan_movie(&movie(HEAT, &[srt]), &mut NonInteractive)
        .unwrap();

    assert_eq!(plan.sources.len(), 2);
    let sub = plan.of_type(TrackType::Subtitle).next().unwrap();
    assert_eq!(sub.action, TrackAction::PassThrough);
    assert_eq!(sub.source.path, PathBuf::from(srt));
    assert_eq!(sub.language, "rus");
}

#[test]
fn crop_map_window_is_corrected() {
    let config = heat_config();
    let prober = heat_prober();
    let source = QuietSource::default();
    let crops = CropMap::parse(r#"Heat = "1917:1079:10:10""#).unwrap();
    let plan = Processor::new(&config, &prober, &source)
        .with_crop_map(crops)
        .plan_movie(&movie(HEAT, &[]), &mut NonInteractive)
        .unwrap();

    let Operation::EncodeVideo { encode, .. } = &plan.video().unwrap().steps[0].operation else {
        panic!("expected video encode");
    };
    assert_eq!(encode.filters, [VideoFilter::Crop(CropRect::new(1904, 1072, 17, 14))]);
}

#[test]
fn sd_source_tagged_hd_is_rejected() {
    let mut record = video(RONIN, 0, 480);
    record.frame_rate = Some("30000/1001".into());
    record.color_space = Some("bt709".into());
    let prober = FakeProber::new().file(RONIN, vec![record, audio(RONIN, 1, "ac3", "eng", 2)]);
    let config = config(WantedTracks::default().slots().to_vec());
    let source = QuietSource::default();

    let err = Processor::new(&config, &prober, &source)
        .plan_movie(&movie(RONIN, &[]), &mut NonInteractive)
        .unwrap_err();
    assert_matches!(err, Error::ColorspaceConversion { .. });
    assert_eq!(
        err.to_string(),
        "Colorspace conversion from bt709 to smpte170m is not implemented"
    );
}

#[test]
fn finished_encode_is_left_alone() {
    let mut record = video(HEAT, 0, 1080);
    record.codec_profile = Some("High".into());
    record.level = Some(41);
    let prober = FakeProber::new().file(HEAT, vec![record, audio(HEAT, 1, "aac_lc", "eng", 2)]);
    let mut config = config(WantedTracks::default().slots().to_vec());
    config.policy.keep_video = true;
    config.policy.skip_unchanged = true;
    let mut source = QuietSource::default();
    source.crf.insert(PathBuf::from(HEAT), 22.0);

    let plan = Processor::new(&config, &prober, &source)
        .plan_movie(&movie(HEAT, &[]), &mut NonInteractive)
        .unwrap();
    assert!(plan.is_unchanged());
    assert!(Emitter::new(&config.policy).emit(&plan).unchanged);
}

#[test]
fn failed_movie_does_not_stop_the_batch() {
    let prober = heat_prober().file(
        RONIN,
        vec![video(RONIN, 0, 1080), audio(RONIN, 1, "ac3", "fre", 6)],
    );
    let config = config(vec![
        WantedSlot::new(TrackType::Video, false, &["und"]),
        WantedSlot::new(TrackType::Audio, false, &["eng"]),
    ]);
    let source = QuietSource::default();
    let report = Processor::new(&config, &prober, &source)
        .run(&[movie(HEAT, &[]), movie(RONIN, &[])], &mut NonInteractive)
        .unwrap();

    assert_eq!(report.plans.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].movie, PathBuf::from(RONIN));
    assert_eq!(
        report.failures[0].error,
        "Required audio track not found: language eng, full"
    );
}

#[test]
fn movies_with_equal_stems_get_separate_temp_names() {
    let first = "/movies/a/Heat.mkv";
    let second = "/movies/b/Heat.mkv";
    let records = |path| {
        vec![
            video(path, 0, 1080),
            audio(path, 1, "aac_lc", "eng", 2),
            audio(path, 2, "ac3", "rus", 6),
        ]
    };
    let prober = FakeProber::new()
        .file(first, records(first))
        .file(second, records(second));
    let mut config = config(vec![
        WantedSlot::new(TrackType::Video, false, &["und"]),
        WantedSlot::new(TrackType::Audio, false, &["eng", "rus"]),
    ]);
    config.policy.downmix_channels = Some(2);
    let source = QuietSource::default();

    let report = Processor::new(&config, &prober, &source)
        .run(&[movie(first, &[]), movie(second, &[])], &mut NonInteractive)
        .unwrap();
    assert_eq!(report.plans.len(), 2);

    let (a, b) = (&report.plans[0], &report.plans[1]);
    assert_eq!(a.mux_output, PathBuf::from("/tmp/tf/Heat.001.tfmux.mkv"));
    assert_eq!(b.mux_output, PathBuf::from("/tmp/tf/Heat.002.tfmux.mkv"));

    let temps = |plan: &tf_pipeline::Plan| -> Vec<PathBuf> {
        plan.tracks
            .iter()
            .flat_map(|t| t.intermediates())
            .map(PathBuf::from)
            .collect()
    };
    let (ta, tb) = (temps(a), temps(b));
    assert!(!ta.is_empty());
    assert!(ta.iter().all(|p| !tb.contains(p)));
}

/// Gives up on the first question.
struct Quitter;

impl Disambiguator for Quitter {
    fn choose_track(&mut self, _slot: &SlotRequest, _candidates: &[TrackChoice]) -> tf_core::Result<usize> {
        Err(Error::Cancelled)
    }

    fn choose_option(&mut self, _question: &str, _options: &[String]) -> tf_core::Result<usize> {
        Err(Error::Cancelled)
    }
}

#[test]
fn cancelling_stops_the_run() {
    let prober = heat_prober().file(RONIN, vec![video(RONIN, 0, 1080), audio(RONIN, 1, "ac3", "eng", 2)]);
    // Both Heat audio tracks match `und`, so the first movie asks.
    let config = config(WantedTracks::default().slots().to_vec());
    let source = QuietSource::default();
    let err = Processor::new(&config, &prober, &source)
        .run(&[movie(HEAT, &[]), movie(RONIN, &[])], &mut Quitter)
        .unwrap_err();
    assert_matches!(err, Error::Cancelled);
}
