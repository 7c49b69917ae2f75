//! Configuration loading from TOML files.

use std::fs;

use assert_matches::assert_matches;
use tempfile::tempdir;
use tf_core::config::{AudioEncoder, WantedSlot};
use tf_core::{CropRect, TrackType, Tune};
use trackforge::config::{load_config, load_config_or_default, CropMap};

#[test]
fn full_config_round_trips_into_policy() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trackforge.toml");
    fs::write(
        &path,
        r#"
[[tracks]]
type = "video"
languages = ["und"]

[[tracks]]
type = "audio"
languages = ["rus", "English"]

[[tracks]]
type = "subtitle"
forced = true
languages = ["rus"]

[policy]
downmix_channels = 2
tune = "animation"
crop = "1920:800:0:140"
optional_forced = true

[audio]
encoder = "qaac"
loudnorm = true

[thresholds]
duration_tolerance = 0.1

[tools]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"

[paths]
temp_dir = "/var/tmp/tf"
"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(
        config.tracks.slots()[1],
        WantedSlot::new(TrackType::Audio, false, &["rus", "eng"])
    );
    assert_eq!(config.policy.downmix_channels, Some(2));
    assert_eq!(config.policy.tune, Some(Tune::Animation));
    assert_eq!(config.policy.crop, Some(CropRect::new(1920, 800, 0, 140)));
    assert!(config.policy.optional_forced);
    assert_eq!(config.audio.encoder, AudioEncoder::Qaac);
    assert!(config.audio.loudnorm);
    assert_eq!(config.audio.bitrate, "256k");
    assert_eq!(config.thresholds.duration_tolerance, 0.1);
    assert_eq!(config.thresholds.forced_caption_gap, 0.5);
    assert!(config.tools.ffmpeg_path.is_some());
}

#[test]
fn conflicting_crop_strategies_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(
        &path,
        r#"
[policy]
crop = "1920:800:0:140"
crop_map = "crops.toml"
"#,
    )
    .unwrap();

    let err = load_config(&path).unwrap_err();
    let root = err.root_cause().downcast_ref::<tf_core::Error>();
    assert_matches!(root, Some(tf_core::Error::Configuration(_)));
    assert!(format!("{err:#}").contains("crop and crop_map are mutually exclusive"));
}

#[test]
fn unknown_codec_in_audio_class_fails_to_parse() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[audio]\nkeep = [\"cook\"]\n").unwrap();
    assert!(load_config(&path).is_err());
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(load_config_or_default(Some(&dir.path().join("absent.toml"))).is_err());
}

#[test]
fn crop_map_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crops.toml");
    fs::write(&path, "\"Heat\" = \"1920:800:0:140\"\n").unwrap();
    let map = CropMap::load(&path).unwrap();
    assert_eq!(
        map.get(std::path::Path::new("/m/Heat.mkv")),
        Some(CropRect::new(1920, 800, 0, 140))
    );
}
