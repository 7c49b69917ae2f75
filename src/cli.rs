use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tf_core::config::Config;
use tf_core::{CropRect, Tune};

#[derive(Parser)]
#[command(name = "trackforge")]
#[command(author, version, about = "Track resolution and transcode planning for movie files")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve and compile plans for the given files or directories
    Plan {
        /// Movie files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Plan, then write a shell script that runs every command
    Script {
        /// Movie files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write the script here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Probe a media file and display its normalized tracks
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

/// Command-line overrides of the `[policy]` and `[paths]` sections.
#[derive(Args, Debug, Default, Clone)]
pub struct PolicyArgs {
    /// Keep the source video when it already meets the encode target
    #[arg(long)]
    pub keep_video: bool,

    /// Always re-encode the video
    #[arg(long)]
    pub recode_video: bool,

    /// Always re-encode every audio track
    #[arg(long)]
    pub recode_audio: bool,

    /// Encode tune (animation, film, trash, supertrash)
    #[arg(long)]
    pub tune: Option<Tune>,

    /// Display aspect ratio, e.g. 16:9
    #[arg(long)]
    pub aspect: Option<String>,

    /// Scale filter target, e.g. 1280:-2
    #[arg(long)]
    pub scale: Option<String>,

    /// Downmix tracks with more channels than this
    #[arg(long, value_name = "CHANNELS")]
    pub downmix: Option<u32>,

    /// Crop window w:h:x:y applied to every movie
    #[arg(long)]
    pub crop: Option<CropRect>,

    /// TOML file of per-movie crop windows
    #[arg(long)]
    pub crop_map: Option<PathBuf>,

    /// Leave forced subtitle slots empty when nothing matches
    #[arg(long)]
    pub optional_forced: bool,

    /// Keep a source colorspace that differs from the target
    #[arg(long)]
    pub keep_colorspace: bool,

    /// Emit nothing for movies that need no processing
    #[arg(long)]
    pub skip_unchanged: bool,

    /// Delete source files after the result is in place
    #[arg(long)]
    pub remove_sources: bool,

    /// Directory for intermediate files
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    /// Directory for finished files
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Fail ambiguous movies instead of asking
    #[arg(long)]
    pub non_interactive: bool,
}

impl PolicyArgs {
    /// Apply the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        let policy = &mut config.policy;
        policy.keep_video |= self.keep_video;
        policy.recode_video |= self.recode_video;
        policy.recode_audio |= self.recode_audio;
        policy.optional_forced |= self.optional_forced;
        policy.keep_colorspace |= self.keep_colorspace;
        policy.skip_unchanged |= self.skip_unchanged;
        policy.remove_sources |= self.remove_sources;

        if self.tune.is_some() {
            policy.tune = self.tune;
        }
        if self.aspect.is_some() {
            policy.aspect = self.aspect.clone();
        }
        if self.scale.is_some() {
            policy.scale = self.scale.clone();
        }
        if self.downmix.is_some() {
            policy.downmix_channels = self.downmix;
        }
        if self.crop.is_some() {
            policy.crop = self.crop;
        }
        if self.crop_map.is_some() {
            policy.crop_map = self.crop_map.clone();
        }
        if self.temp_dir.is_some() {
            config.paths.temp_dir = self.temp_dir.clone();
        }
        if self.output_dir.is_some() {
            config.paths.output_dir = self.output_dir.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::parse_from([
            "trackforge",
            "plan",
            "/m",
            "--tune",
            "film",
            "--crop",
            "1920:800:0:140",
            "--downmix",
            "2",
            "--keep-video",
        ]);
        let Commands::Plan { policy, .. } = cli.command else {
            panic!("expected plan");
        };

        let mut config = Config::default();
        config.policy.tune = Some(Tune::Animation);
        policy.apply(&mut config);
        assert_eq!(config.policy.tune, Some(Tune::Film));
        assert_eq!(config.policy.crop, Some(CropRect::new(1920, 800, 0, 140)));
        assert_eq!(config.policy.downmix_channels, Some(2));
        assert!(config.policy.keep_video);
        assert!(!config.policy.recode_video);
    }

    #[test]
    fn bad_crop_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["trackforge", "plan", "/m", "--crop", "wide"]).is_err());
    }
}
