//! The command pipeline emitter.
//!
//! Turns a [`Plan`] into an ordered list of [`PipelineStep`]s: the external
//! commands of every track chain, one mkvmerge invocation, temp-file
//! removal, and the promotion of the muxed file to its target. The emitter
//! trusts the plan completely and never inspects media itself.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tf_core::config::Policy;
use tf_core::TrackType;
use tracing::debug;

use crate::plan::{AudioEncode, Operation, Plan, TrackAction, TrackPlan};

/// Exit statuses a command may end with without failing the movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitPolicy {
    /// Only 0.
    Success,
    /// 0, or 1 for "finished with warnings" (mkvmerge).
    AllowWarnings,
}

impl ExitPolicy {
    pub fn accepts(&self, code: i32) -> bool {
        match self {
            Self::Success => code == 0,
            Self::AllowWarnings => code == 0 || code == 1,
        }
    }
}

/// An external program invocation.
///
/// `program` is the tool name; the script renderer maps it to a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub exit: ExitPolicy,
}

impl CommandSpec {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            exit: ExitPolicy::Success,
        }
    }

    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    pub fn path(&mut self, path: &Path) -> &mut Self {
        self.arg(path.to_string_lossy())
    }
}

/// One entry of a movie's pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum PipelineStep {
    Run { command: CommandSpec },
    Remove { paths: Vec<PathBuf> },
    MakeDir { path: PathBuf },
    /// Move the finished file into place.
    Promote { from: PathBuf, to: PathBuf },
}

/// Everything to run for one movie, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pipeline {
    pub movie: PathBuf,
    pub steps: Vec<PipelineStep>,
    /// The movie needed no processing and was skipped.
    pub unchanged: bool,
}

impl Pipeline {
    /// The external commands, without the file bookkeeping.
    pub fn commands(&self) -> impl Iterator<Item = &CommandSpec> {
        self.steps.iter().filter_map(|s| match s {
            PipelineStep::Run { command } => Some(command),
            _ => None,
        })
    }
}

/// Emitter switches taken from the policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Emitter {
    skip_unchanged: bool,
    remove_sources: bool,
}

impl Emitter {
    pub fn new(policy: &Policy) -> Self {
        Self {
            skip_unchanged: policy.skip_unchanged,
            remove_sources: policy.remove_sources,
        }
    }

    /// Build the pipeline for one plan.
    pub fn emit(&self, plan: &Plan) -> Pipeline {
        if self.skip_unchanged && plan.is_unchanged() {
            debug!(movie = %plan.main_file.display(), "unchanged, nothing to emit");
            return Pipeline {
                movie: plan.main_file.clone(),
                steps: Vec::new(),
                unchanged: true,
            };
        }

        let mut steps = Vec::new();
        for track in &plan.tracks {
            for step in &track.steps {
                steps.push(PipelineStep::Run {
                    command: operation_command(&step.operation),
                });
            }
            let intermediates: Vec<PathBuf> =
                track.intermediates().into_iter().map(Path::to_path_buf).collect();
            if !intermediates.is_empty() {
                steps.push(PipelineStep::Remove {
                    paths: intermediates,
                });
            }
        }

        steps.push(PipelineStep::Run {
            command: mux_command(plan),
        });

        let mut mux_files: Vec<PathBuf> = plan
            .tracks
            .iter()
            .flat_map(TrackPlan::mux_files)
            .map(Path::to_path_buf)
            .collect();
        mux_files.sort();
        mux_files.dedup();
        if !mux_files.is_empty() {
            steps.push(PipelineStep::Remove { paths: mux_files });
        }

        if let Some(dir) = plan.target.parent().filter(|d| !d.as_os_str().is_empty()) {
            steps.push(PipelineStep::MakeDir {
                path: dir.to_path_buf(),
            });
        }
        steps.push(PipelineStep::Promote {
            from: plan.mux_output.clone(),
            to: plan.target.clone(),
        });

        if self.remove_sources {
            // Promotion may have replaced a source in place.
            let sources: Vec<PathBuf> = plan
                .sources
                .iter()
                .filter(|s| **s != plan.target)
                .cloned()
                .collect();
            if !sources.is_empty() {
                steps.push(PipelineStep::Remove { paths: sources });
            }
        }

        debug!(movie = %plan.main_file.display(), steps = steps.len(), "pipeline emitted");
        Pipeline {
            movie: plan.main_file.clone(),
            steps,
            unchanged: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Track operations
// ---------------------------------------------------------------------------

fn ffmpeg() -> CommandSpec {
    let mut cmd = CommandSpec::new("ffmpeg");
    cmd.args(["-v", "error", "-stats", "-y"]);
    cmd
}

/// Input, metadata stripping and stream selection shared by extractions.
fn ffmpeg_extract(input: &Path, stream: u32) -> CommandSpec {
    let mut cmd = ffmpeg();
    cmd.arg("-i").path(input);
    cmd.args(["-map_metadata", "-1", "-map_chapters", "-1"]);
    cmd.arg("-map").arg(format!("0:{stream}"));
    cmd
}

/// Render one plan operation as a command.
pub fn operation_command(operation: &Operation) -> CommandSpec {
    match operation {
        Operation::EncodeVideo {
            input,
            stream,
            output,
            encode,
        } => {
            let mut cmd = ffmpeg();
            cmd.arg("-color_range").arg(encode.source_range.to_string());
            cmd.arg("-i").path(input);
            cmd.arg("-map").arg(format!("0:{stream}"));
            cmd.args(["-an", "-sn", "-dn"]);
            if !encode.filters.is_empty() {
                let chain: Vec<String> = encode.filters.iter().map(ToString::to_string).collect();
                cmd.arg("-filter:v").arg(chain.join(","));
            }
            cmd.args(["-c:v", "libx264", "-preset", "veryslow", "-pix_fmt", "yuv420p"]);
            cmd.arg("-tune").arg(encode.tune.x264_tune());
            cmd.args(["-profile:v", "high", "-level:v", "4.1"]);
            cmd.arg("-crf").arg(encode.crf.to_string());
            cmd.args(["-map_metadata", "-1", "-map_chapters", "-1"]);
            cmd.args(["-color_range", "tv"]);
            cmd.arg("-color_primaries").arg(encode.color_space.primaries());
            cmd.arg("-color_trc").arg(encode.color_space.transfer());
            cmd.arg("-colorspace").arg(encode.color_space.matrix());
            cmd.path(output);
            cmd
        }
        Operation::CopyStream {
            input,
            stream,
            output,
        } => {
            let mut cmd = ffmpeg_extract(input, *stream);
            cmd.args(["-c", "copy"]);
            cmd.path(output);
            cmd
        }
        Operation::DecodeAudio {
            input,
            stream,
            output,
            channels,
        } => {
            let mut cmd = ffmpeg_extract(input, *stream);
            if let Some(n) = channels {
                cmd.arg("-ac").arg(n.to_string());
            }
            cmd.args(["-f", "wav", "-rf64", "auto"]);
            cmd.path(output);
            cmd
        }
        Operation::Loudnorm { input, output } => {
            let mut cmd = ffmpeg();
            cmd.arg("-i").path(input);
            cmd.args(["-af", "loudnorm", "-f", "wav", "-rf64", "auto"]);
            cmd.path(output);
            cmd
        }
        Operation::EncodeAudio {
            input,
            stream,
            output,
            channels,
            encode,
        } => match encode {
            AudioEncode::Qaac { tvbr } => {
                let mut cmd = CommandSpec::new("qaac");
                cmd.arg("--tvbr").arg(tvbr.to_string());
                cmd.args(["--quality", "2", "--rate", "keep", "--no-delay"]);
                cmd.path(input);
                cmd.arg("-o").path(output);
                cmd
            }
            AudioEncode::Ffmpeg { bitrate } => {
                let mut cmd = match stream {
                    Some(stream) => ffmpeg_extract(input, *stream),
                    None => {
                        let mut cmd = ffmpeg();
                        cmd.arg("-i").path(input);
                        cmd
                    }
                };
                if let Some(n) = channels {
                    cmd.arg("-ac").arg(n.to_string());
                }
                cmd.args(["-c:a", "aac"]);
                cmd.arg("-b:a").arg(bitrate.as_str());
                cmd.path(output);
                cmd
            }
        },
        Operation::ConvertSubtitle {
            input,
            stream,
            output,
        } => {
            let mut cmd = ffmpeg_extract(input, *stream);
            cmd.args(["-c:s", "text"]);
            cmd.path(output);
            cmd
        }
        Operation::BitmapToVobSub {
            input,
            output,
            language,
        } => {
            let mut cmd = CommandSpec::new("bdsup2sub");
            cmd.arg("-l").arg(language.as_str());
            cmd.arg("-o").path(output);
            cmd.path(input);
            cmd
        }
    }
}

// ---------------------------------------------------------------------------
// Mux
// ---------------------------------------------------------------------------

const TYPE_FLAGS: [(TrackType, &str, &str); 3] = [
    (TrackType::Video, "--video-tracks", "-D"),
    (TrackType::Audio, "--audio-tracks", "-A"),
    (TrackType::Subtitle, "--subtitle-tracks", "-S"),
];

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// The mkvmerge invocation for a plan.
///
/// Inputs are the distinct mux sources in output order. Every track gets its
/// name cleared and its language, default and forced flags set explicitly;
/// the track order follows the plan.
pub fn mux_command(plan: &Plan) -> CommandSpec {
    let mut files: Vec<&Path> = Vec::new();
    for track in &plan.tracks {
        if !files.contains(&track.source.path.as_path()) {
            files.push(&track.source.path);
        }
    }

    let mut cmd = CommandSpec::new("mkvmerge");
    cmd.exit = ExitPolicy::AllowWarnings;
    cmd.arg("--output").path(&plan.mux_output);
    cmd.args([
        "--no-track-tags",
        "--no-global-tags",
        "--disable-track-statistics-tags",
    ]);

    for file in &files {
        let in_file: Vec<&TrackPlan> = plan
            .tracks
            .iter()
            .filter(|t| t.source.path.as_path() == *file)
            .collect();

        for (track_type, keep_flag, none_flag) in TYPE_FLAGS {
            let ids: Vec<String> = in_file
                .iter()
                .filter(|t| t.track_type == track_type)
                .map(|t| t.source.stream.to_string())
                .collect();
            if ids.is_empty() {
                cmd.arg(none_flag);
            } else {
                cmd.arg(keep_flag).arg(ids.join(","));
            }
        }

        for track in &in_file {
            let id = track.source.stream;
            cmd.arg("--track-name").arg(format!("{id}:"));
            cmd.arg("--language").arg(format!("{id}:{}", track.language));
            cmd.arg("--default-track").arg(format!("{id}:{}", yes_no(track.default)));
            cmd.arg("--forced-track").arg(format!("{id}:{}", yes_no(track.forced)));
            if let Some(charset) = &track.charset {
                if track.action == TrackAction::PassThrough {
                    cmd.arg("--sub-charset").arg(format!("{id}:{charset}"));
                }
            }
        }

        // The main file's own chapters survive only when no chapters file
        // replaces them.
        if !(*file == plan.main_file.as_path() && plan.chapters.is_none()) {
            cmd.arg("--no-chapters");
        }
        cmd.args([
            "--no-attachments",
            "--no-buttons",
            "--no-global-tags",
            "--no-track-tags",
        ]);
        cmd.path(file);
    }

    if let Some(chapters) = &plan.chapters {
        cmd.arg("--chapters").path(chapters);
    }
    cmd.args(["--title", ""]);

    let order: Vec<String> = plan
        .tracks
        .iter()
        .filter_map(|t| {
            let file = files.iter().position(|f| *f == t.source.path.as_path())?;
            Some(format!("{file}:{}", t.source.stream))
        })
        .collect();
    cmd.arg("--track-order").arg(order.join(","));
    cmd
}
