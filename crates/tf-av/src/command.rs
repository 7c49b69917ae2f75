//! Running the metadata tools.
//!
//! Only probes go through here (ffprobe, mediainfo and the ffmpeg CRF log).
//! Transcode commands are emitted into the script and never run by
//! trackforge. Probes are called from the synchronous [`tf_probe::Prober`]
//! and [`tf_probe::MetadataSource`] traits, so [`ToolCommand::run`] blocks.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

/// How long a single probe may take.
const PROBE_TIMEOUT: Duration = Duration::from_secs(120);

/// Captured output of a successful probe.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// One probe invocation.
///
/// ```no_run
/// use std::path::Path;
/// use tf_av::ToolCommand;
///
/// # fn example() -> tf_core::Result<()> {
/// let output = ToolCommand::new("ffprobe")
///     .args(["-v", "quiet", "-print_format", "json", "-show_streams"])
///     .path(Path::new("/movies/Heat/Heat.mkv"))
///     .run()?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: PROBE_TIMEOUT,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Append a media file argument.
    pub fn path(self, path: &Path) -> Self {
        let arg = path.to_string_lossy().into_owned();
        self.arg(arg)
    }

    /// Short tool name used in errors and logs.
    fn tool(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    /// Run to completion and capture both streams.
    ///
    /// # Errors
    ///
    /// [`tf_core::Error::Tool`] when the program cannot be spawned, exits
    /// non-zero (stderr is included), or outlives the probe timeout.
    pub fn run(&self) -> tf_core::Result<ToolOutput> {
        let tool = self.tool();
        block_on(&tool, self.output(&tool))
    }

    async fn output(&self, tool: &str) -> tf_core::Result<ToolOutput> {
        tracing::trace!(tool, args = ?self.args, "running probe");

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| tf_core::Error::tool(tool, format!("failed to spawn: {e}")))?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(tf_core::Error::tool(tool, format!("I/O error waiting for process: {e}")))
            }
            Err(_) => {
                return Err(tf_core::Error::tool(
                    tool,
                    format!("timed out after {:?}", self.timeout),
                ))
            }
        };

        let captured = ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if !output.status.success() {
            return Err(tf_core::Error::tool(
                tool,
                format!("exited with {}: {}", output.status, captured.stderr.trim()),
            ));
        }
        Ok(captured)
    }
}

/// Drive `future` from synchronous code, reusing the current runtime when
/// there is one.
fn block_on<T, F>(tool: &str, future: F) -> tf_core::Result<T>
where
    F: Future<Output = tf_core::Result<T>>,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => tokio::task::block_in_place(|| handle.block_on(future)),
        Err(_) => tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| tf_core::Error::tool(tool, format!("failed to start runtime: {e}")))?
            .block_on(future),
    }
}
