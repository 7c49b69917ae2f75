//! POSIX shell rendering of emitted pipelines.
//!
//! Each movie becomes a shell function whose commands stop at the first
//! failure; the driver runs every function, counts failures, and exits
//! non-zero when any movie failed.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::emitter::{CommandSpec, ExitPolicy, Pipeline, PipelineStep};

/// Quote `arg` for `sh`, leaving plain words untouched.
pub fn quote(arg: &str) -> Cow<'_, str> {
    let plain = !arg.is_empty()
        && arg
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"/._-+:,=@%".contains(&b));
    if plain {
        Cow::Borrowed(arg)
    } else {
        Cow::Owned(format!("'{}'", arg.replace('\'', r"'\''")))
    }
}

fn quote_path(path: &Path) -> String {
    quote(&path.to_string_lossy()).into_owned()
}

/// Renders pipelines with tool names resolved to concrete programs.
#[derive(Debug, Clone, Copy)]
pub struct ScriptRenderer<'a> {
    programs: &'a HashMap<String, PathBuf>,
}

impl<'a> ScriptRenderer<'a> {
    /// `programs` maps tool names to paths; unknown tools are left to `PATH`.
    pub fn new(programs: &'a HashMap<String, PathBuf>) -> Self {
        Self { programs }
    }

    fn command_line(&self, command: &CommandSpec) -> String {
        let program = match self.programs.get(&command.program) {
            Some(path) => quote_path(path),
            None => quote(&command.program).into_owned(),
        };
        let mut line = program;
        for arg in &command.args {
            line.push(' ');
            line.push_str(&quote(arg));
        }
        match command.exit {
            ExitPolicy::Success => line.push_str(" || return 1"),
            ExitPolicy::AllowWarnings => line.push_str(" || [ $? -eq 1 ] || return 1"),
        }
        line
    }

    fn step_line(&self, step: &PipelineStep) -> String {
        match step {
            PipelineStep::Run { command } => self.command_line(command),
            PipelineStep::Remove { paths } => {
                let list: Vec<String> = paths.iter().map(|p| quote_path(p)).collect();
                format!("rm -f -- {} || return 1", list.join(" "))
            }
            PipelineStep::MakeDir { path } => format!("mkdir -p -- {} || return 1", quote_path(path)),
            PipelineStep::Promote { from, to } => {
                format!("mv -f -- {} {} || return 1", quote_path(from), quote_path(to))
            }
        }
    }

    /// Render the complete script.
    pub fn render(&self, pipelines: &[Pipeline]) -> String {
        let mut out = String::from("#!/bin/sh\n# Generated by trackforge.\n\n");
        let mut functions = Vec::new();

        for pipeline in pipelines {
            let movie = pipeline.movie.to_string_lossy();
            if pipeline.unchanged {
                let _ = writeln!(out, "# unchanged: {movie}\n");
                continue;
            }
            let name = format!("movie_{}", functions.len() + 1);
            let _ = writeln!(out, "{name}() {{");
            let _ = writeln!(out, "    echo {}", quote(&format!("==> {movie}")));
            for step in &pipeline.steps {
                let _ = writeln!(out, "    {}", self.step_line(step));
            }
            out.push_str("}\n\n");
            functions.push((name, movie.into_owned()));
        }

        out.push_str("failed=0\n");
        for (name, movie) in &functions {
            let _ = writeln!(
                out,
                "{name} || {{ echo {} >&2; failed=$((failed + 1)); }}",
                quote(&format!("trackforge: failed: {movie}"))
            );
        }
        out.push_str(
            "if [ \"$failed\" -ne 0 ]; then\n    echo \"trackforge: $failed movie(s) failed\" >&2\n    exit 1\nfi\n",
        );
        out
    }
}
