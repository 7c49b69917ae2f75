//! Grouping of input files into movies.
//!
//! Every video container starts a movie. Satellite files (external audio,
//! subtitles, chapters) join the movie in the same directory whose stem is
//! their longest prefix, or the directory's only movie when no stem matches.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tf_probe::catalog::natural_cmp;
use tf_probe::chapters::is_chapters_file;
use walkdir::WalkDir;

const VIDEO_EXTENSIONS: &[&str] = &["mkv", "mp4", "avi", "m2ts", "ts"];

const SATELLITE_EXTENSIONS: &[&str] = &[
    "mka", "ac3", "eac3", "dts", "thd", "aac", "m4a", "flac", "wav", "mp3", "srt", "ass", "ssa",
    "sup", "idx",
];

/// One logical movie: a main video file plus its satellites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Movie {
    pub main: PathBuf,
    pub satellites: Vec<PathBuf>,
}

impl Movie {
    /// All files, main first.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.main.as_path()).chain(self.satellites.iter().map(PathBuf::as_path))
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase())
}

fn is_video(path: &Path) -> bool {
    extension(path).is_some_and(|e| VIDEO_EXTENSIONS.contains(&e.as_str()))
}

fn is_satellite(path: &Path) -> bool {
    is_chapters_file(path) || extension(path).is_some_and(|e| SATELLITE_EXTENSIONS.contains(&e.as_str()))
}

fn path_cmp(a: &Path, b: &Path) -> std::cmp::Ordering {
    natural_cmp(&a.to_string_lossy(), &b.to_string_lossy())
}

/// Expand the inputs into media files, walking directories recursively.
///
/// # Errors
///
/// Fails when an input does not exist or a directory cannot be read.
pub fn collect_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).follow_links(true) {
                let entry = entry.with_context(|| format!("Failed to walk {:?}", input))?;
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            anyhow::bail!("Input does not exist: {:?}", input);
        }
    }
    files.retain(|f| is_video(f) || is_satellite(f));
    files.sort_by(|a, b| path_cmp(a, b));
    files.dedup();
    Ok(files)
}

/// Group media files into movies, ordered by main file.
///
/// Satellites that cannot be attached are logged and dropped.
pub fn group_movies(files: &[PathBuf]) -> Vec<Movie> {
    let mut movies: Vec<Movie> = files
        .iter()
        .filter(|f| is_video(f))
        .map(|main| Movie {
            main: main.clone(),
            satellites: Vec::new(),
        })
        .collect();
    movies.sort_by(|a, b| path_cmp(&a.main, &b.main));

    // Movie positions per directory.
    let mut by_dir: BTreeMap<&Path, Vec<usize>> = BTreeMap::new();
    for (i, movie) in movies.iter().enumerate() {
        by_dir.entry(movie.main.parent().unwrap_or(Path::new(""))).or_default().push(i);
    }

    let mut attachments: Vec<(usize, PathBuf)> = Vec::new();
    for file in files.iter().filter(|f| !is_video(f) && is_satellite(f)) {
        let dir = file.parent().unwrap_or(Path::new(""));
        let Some(candidates) = by_dir.get(dir) else {
            tracing::warn!(file = %file.display(), "no movie in the same directory, ignoring");
            continue;
        };
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let by_stem = candidates
            .iter()
            .filter_map(|&i| {
                let stem = movies[i].main.file_stem()?.to_string_lossy().into_owned();
                name.starts_with(&stem).then_some((stem.len(), i))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, i)| i);

        match by_stem.or_else(|| (candidates.len() == 1).then(|| candidates[0])) {
            Some(i) => attachments.push((i, file.clone())),
            None => {
                tracing::warn!(file = %file.display(), "cannot tell which movie it belongs to, ignoring")
            }
        }
    }

    for (i, file) in attachments {
        movies[i].satellites.push(file);
    }
    for movie in &mut movies {
        movie.satellites.sort_by(|a, b| path_cmp(a, b));
    }
    movies
}
