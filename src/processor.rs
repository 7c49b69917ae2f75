//! Per-movie batch processing: probe, enrich, resolve, compile.
//!
//! A failing movie is logged and skipped; a run-scoped failure
//! (configuration, cancellation) stops the batch.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tf_core::config::Config;
use tf_core::{ErrorScope, Result};
use tf_pipeline::{Compiler, MovieOptions, Plan, Workspace};
use tf_probe::{Catalog, Enricher, MetadataSource, Prober};
use tf_rules::{Disambiguator, Resolver};

use crate::config::CropMap;
use crate::grouping::Movie;

/// A movie that could not be planned.
#[derive(Debug, Serialize)]
pub struct Failure {
    pub movie: PathBuf,
    pub error: String,
}

/// Result of a batch run.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub plans: Vec<Plan>,
    pub failures: Vec<Failure>,
}

/// Drives every movie of a run through the planning stages.
pub struct Processor<'a> {
    config: &'a Config,
    prober: &'a dyn Prober,
    metadata: &'a dyn MetadataSource,
    crop_map: Option<CropMap>,
    temp_dir: PathBuf,
}

impl<'a> Processor<'a> {
    pub fn new(config: &'a Config, prober: &'a dyn Prober, metadata: &'a dyn MetadataSource) -> Self {
        let temp_dir = config
            .paths
            .temp_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        Self {
            config,
            prober,
            metadata,
            crop_map: None,
            temp_dir,
        }
    }

    pub fn with_crop_map(mut self, crop_map: CropMap) -> Self {
        self.crop_map = Some(crop_map);
        self
    }

    /// Where the finished file for `main` goes.
    pub fn target_path(&self, main: &Path) -> PathBuf {
        let dir = match &self.config.paths.output_dir {
            Some(dir) => dir.clone(),
            None => main.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        let stem = main.file_stem().unwrap_or(main.as_os_str());
        dir.join(stem).with_extension("mkv")
    }

    /// Plan a single movie.
    ///
    /// # Errors
    ///
    /// Any probe, catalog, resolution or compilation error for this movie.
    pub fn plan_movie(&self, movie: &Movie, disambiguator: &mut dyn Disambiguator) -> Result<Plan> {
        let workspace = Workspace::new(self.temp_dir.clone(), &movie.main);
        self.plan_in(movie, workspace, disambiguator)
    }

    fn plan_in(
        &self,
        movie: &Movie,
        mut workspace: Workspace,
        disambiguator: &mut dyn Disambiguator,
    ) -> Result<Plan> {
        let probes = movie
            .files()
            .map(|file| self.prober.probe(file))
            .collect::<Result<Vec<_>>>()?;
        let catalog = Catalog::from_probes(&movie.main, probes)?;
        let mut catalog = Enricher::new(self.metadata, self.config.thresholds).enrich(catalog);

        let selection = Resolver::from_config(self.config).resolve(&mut catalog, disambiguator)?;

        let crop = self
            .config
            .policy
            .crop
            .or_else(|| self.crop_map.as_ref().and_then(|map| map.get(&movie.main)));
        let options = MovieOptions {
            target: self.target_path(&movie.main),
            crop,
        };
        Compiler::from_config(self.config).compile(
            &catalog,
            &selection,
            &options,
            &mut workspace,
            disambiguator,
        )
    }

    /// Plan every movie in order. Temp names carry the movie's position in
    /// `movies`.
    ///
    /// # Errors
    ///
    /// Only run-scoped errors are returned; movie-scoped ones are collected
    /// in the report.
    pub fn run(&self, movies: &[Movie], disambiguator: &mut dyn Disambiguator) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        for (index, movie) in movies.iter().enumerate() {
            tracing::info!(movie = %movie.main.display(), files = movie.satellites.len() + 1, "planning");
            let workspace = Workspace::new(self.temp_dir.clone(), &movie.main).numbered(index + 1);
            match self.plan_in(movie, workspace, disambiguator) {
                Ok(plan) => report.plans.push(plan),
                Err(e) if e.scope() == ErrorScope::Run => return Err(e),
                Err(e) => {
                    tracing::error!(movie = %movie.main.display(), error = %e, "movie failed");
                    report.failures.push(Failure {
                        movie: movie.main.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        tracing::info!(
            planned = report.plans.len(),
            failed = report.failures.len(),
            "batch finished"
        );
        Ok(report)
    }
}
