mod cli;

use trackforge::{config, grouping, processor, prompt};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, PolicyArgs};
use std::path::{Path, PathBuf};
use tf_av::{FfprobeProber, ToolMetadataSource, ToolRegistry};
use tf_pipeline::{Emitter, Plan, ScriptRenderer};
use tf_probe::{Catalog, ChaptersProber, CompositeProber, Enricher, Prober};
use tf_rules::{Disambiguator, NonInteractive};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag.
    // Logs go to stderr; stdout carries plans and scripts.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "trackforge=trace,tf_core=debug,tf_probe=debug,tf_av=debug,tf_rules=debug,tf_pipeline=debug".to_string()
        } else {
            "trackforge=info,tf_core=info,tf_probe=info,tf_av=info,tf_rules=info,tf_pipeline=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Plan {
            paths,
            json,
            policy,
        } => plan_movies(&paths, cli.config.as_deref(), &policy, json),
        Commands::Script {
            paths,
            output,
            policy,
        } => write_script(&paths, cli.config.as_deref(), &policy, output.as_deref()),
        Commands::Probe { file, json } => probe_file(&file, cli.config.as_deref(), json),
        Commands::CheckTools { json } => check_tools(cli.config.as_deref(), json),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("trackforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Configuration with the command-line overrides applied and re-validated.
fn effective_config(config_path: Option<&Path>, policy: &PolicyArgs) -> Result<config::Config> {
    let mut config = config::load_config_or_default(config_path)?;
    policy.apply(&mut config);
    config::prepare(config)
}

fn build_prober(registry: &ToolRegistry) -> CompositeProber {
    CompositeProber::new(vec![
        Box::new(ChaptersProber),
        Box::new(FfprobeProber::new(registry.program("ffprobe"))),
    ])
}

/// Plan every movie found under `paths`.
fn run_batch(
    paths: &[PathBuf],
    config: &config::Config,
    registry: &ToolRegistry,
    non_interactive: bool,
) -> Result<processor::BatchReport> {
    let files = grouping::collect_files(paths)?;
    let movies = grouping::group_movies(&files);
    if movies.is_empty() {
        anyhow::bail!("No movies found in {:?}", paths);
    }
    tracing::info!(movies = movies.len(), "grouped input files");

    let prober = build_prober(registry);
    let metadata = ToolMetadataSource::new(registry);
    let mut processor = processor::Processor::new(config, &prober, &metadata);
    if let Some(path) = &config.policy.crop_map {
        processor = processor.with_crop_map(config::CropMap::load(path)?);
    }

    let mut terminal;
    let mut quiet = NonInteractive;
    let disambiguator: &mut dyn Disambiguator = if non_interactive {
        &mut quiet
    } else {
        terminal = prompt::TerminalDisambiguator::new(std::io::stdin().lock(), std::io::stderr());
        &mut terminal
    };

    Ok(processor.run(&movies, disambiguator)?)
}

fn report_failures(report: &processor::BatchReport) -> Result<()> {
    for failure in &report.failures {
        eprintln!("FAILED {}: {}", failure.movie.display(), failure.error);
    }
    if !report.failures.is_empty() {
        anyhow::bail!(
            "{} of {} movie(s) failed",
            report.failures.len(),
            report.failures.len() + report.plans.len()
        );
    }
    Ok(())
}

fn plan_movies(paths: &[PathBuf], config_path: Option<&Path>, policy: &PolicyArgs, json: bool) -> Result<()> {
    let config = effective_config(config_path, policy)?;
    let registry = ToolRegistry::discover(&config.tools);
    let report = run_batch(paths, &config, &registry, policy.non_interactive)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for plan in &report.plans {
            print_plan(plan);
        }
    }
    report_failures(&report)
}

fn print_plan(plan: &Plan) {
    println!("{} -> {}", plan.main_file.display(), plan.target.display());
    for track in &plan.tracks {
        print!(
            "  [{}] {} {}",
            track.track_type.title(),
            track.id,
            track.language
        );
        if track.forced {
            print!(" [forced]");
        }
        if track.default {
            print!(" [default]");
        }
        print!(" {}", track.action);
        if !track.steps.is_empty() {
            print!(" ({} step(s) -> {})", track.steps.len(), track.source.path.display());
        }
        println!();
    }
    if let Some(chapters) = &plan.chapters {
        println!("  [Chapters] {}", chapters.display());
    }
    println!();
}

fn write_script(
    paths: &[PathBuf],
    config_path: Option<&Path>,
    policy: &PolicyArgs,
    output: Option<&Path>,
) -> Result<()> {
    let config = effective_config(config_path, policy)?;
    let registry = ToolRegistry::discover(&config.tools);
    let report = run_batch(paths, &config, &registry, policy.non_interactive)?;

    let emitter = Emitter::new(&config.policy);
    let pipelines: Vec<_> = report.plans.iter().map(|plan| emitter.emit(plan)).collect();
    let programs = registry.paths();
    let script = ScriptRenderer::new(&programs).render(&pipelines);

    match output {
        Some(path) => {
            std::fs::write(path, &script)
                .with_context(|| format!("Failed to write script: {:?}", path))?;
            tracing::info!(path = %path.display(), movies = pipelines.len(), "script written");
        }
        None => print!("{script}"),
    }
    report_failures(&report)
}

fn probe_file(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let registry = ToolRegistry::discover(&config.tools);
    let probed = build_prober(&registry).probe(file)?;
    let catalog = Catalog::from_probes(file, vec![probed])?;
    let metadata = ToolMetadataSource::new(&registry);
    let catalog = Enricher::new(&metadata, config.thresholds).enrich(catalog);

    if json {
        println!("{}", serde_json::to_string_pretty(catalog.tracks())?);
        return Ok(());
    }

    println!("File: {}", file.display());
    for track in catalog.tracks() {
        print!(
            "  [{}] {} {} {}",
            track.id.index(),
            track.track_type.title(),
            track.codec.name(),
            track.language
        );
        if let Some(video) = &track.video {
            print!(" {}x{}", video.width, video.height);
            if let Some(rate) = &video.frame_rate {
                print!(" @ {rate}");
            }
            if let Some(crf) = video.crf {
                print!(" crf {crf}");
            }
        }
        if let Some(channels) = track.channels() {
            print!(" {channels}ch");
        }
        if !track.name.is_empty() {
            print!(" \"{}\"", track.name);
        }
        if track.forced == Some(true) {
            print!(" [forced]");
        }
        if track.default {
            print!(" [default]");
        }
        println!();
    }
    Ok(())
}

fn check_tools(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let tools = ToolRegistry::discover(&config.tools).check_all();

    if json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    println!("Checking external tools...\n");
    let mut all_ok = true;
    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);
        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }
        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }
        println!();
    }

    println!();
    if all_ok {
        println!("All tools are available!");
    } else {
        println!("Some tools are missing. Generated scripts will rely on PATH for them.");
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, checking default locations");
            config::load_config_or_default(None)?
        }
    };

    println!("✓ Configuration is valid");
    for slot in config.tracks.slots() {
        println!(
            "  {} ({}): {}",
            slot.track_type.title(),
            if slot.forced { "forced" } else { "full" },
            slot.languages.join(", ")
        );
    }
    println!("  Audio encoder: {:?}, bitrate {}", config.audio.encoder, config.audio.bitrate);
    if let Some(channels) = config.policy.downmix_channels {
        println!("  Downmix above {channels} channels");
    }
    Ok(())
}
