//! matchbench - Quartz vs Portmatching benchmark plots
//!
//! Aggregates the per-algorithm benchmark result files under a results
//! folder, normalizes them and renders comparison charts.
//!
//! Exit codes:
//!   0 - Success (including runs that found no results)
//!   1 - Invalid arguments, bad config, or an output that could not be written

use anyhow::{Context, Result};
use matchbench::cli::Args;
use matchbench::config::{Config, DEFAULT_CONFIG_FILE};
use matchbench::pipeline::{self, PipelineOptions};
use matchbench::plot::{self, FigureSize, FigureTargets};
use matchbench::report;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Config is read before logging starts so `general.verbose` applies
    let (config, origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config);

    info!("matchbench v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match origin {
        ConfigOrigin::File(path) => info!("Loaded config from {}", path),
        ConfigOrigin::Defaults => debug!("No config file found, using defaults"),
        ConfigOrigin::Fallback(reason) => warn!("Failed to load config: {}", reason),
    }

    match run(&args, config) {
        Ok(()) => {}
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .matchbench.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize the results folder, grammar, layout, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = if !args.quiet && config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Where the effective configuration came from, reported once logging is up.
enum ConfigOrigin {
    File(String),
    Defaults,
    Fallback(String),
}

/// Load configuration from file or use defaults, then apply CLI overrides.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    // Try explicit config path
    let (mut config, origin) = if let Some(ref config_path) = args.config {
        (
            Config::load(config_path)?,
            ConfigOrigin::File(config_path.display().to_string()),
        )
    } else {
        // Try default location
        match Config::load_default() {
            Ok(Some(config)) => (config, ConfigOrigin::File(DEFAULT_CONFIG_FILE.to_string())),
            Ok(None) => (Config::default(), ConfigOrigin::Defaults),
            Err(e) => (Config::default(), ConfigOrigin::Fallback(format!("{:#}", e))),
        }
    };

    config.merge_with_args(args);
    config.validate().context("Invalid configuration")?;
    Ok((config, origin))
}

/// Run the complete load, normalize, plot and export workflow.
fn run(args: &Args, config: Config) -> Result<()> {
    let start_time = Instant::now();
    let results_folder = config.general.results_folder.clone();

    // Step 1: Load and normalize
    if !args.quiet {
        println!("📥 Loading results from: {}", results_folder.display());
    }
    let options = PipelineOptions::from(&config);
    let output = pipeline::collect(&results_folder, &options);

    if output.normalized.table.is_empty() {
        warn!(
            "No benchmark results found under {}",
            results_folder.display()
        );
    }

    // Step 2: Render charts
    let mut figures = Vec::new();
    if args.no_plot {
        debug!("Skipping chart rendering (--no-plot)");
    } else {
        if !args.quiet {
            println!("🖌️  Rendering {:?} layout...", config.plot.layout);
        }
        figures = plot::render_layout(
            &output.normalized.table,
            config.plot.layout,
            &FigureTargets::from(&config),
            FigureSize::from(&config.plot),
        )
        .context("Failed to render charts")?;
    }

    // Step 3: Export the normalized table
    if let Some(ref export) = args.export {
        report::write_table(output.normalized.table.table(), export)
            .with_context(|| format!("Failed to export table to {}", export.display()))?;
        info!("Exported normalized table to {}", export.display());
    }

    // Print summary
    if !args.quiet {
        let summary = output.summary();
        println!("\n{}", report::generate_summary_text(&summary, &figures));
        println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
        println!("\n✅ Done.");
    }

    Ok(())
}
