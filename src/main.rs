// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! photosift: sort image files into folders by sharpness, contrast or age

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tokio::signal;
use tracing::{info, warn};

use photosift::config::AppConfig;
use photosift::history::{create_record, History};
use photosift::imageio::{ImageCrateIo, ImageIo};
use photosift::metrics;
use photosift::naming::CanonicalNaming;
use photosift::pipeline::{ProgressEvent, SortObserver, SortPipeline, SortRequest, SortSummary};
use photosift::selection::Selection;
use photosift::{AgeThreshold, FeatureThresholds, Result, SiftError};

/// photosift CLI - sort images by quality metrics or age
#[derive(Parser, Debug)]
#[command(name = "photosift")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "1.0.0")]
#[command(about = "Sort image files into folders by sharpness, contrast or age", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "photosift.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the items of a run come from
#[derive(Args, Debug, Default)]
struct SelectArgs {
    /// Files (or directories, which are skipped) to sort
    paths: Vec<PathBuf>,

    /// Add every entry directly inside this directory
    #[arg(short, long)]
    dir: Vec<PathBuf>,

    /// Add every path matching this glob pattern
    #[arg(short, long)]
    pattern: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sort by sharpness and contrast into four folders
    Feature {
        #[command(flatten)]
        select: SelectArgs,

        /// Sharpness threshold (default from config)
        #[arg(short, long)]
        sharpness: Option<f64>,

        /// Contrast threshold (default from config)
        #[arg(short = 'k', long)]
        contrast: Option<f64>,

        /// Directory to create the bucket folders in (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Sort by last-modified time into before/after folders
    Age {
        #[command(flatten)]
        select: SelectArgs,

        /// Boundary as "YYYY-MM-DD HH:MM[:SS]" in local time
        #[arg(short, long)]
        boundary: String,

        /// Directory to create the bucket folders in (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print sharpness and contrast without sorting
    Measure {
        #[command(flatten)]
        select: SelectArgs,
    },

    /// Run journal operations
    History {
        #[command(subcommand)]
        action: HistoryCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryCommands {
    /// List recent runs
    List {
        /// Number of runs to show
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },

    /// Clear the journal
    Clear {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "photosift.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Feature { select, sharpness, contrast, output } => {
            let thresholds = FeatureThresholds::new(
                sharpness.unwrap_or(config.defaults.sharpness),
                contrast.unwrap_or(config.defaults.contrast),
            )?;
            let selection = build_selection(select)?;
            run_sort(config, SortRequest::Feature(thresholds), selection, output, &cli.format, cli.quiet).await
        }
        Commands::Age { select, boundary, output } => {
            let threshold = AgeThreshold::parse(&boundary)?;
            let selection = build_selection(select)?;
            run_sort(config, SortRequest::Age(threshold), selection, output, &cli.format, cli.quiet).await
        }
        Commands::Measure { select } => {
            let selection = build_selection(select)?;
            run_measure(selection, &cli.format)
        }
        Commands::History { action } => run_history_command(&config, action),
        Commands::Config { action } => run_config_command(config, action, &cli.config),
    }
}

fn build_selection(args: SelectArgs) -> Result<Selection> {
    let mut selection = Selection::new();
    selection.extend(args.paths);
    for dir in &args.dir {
        selection.add_dir_entries(dir)?;
    }
    for pattern in &args.pattern {
        selection.add_pattern(pattern)?;
    }
    Ok(selection)
}

/// Progress bar and notices for a run on the terminal
struct TerminalObserver {
    bar: ProgressBar,
}

impl TerminalObserver {
    fn new(total: usize, visible: bool) -> Self {
        let bar = if visible {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(progress_style());
            bar
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }
}

fn progress_style() -> ProgressStyle {
    match ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {percent:>3}% {pos}/{len}") {
        Ok(style) => style.progress_chars("##-"),
        Err(_) => ProgressStyle::default_bar(),
    }
}

impl SortObserver for TerminalObserver {
    fn on_progress(&mut self, event: ProgressEvent) {
        self.bar.set_position(event.processed as u64);
    }

    fn on_item_failure(&mut self, path: &Path, error: &SiftError) {
        self.bar.println(format!("Failed: {} ({})", path.display(), error));
    }

    fn on_nothing_selected(&mut self) {
        eprintln!("No image selected: you have not selected an image to be processed");
    }

    fn on_finished(&mut self, _summary: &SortSummary) {
        self.bar.finish_and_clear();
    }
}

/// Run one sort over the selection, cancellable with Ctrl+C
async fn run_sort(
    config: AppConfig,
    request: SortRequest,
    selection: Selection,
    output: Option<PathBuf>,
    format: &str,
    quiet: bool,
) -> Result<()> {
    let output_root = output.unwrap_or_else(|| PathBuf::from(&config.output_root));
    let pipeline = SortPipeline::new(&output_root)
        .with_naming(Box::new(CanonicalNaming::from_config(&config.naming)));

    let cancel = pipeline.cancel_token();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, stopping after the current image...");
            cancel.cancel();
        }
    });

    let paths = selection.into_paths();
    let visible = !quiet && format == "text";
    let outcome = tokio::task::spawn_blocking(move || {
        let mut observer = TerminalObserver::new(paths.len(), visible);
        pipeline.run(&paths, &request, &mut observer)
    })
    .await
    .map_err(|e| SiftError::Task(e.to_string()))?;

    let summary = match outcome {
        Ok(summary) => summary,
        // Already reported to the user by the observer
        Err(SiftError::SelectionEmpty) => return Ok(()),
        Err(e) => return Err(e),
    };

    if config.history.enabled {
        let history = History::new(PathBuf::from(&config.history.path));
        if let Err(e) = history.append(&create_record(&request, &output_root, &summary)) {
            warn!("Failed to write run history: {}", e);
        }
    }

    print_summary(&summary, format)
}

fn print_summary(summary: &SortSummary, format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    for placement in &summary.placements {
        println!("{} -> {}", placement.source.display(), placement.destination.display());
    }
    println!(
        "\n{}{} written, {} skipped, {} failed (of {})",
        if summary.cancelled { "Cancelled. " } else { "" },
        summary.processed,
        summary.skipped,
        summary.failed,
        summary.total
    );
    for (bucket, count) in &summary.buckets {
        println!("  {:<10} {}", bucket.as_str(), count);
    }
    Ok(())
}

/// Print metrics for each selected file
fn run_measure(selection: Selection, format: &str) -> Result<()> {
    if selection.is_empty() {
        eprintln!("No image selected: you have not selected an image to be processed");
        return Ok(());
    }

    let io = ImageCrateIo::new();
    let mut results = Vec::new();

    for path in selection.paths() {
        if path.is_dir() {
            continue;
        }
        match io.decode(path) {
            Ok(decoded) => {
                let pair = metrics::measure(&decoded.to_gray());
                if format == "text" {
                    println!(
                        "{}: sharpness {:.4}, contrast {:.4}",
                        path.display(),
                        pair.sharpness,
                        pair.contrast
                    );
                }
                results.push(serde_json::json!({
                    "path": path.to_string_lossy(),
                    "sharpness": pair.sharpness,
                    "contrast": pair.contrast,
                }));
            }
            Err(e) => eprintln!("Error measuring {}: {}", path.display(), e),
        }
    }

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    Ok(())
}

/// Run history commands
fn run_history_command(config: &AppConfig, action: HistoryCommands) -> Result<()> {
    let history = History::new(PathBuf::from(&config.history.path));

    match action {
        HistoryCommands::List { count } => {
            let records = history.get_recent(count)?;
            println!("Recent runs ({} entries):", records.len());
            for record in records {
                let status = if record.cancelled { "[CANCELLED]" } else { "" };
                println!(
                    "  {} {} into {}: {} written, {} skipped, {} failed {}",
                    record.timestamp.format("%Y-%m-%d %H:%M"),
                    record.request.mode(),
                    record.output_root.display(),
                    record.processed,
                    record.skipped,
                    record.failed,
                    status
                );
            }
        }
        HistoryCommands::Clear { force } => {
            if !force {
                eprintln!("Use --force to confirm clearing history");
                return Ok(());
            }
            history.clear()?;
            println!("History cleared");
        }
    }

    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            info!("Configuration at {:?} is valid", config_path);
            println!("Configuration at {:?} is valid", config_path);
            println!("  Output root: {}", config.output_root);
            println!(
                "  Default thresholds: sharpness {}, contrast {}",
                config.defaults.sharpness, config.defaults.contrast
            );
            println!("  History: {}", if config.history.enabled { config.history.path.as_str() } else { "disabled" });
        }
    }

    Ok(())
}
