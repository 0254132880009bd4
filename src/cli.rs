//! Command-line interface.
//!
//! The CLI gathers the organize parameters (directory, flags, size bounds,
//! unit), merges them with the optional configuration file, invokes the
//! organizer and renders the returned report, either as a colored summary
//! table or as JSON.

use crate::category::Classifier;
use crate::config::OrganizeConfig;
use crate::organizer::{CancellationToken, OrganizeRequest, Organizer};
use crate::output::OutputFormatter;
use crate::size::SizeUnit;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "dirsift")]
#[command(about = "Classify files by extension and relocate them into category subfolders", long_about = None)]
pub struct Cli {
    /// Directory whose top-level files are organized
    pub source_dir: PathBuf,

    /// Delete each original file after a successful copy
    #[arg(long)]
    pub delete_originals: bool,

    /// Compute and log all actions without touching the filesystem
    #[arg(long)]
    pub dry_run: bool,

    /// Minimum file size in --unit units; 0 means no lower bound
    #[arg(long)]
    pub min_size: Option<f64>,

    /// Maximum file size in --unit units; 0 means no upper bound
    #[arg(long)]
    pub max_size: Option<f64>,

    /// Unit for --min-size and --max-size
    #[arg(long, value_enum)]
    pub unit: Option<SizeUnit>,

    /// Number of relocation workers; 0 picks an automatic default
    #[arg(long)]
    pub workers: Option<usize>,

    /// Path to a configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the report as JSON instead of the summary table
    #[arg(long)]
    pub json: bool,
}

/// Runs one organize invocation from parsed arguments.
///
/// Command-line values override configuration-file defaults; boolean flags
/// can only enable, never disable, a configured default.
pub fn run(cli: Cli) -> Result<(), String> {
    let config = OrganizeConfig::load(cli.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let filters = config
        .compile_filters()
        .map_err(|e| format!("Error compiling filters: {}", e))?;

    let mut classifier = Classifier::default();
    for rule in &config.categories {
        classifier.add_rule(&rule.label, &rule.extensions);
    }

    let request = OrganizeRequest {
        source_dir: cli.source_dir,
        delete_originals: cli.delete_originals || config.defaults.delete_originals,
        dry_run: cli.dry_run || config.defaults.dry_run,
        min_size: cli.min_size.unwrap_or(config.defaults.min_size),
        max_size: cli.max_size.unwrap_or(config.defaults.max_size),
        size_unit: cli.unit.unwrap_or_else(|| config.defaults.unit()),
    };
    let workers = cli.workers.unwrap_or(config.defaults.workers);

    if !cli.json {
        if request.dry_run {
            OutputFormatter::dry_run_notice(&format!(
                "Analyzing contents of: {}",
                request.source_dir.display()
            ));
        } else {
            OutputFormatter::info(&format!(
                "Organizing contents of: {}",
                request.source_dir.display()
            ));
        }
    }

    let mut organizer = Organizer::new()
        .with_classifier(classifier)
        .with_filters(filters)
        .with_workers(workers);

    let progress_bar = if cli.json {
        None
    } else {
        let pb = OutputFormatter::create_progress_bar(0);
        let handle = pb.clone();
        organizer = organizer.with_progress(Box::new(move |completed, total| {
            handle.set_length(total);
            handle.set_position(completed);
        }));
        Some(pb)
    };

    let report = organizer
        .organize(&request, &CancellationToken::new())
        .map_err(|e| e.to_string())?;

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    if cli.json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Error serializing report: {}", e))?;
        println!("{}", rendered);
        return Ok(());
    }

    print!("{}", report.render());
    OutputFormatter::summary_table(&report);

    if report.failed() > 0 {
        OutputFormatter::warning("Some files could not be organized. Please review errors above.");
    }
    if request.dry_run {
        OutputFormatter::success("Dry run complete. No files were modified.");
    } else {
        OutputFormatter::success("Organization complete!");
    }

    Ok(())
}
