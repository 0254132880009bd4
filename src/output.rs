//! Output formatting and styling for the CLI.
//!
//! Centralizes colored status lines, the relocation progress bar and the
//! per-category summary table rendered after a run.

use crate::organizer::OrganizeReport;
use crate::relocate::RelocationStatus;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for the relocation phase.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints the per-category summary table for a finished run.
    pub fn summary_table(report: &OrganizeReport) {
        Self::header("SUMMARY");

        let max_label_len = report
            .categories
            .iter()
            .map(|c| c.label.len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {:>6} | {:>9} | {:>6} | {:>9}",
            "Category".bold(),
            "Copied".bold(),
            "Simulated".bold(),
            "Failed".bold(),
            "Cancelled".bold(),
            width = max_label_len
        );
        println!("{}", "-".repeat(max_label_len + 43));

        for category in &report.categories {
            let count = |status: RelocationStatus| {
                category
                    .outcomes
                    .iter()
                    .filter(|o| o.status == status)
                    .count()
            };
            let failed = count(RelocationStatus::Failed);
            let failed_cell = if failed > 0 {
                failed.to_string().red().to_string()
            } else {
                failed.to_string()
            };
            println!(
                "{:<width$} | {:>6} | {:>9} | {:>6} | {:>9}",
                category.label,
                count(RelocationStatus::Copied).to_string().green(),
                count(RelocationStatus::Simulated),
                failed_cell,
                count(RelocationStatus::Cancelled),
                width = max_label_len
            );
        }

        println!("{}", "-".repeat(max_label_len + 43));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            report.total().to_string().green().bold(),
            if report.total() == 1 { "file" } else { "files" },
            width = max_label_len
        );
    }
}
