//! Console output for organizing runs.
//!
//! All user-facing lines go through [`OutputFormatter`], so the engine itself
//! only decides *whether* to print, never *how*.

use crate::report::{EntryOutcome, EntryReport, OrganizeReport};
use colored::*;
use std::collections::BTreeMap;
use std::path::Path;

/// Formats organizer messages with consistent styling.
///
/// Provides helpers for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗, on stderr)
/// - Warning messages (yellow with ⚠)
/// - Dry-run notices (yellow, prefixed with `[DRY RUN]`)
/// - Per-entry lines and the end-of-run summary table
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sortdir::output::OutputFormatter;
    /// OutputFormatter::success("Organization complete!");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    ///
    /// Goes to stderr so `--json` output on stdout stays parseable.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sortdir::output::OutputFormatter;
    /// OutputFormatter::error("Error: invalid source directory /nope");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header in bold, preceded by a blank line.
    ///
    /// # Arguments
    ///
    /// * `header` - The header text
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a line describing something a dry run would have done.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sortdir::output::OutputFormatter;
    /// // Prints "[DRY RUN] Would create directory: Images" in yellow.
    /// OutputFormatter::dry_run_notice("Would create directory: Images");
    /// ```
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Prints a horizontal separator.
    pub fn rule() {
        println!("{}", "-".repeat(50));
    }

    /// Prints the banner shown before the first entry is processed.
    ///
    /// # Arguments
    ///
    /// * `source_dir` - The directory being organized
    /// * `dry_run` - Selects the `[DRY RUN]` or `[ORGANIZE]` label
    /// * `embed_date` - Whether files are renamed with their creation date
    pub fn run_header(source_dir: &Path, dry_run: bool, embed_date: bool) {
        let mode = if dry_run { "[DRY RUN]" } else { "[ORGANIZE]" };
        Self::header(&format!("{} Directory: {}", mode, source_dir.display()));
        Self::plain(&format!(
            "Rename with date: {}",
            if embed_date { "on" } else { "off" }
        ));
        Self::rule();
    }

    /// Announces a category directory that was (or would be) created.
    pub fn created_dir(path: &Path, dry_run: bool) {
        if dry_run {
            Self::dry_run_notice(&format!("Would create directory: {}", path.display()));
        } else {
            Self::info(&format!("Created directory: {}", path.display()));
        }
    }

    /// Prints the line for one processed entry.
    ///
    /// The style follows the outcome: moves are successes, simulated moves
    /// are dry-run notices and failures are errors. A `Planned` entry never
    /// reaches the console.
    pub fn entry(entry: &EntryReport) {
        let renamed = entry
            .plan
            .as_ref()
            .filter(|plan| plan.new_name != entry.name)
            .map(|plan| format!(" (renamed to '{}')", plan.new_name))
            .unwrap_or_default();
        let destination = entry
            .plan
            .as_ref()
            .and_then(|plan| plan.target_path.as_ref())
            .map(|path| path.display().to_string())
            .unwrap_or_default();

        match &entry.outcome {
            EntryOutcome::Skipped { reason } => {
                Self::plain(&format!("Skipped '{}': {}", entry.name, reason));
            }
            EntryOutcome::Simulated => {
                Self::dry_run_notice(&format!(
                    "Would move: '{}' -> '{}'{}",
                    entry.name, destination, renamed
                ));
            }
            EntryOutcome::Moved => {
                Self::success(&format!(
                    "Moved: '{}' -> '{}'{}",
                    entry.name, destination, renamed
                ));
            }
            EntryOutcome::Failed { reason, message } => {
                Self::error(&format!("'{}' {}: {}", entry.name, reason, message));
            }
            EntryOutcome::Planned => {}
        }
    }

    /// Prints a summary table with file statistics by category.
    ///
    /// # Arguments
    ///
    /// * `category_counts` - Category directory names mapped to file counts
    /// * `total_files` - Total number of files moved (or simulated)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sortdir::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("Documents".to_string(), 15);
    /// counts.insert("Images".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(category_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let max_category_len = category_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(8); // At least "Category" width

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in category_counts {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                file_word(*count),
                width = max_category_len
            );
        }

        println!("{}", "-".repeat(max_category_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            file_word(total_files),
            width = max_category_len
        );
    }

    /// Prints the end-of-run summary for a report: the category table, the
    /// skip/failure/warning counts and the entries that failed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sortdir::file_organizer::organize;
    /// use sortdir::output::OutputFormatter;
    /// use std::path::Path;
    ///
    /// let report = organize(Path::new("/path/to/downloads"), true, false, false).unwrap();
    /// OutputFormatter::report_summary(&report);
    /// ```
    pub fn report_summary(report: &OrganizeReport) {
        let counts = report.category_counts();
        let total = if report.dry_run {
            report.simulated()
        } else {
            report.moved()
        };

        if total > 0 {
            Self::summary_table(&counts, total);
        } else {
            Self::plain("\nNothing to move.");
        }

        Self::plain(&format!(
            "Skipped: {}  Failed: {}  Warnings: {}",
            report.skipped(),
            report.failed(),
            report.warnings.len()
        ));

        if report.failed() > 0 {
            Self::warning("Some files could not be organized:");
            for entry in report.failures() {
                if let EntryOutcome::Failed { reason, .. } = &entry.outcome {
                    Self::plain(&format!("  {} ({})", entry.source.display(), reason));
                }
            }
        }
        if report.dry_run {
            Self::success("Dry run complete. No files were modified.");
        } else {
            Self::success("Organization complete!");
        }
    }
}

fn file_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
