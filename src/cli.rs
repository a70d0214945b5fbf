//! Command-line interface for sortdir.
//!
//! Parses the flags, turns them into an [`OrganizerConfig`], runs the
//! organizer and prints the result.

use crate::config::{ExclusionRules, OrganizerConfig};
use crate::errors::OrganizeResult;
use crate::file_organizer::Organizer;
use crate::output::OutputFormatter;
use crate::report::OrganizeReport;
use clap::Parser;
use std::path::PathBuf;

/// Sort the files of a directory into category folders by extension.
#[derive(Parser, Debug, Clone)]
#[command(name = "sortdir", version, about)]
pub struct Cli {
    /// Directory to organize.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub path: PathBuf,

    /// Show what would be done without changing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Append each file's creation date (YYYY-MM-DD) to its name.
    #[arg(long)]
    pub rename_date: bool,

    /// Do not print a line per action.
    #[arg(long)]
    pub silent: bool,

    /// Leave files whose name matches this glob where they are (repeatable).
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Leave files whose name matches this regex where they are (repeatable).
    #[arg(long = "exclude-regex", value_name = "REGEX")]
    pub exclude_regex: Vec<String>,

    /// Print the report as JSON instead of console messages.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Builds the organizer configuration from the parsed flags.
    ///
    /// The running executable is always excluded, so the tool never moves
    /// itself when run from inside the directory it organizes. `--json`
    /// turns off the per-action console lines.
    ///
    /// # Example
    ///
    /// ```
    /// use clap::Parser;
    /// use sortdir::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["sortdir", "--rename-date", "--exclude", "*.part"]);
    /// let config = cli.organizer_config();
    /// assert!(config.embed_date);
    /// assert_eq!(config.exclusions.patterns, vec!["*.part"]);
    /// ```
    pub fn organizer_config(&self) -> OrganizerConfig {
        let exclusions = ExclusionRules {
            patterns: self.exclude.clone(),
            regex: self.exclude_regex.clone(),
            ..Default::default()
        }
        .with_current_exe();

        OrganizerConfig {
            dry_run: self.dry_run,
            embed_date: self.rename_date,
            verbose: !self.silent && !self.json,
            exclusions,
        }
    }

    /// Default log filter when `RUST_LOG` is not set: `error` for `--silent`,
    /// `warn` otherwise.
    pub fn log_filter(&self) -> &'static str {
        if self.silent { "error" } else { "warn" }
    }
}

/// Runs the organizer for the parsed command line.
///
/// This is the main entry point for the binary. With `--json` the report is
/// printed as JSON on stdout; otherwise the summary table is printed unless
/// `--silent` is set.
///
/// # Arguments
///
/// * `cli` - The parsed command line
///
/// # Errors
///
/// Only fatal errors are returned: an unusable source directory or an
/// invalid `--exclude`/`--exclude-regex` pattern. Files that fail to move are
/// reported in the returned [`OrganizeReport`].
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use sortdir::cli::{run_cli, Cli};
///
/// let cli = Cli::parse_from(["sortdir", "--path", "/path/to/directory", "--dry-run"]);
/// match run_cli(&cli) {
///     Ok(report) => println!("{} files would move", report.simulated()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli) -> OrganizeResult<OrganizeReport> {
    let report = Organizer::new(cli.organizer_config()).organize(&cli.path)?;

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!("could not serialize report: {}", e),
        }
    } else if !cli.silent {
        OutputFormatter::report_summary(&report);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["sortdir"]).expect("Failed to parse");
        assert_eq!(cli.path, PathBuf::from("."));
        assert!(!cli.dry_run);
        assert!(!cli.rename_date);
        assert!(!cli.silent);

        let config = cli.organizer_config();
        assert!(config.verbose);
        assert_eq!(config.exclusions.paths.len(), 1);
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "sortdir",
            "--path",
            "/tmp/downloads",
            "--dry-run",
            "--rename-date",
            "--silent",
            "--exclude",
            "*.part",
            "--exclude",
            "*.crdownload",
            "--exclude-regex",
            "^~",
        ])
        .expect("Failed to parse");

        assert_eq!(cli.path, PathBuf::from("/tmp/downloads"));
        let config = cli.organizer_config();
        assert!(config.dry_run);
        assert!(config.embed_date);
        assert!(!config.verbose);
        assert_eq!(config.exclusions.patterns, vec!["*.part", "*.crdownload"]);
        assert_eq!(config.exclusions.regex, vec!["^~"]);
        assert_eq!(cli.log_filter(), "error");
    }

    #[test]
    fn test_json_disables_console_lines() {
        let cli = Cli::try_parse_from(["sortdir", "--json"]).expect("Failed to parse");
        assert!(!cli.organizer_config().verbose);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["sortdir", "--undo"]).is_err());
    }
}
