//! Moves the files of a directory into category subdirectories.
//!
//! Every entry is processed on its own: a failure is recorded in the report
//! and the run moves on to the next entry. Only an unusable source directory
//! (or an invalid exclusion pattern) stops a run before it starts.

use crate::collision::CollisionResolver;
use crate::config::{CompiledExclusions, ExclusionMatch, ExclusionRules, OrganizerConfig};
use crate::errors::{OrganizeError, OrganizeResult};
use crate::file_category::CategoryMap;
use crate::naming::{DateSource, FileTimestamps, compute_os_name, format_date};
use crate::output::OutputFormatter;
use crate::report::{
    EntryOutcome, EntryReport, FailureReason, MovePlan, OrganizeReport, SkipReason,
};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One entry of the source directory.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// The entry's file name as stored on disk.
    pub file_name: OsString,
    /// Lossy UTF-8 form of `file_name`, used for classification, exclusion
    /// rules and display.
    pub name: String,
    /// The full path to the entry.
    pub path: PathBuf,
    /// True for directories, including symlinks to directories.
    pub is_dir: bool,
    /// Set when the entry matched the exclusion set.
    pub exclusion: Option<ExclusionMatch>,
}

/// Mutable state for a single run.
struct RunState {
    report: OrganizeReport,
    resolver: CollisionResolver,
    /// Directories a dry run would have created.
    pending_dirs: HashSet<PathBuf>,
}

/// Organizes a directory by moving files into category subdirectories.
///
/// The category table and the date source are injected, so a run is fully
/// determined by its inputs and the filesystem.
pub struct Organizer<D = FileTimestamps> {
    config: OrganizerConfig,
    categories: CategoryMap,
    dates: D,
}

impl Organizer<FileTimestamps> {
    /// Creates an organizer with the default category table and filesystem
    /// timestamps.
    pub fn new(config: OrganizerConfig) -> Self {
        Self {
            config,
            categories: CategoryMap::default(),
            dates: FileTimestamps,
        }
    }
}

impl<D: DateSource> Organizer<D> {
    /// Replaces the category table.
    pub fn with_categories(mut self, categories: CategoryMap) -> Self {
        self.categories = categories;
        self
    }

    /// Replaces the source of creation dates.
    pub fn with_date_source<E: DateSource>(self, dates: E) -> Organizer<E> {
        Organizer {
            config: self.config,
            categories: self.categories,
            dates,
        }
    }

    /// Organizes `source_dir` and reports what happened to each entry.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizeError::InvalidSourceDirectory`] if `source_dir` is
    /// missing, not a directory, or cannot be listed, and
    /// [`OrganizeError::InvalidPattern`] if an exclusion rule is invalid.
    /// Per-file problems are never returned as errors; they show up as
    /// [`EntryOutcome::Failed`] entries in the report.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sortdir::config::OrganizerConfig;
    /// use sortdir::file_organizer::Organizer;
    /// use std::path::Path;
    ///
    /// let config = OrganizerConfig { dry_run: true, ..Default::default() };
    /// let report = Organizer::new(config).organize(Path::new("/path/to/downloads"));
    ///
    /// match report {
    ///     Ok(report) => println!("{} files would move", report.simulated()),
    ///     Err(e) => eprintln!("Organization failed: {}", e),
    /// }
    /// ```
    pub fn organize(&self, source_dir: &Path) -> OrganizeResult<OrganizeReport> {
        validate_source_dir(source_dir)?;
        let exclusions = self.config.exclusions.clone().compile()?;

        let mut run = RunState {
            report: OrganizeReport::new(source_dir.to_path_buf(), self.config.dry_run),
            resolver: CollisionResolver::new(),
            pending_dirs: HashSet::new(),
        };

        let entries = read_entries(source_dir, &exclusions, &mut run.report)?;
        tracing::info!(
            "organizing {} entries in {} (dry run: {})",
            entries.len(),
            source_dir.display(),
            self.config.dry_run
        );

        if self.config.verbose {
            OutputFormatter::run_header(source_dir, self.config.dry_run, self.config.embed_date);
        }

        for entry in &entries {
            let entry_report = self.process_entry(source_dir, entry, &mut run);
            tracing::debug!("{}: {:?}", entry.name, entry_report.outcome);
            if self.config.verbose {
                OutputFormatter::entry(&entry_report);
            }
            run.report.entries.push(entry_report);
        }

        if self.config.verbose {
            OutputFormatter::rule();
        }

        Ok(run.report)
    }

    fn process_entry(
        &self,
        source_dir: &Path,
        entry: &FileEntry,
        run: &mut RunState,
    ) -> EntryReport {
        let skip_reason = if entry.is_dir {
            Some(SkipReason::Directory)
        } else {
            entry.exclusion.map(|exclusion| match exclusion {
                ExclusionMatch::Path => SkipReason::SelfArtifact,
                ExclusionMatch::Rule => SkipReason::Excluded,
            })
        };
        if let Some(reason) = skip_reason {
            return EntryReport::skipped(entry.name.clone(), entry.path.clone(), reason);
        }

        let category = self.categories.classify(&entry.name);
        let target_dir = source_dir.join(category.dir_name());
        let mut plan = MovePlan {
            category,
            target_dir,
            new_name: entry.name.clone(),
            target_path: None,
            already_placed: false,
        };

        if let Err(e) = self.ensure_dir(&plan.target_dir, run) {
            return failed(entry, plan, FailureReason::DirectoryCreation, &e);
        }

        let new_name = self.candidate_name(entry, run);
        plan.new_name = new_name.to_string_lossy().into_owned();

        let resolution = match run.resolver.resolve(&plan.target_dir, &new_name, &entry.path) {
            Ok(resolution) => resolution,
            Err(e) => return failed(entry, plan, FailureReason::TooManyCollisions, &e),
        };
        plan.target_path = Some(resolution.path.clone());
        plan.already_placed = resolution.already_placed;

        let mut report = EntryReport {
            name: entry.name.clone(),
            source: entry.path.clone(),
            plan: Some(plan),
            outcome: EntryOutcome::Planned,
        };

        if resolution.already_placed {
            report.outcome = EntryOutcome::Skipped {
                reason: SkipReason::AlreadyOrganized,
            };
            return report;
        }

        if self.config.dry_run {
            run.resolver.claim(resolution.path);
            report.outcome = EntryOutcome::Simulated;
            return report;
        }

        report.outcome = match move_file(&entry.path, &resolution.path) {
            Ok(()) => {
                run.resolver.claim(resolution.path);
                EntryOutcome::Moved
            }
            Err(e) => EntryOutcome::Failed {
                reason: FailureReason::Move,
                message: e.to_string(),
            },
        };
        report
    }

    /// Makes sure a category directory exists, or records that it would be
    /// created in a dry run.
    fn ensure_dir(&self, dir: &Path, run: &mut RunState) -> OrganizeResult<()> {
        if run.pending_dirs.contains(dir) || dir.is_dir() {
            return Ok(());
        }

        if self.config.dry_run {
            run.pending_dirs.insert(dir.to_path_buf());
        } else {
            fs::create_dir_all(dir).map_err(|source| OrganizeError::DirectoryCreationFailed {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        if self.config.verbose {
            OutputFormatter::created_dir(dir, self.config.dry_run);
        }
        run.report.created_dirs.push(dir.to_path_buf());
        Ok(())
    }

    fn candidate_name(&self, entry: &FileEntry, run: &mut RunState) -> OsString {
        if !self.config.embed_date {
            return entry.file_name.clone();
        }

        let date = match self.dates.creation_date(&entry.path) {
            Ok(date) => date,
            Err(e) => {
                tracing::warn!("{}; using the current date", e);
                run.report
                    .warnings
                    .push(format!("{}; used the current date", e));
                self.dates.today()
            }
        };
        compute_os_name(&entry.file_name, true, &format_date(date))
    }
}

/// Organizes `source_dir` with the default category table, skipping the
/// running executable.
pub fn organize(
    source_dir: &Path,
    dry_run: bool,
    embed_date: bool,
    verbose: bool,
) -> OrganizeResult<OrganizeReport> {
    let config = OrganizerConfig {
        dry_run,
        embed_date,
        verbose,
        exclusions: ExclusionRules::default().with_current_exe(),
    };
    Organizer::new(config).organize(source_dir)
}

fn failed(
    entry: &FileEntry,
    plan: MovePlan,
    reason: FailureReason,
    error: &OrganizeError,
) -> EntryReport {
    EntryReport {
        name: entry.name.clone(),
        source: entry.path.clone(),
        plan: Some(plan),
        outcome: EntryOutcome::Failed {
            reason,
            message: error.to_string(),
        },
    }
}

fn validate_source_dir(source_dir: &Path) -> OrganizeResult<()> {
    match fs::metadata(source_dir) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(OrganizeError::invalid_source(source_dir, "not a directory")),
        Err(e) => Err(OrganizeError::invalid_source(source_dir, e.to_string())),
    }
}

/// Lists the entries of `source_dir` sorted by name.
fn read_entries(
    source_dir: &Path,
    exclusions: &CompiledExclusions,
    report: &mut OrganizeReport,
) -> OrganizeResult<Vec<FileEntry>> {
    let listing = fs::read_dir(source_dir)
        .map_err(|e| OrganizeError::invalid_source(source_dir, e.to_string()))?;

    let mut entries = Vec::new();
    for item in listing {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!("skipping unreadable entry in {}: {}", source_dir.display(), e);
                report.warnings.push(format!("unreadable entry: {}", e));
                continue;
            }
        };

        let file_name = item.file_name();
        let name = file_name.to_string_lossy().into_owned();
        let path = item.path();
        // Follow symlinks; a dangling link is treated as a file.
        let is_dir = match fs::metadata(&path) {
            Ok(metadata) => metadata.is_dir(),
            Err(_) => item.file_type().map(|t| t.is_dir()).unwrap_or(false),
        };
        let exclusion = exclusions.check(&path, &name);

        entries.push(FileEntry {
            file_name,
            name,
            path,
            is_dir,
            exclusion,
        });
    }

    entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(entries)
}

/// Moves a file, falling back to copy and delete across filesystems.
///
/// The destination must not exist. In the fallback the source is only removed
/// once the copy has the source's full length; a failed copy is cleaned up.
pub fn move_file(from: &Path, to: &Path) -> OrganizeResult<()> {
    let move_failed = |source| OrganizeError::MoveFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!("{} is on another filesystem, copying", to.display());
            copy_then_remove(from, to).map_err(move_failed)
        }
        Err(e) => Err(move_failed(e)),
    }
}

fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    let expected = fs::metadata(from)?.len();

    let verified = fs::copy(from, to).and_then(|copied| {
        let written = fs::metadata(to)?.len();
        if copied == expected && written == expected {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "incomplete copy: {} of {} bytes",
                written, expected
            )))
        }
    });

    if let Err(e) = verified.and_then(|()| fs::remove_file(from)) {
        let _ = fs::remove_file(to);
        return Err(e);
    }
    Ok(())
}
