//! Per-entry outcomes of an organizing run.

use crate::file_category::Category;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Why an entry was left where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Directories are never moved.
    Directory,
    /// The entry is an excluded path, such as the running executable.
    SelfArtifact,
    /// The entry matched an exclusion rule.
    Excluded,
    /// The file already sits at its computed destination.
    AlreadyOrganized,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Directory => "directory",
            Self::SelfArtifact => "self",
            Self::Excluded => "excluded",
            Self::AlreadyOrganized => "already organized",
        })
    }
}

/// Kind of per-file failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    DirectoryCreation,
    TooManyCollisions,
    Move,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DirectoryCreation => "mkdir error",
            Self::TooManyCollisions => "too many collisions",
            Self::Move => "move error",
        })
    }
}

/// Final state of one directory entry.
///
/// `Planned` is never final; every processed entry ends up in one of the
/// other states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EntryOutcome {
    Skipped { reason: SkipReason },
    Planned,
    Simulated,
    Moved,
    Failed { reason: FailureReason, message: String },
}

/// Where a file is headed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovePlan {
    pub category: Category,
    pub target_dir: PathBuf,
    pub new_name: String,
    /// Resolved destination; `None` until collision resolution succeeds.
    pub target_path: Option<PathBuf>,
    pub already_placed: bool,
}

/// What happened to one directory entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntryReport {
    pub name: String,
    pub source: PathBuf,
    pub plan: Option<MovePlan>,
    pub outcome: EntryOutcome,
}

impl EntryReport {
    pub fn skipped(name: String, source: PathBuf, reason: SkipReason) -> Self {
        Self {
            name,
            source,
            plan: None,
            outcome: EntryOutcome::Skipped { reason },
        }
    }

    /// The destination the file was (or would be) moved to.
    pub fn destination(&self) -> Option<&PathBuf> {
        match self.outcome {
            EntryOutcome::Moved | EntryOutcome::Simulated => {
                self.plan.as_ref().and_then(|p| p.target_path.as_ref())
            }
            _ => None,
        }
    }
}

/// Result of an organizing run.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizeReport {
    pub source_dir: PathBuf,
    pub dry_run: bool,
    pub entries: Vec<EntryReport>,
    /// Category directories created (or, in a dry run, that would be).
    pub created_dirs: Vec<PathBuf>,
    /// Recoverable conditions that did not fail any entry.
    pub warnings: Vec<String>,
}

impl OrganizeReport {
    pub fn new(source_dir: PathBuf, dry_run: bool) -> Self {
        Self {
            source_dir,
            dry_run,
            entries: Vec::new(),
            created_dirs: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn count(&self, pred: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }

    pub fn moved(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Moved))
    }

    pub fn simulated(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Simulated))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Failed { .. }))
    }

    /// Entries that were moved, or would be in a dry run, grouped by category.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            if entry.destination().is_none() {
                continue;
            }
            if let Some(plan) = &entry.plan {
                *counts.entry(plan.category.to_string()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Entries that ended in [`EntryOutcome::Failed`], in listing order.
    pub fn failures(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, EntryOutcome::Failed { .. }))
    }
}
