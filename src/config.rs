//! Run options and entry exclusion rules.
//!
//! Exclusions come in four flavours, checked in this order:
//! - Exact paths (compared by file identity, e.g. the running executable)
//! - Exact file names
//! - Glob patterns matched against the file name
//! - Regex patterns matched against the file name
//!
//! Rules are compiled once into [`CompiledExclusions`] so patterns are not
//! reparsed for every entry.

use crate::collision::same_file;
use crate::errors::{OrganizeError, OrganizeResult};
use glob::Pattern;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Options for one organizing run.
#[derive(Debug, Clone)]
pub struct OrganizerConfig {
    /// Report intended actions without touching the filesystem.
    pub dry_run: bool,
    /// Append the file's creation date to its name.
    pub embed_date: bool,
    /// Print every action to the console.
    pub verbose: bool,
    /// Entries that are never moved.
    pub exclusions: ExclusionRules,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            embed_date: false,
            verbose: true,
            exclusions: ExclusionRules::default(),
        }
    }
}

/// Rules for leaving entries where they are.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    /// Files excluded by identity, wherever they are reached from.
    pub paths: Vec<PathBuf>,
    /// Exact file names (e.g. "Thumbs.db").
    pub filenames: Vec<String>,
    /// Glob patterns (e.g. "*.part", "~$*").
    pub patterns: Vec<String>,
    /// Regex patterns.
    pub regex: Vec<String>,
}

impl ExclusionRules {
    /// Adds the running executable to the excluded paths.
    ///
    /// If the executable path cannot be determined the rules are returned
    /// unchanged.
    pub fn with_current_exe(mut self) -> Self {
        match std::env::current_exe() {
            Ok(exe) => self.paths.push(exe),
            Err(e) => tracing::warn!("could not determine the running executable: {}", e),
        }
        self
    }

    /// Compiles the rules for matching.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizeError::InvalidPattern`] if any glob or regex is invalid.
    pub fn compile(self) -> OrganizeResult<CompiledExclusions> {
        CompiledExclusions::new(self)
    }
}

/// Why an entry matched the exclusion set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionMatch {
    /// The entry is one of the excluded paths.
    Path,
    /// The entry's name matched a name, glob or regex rule.
    Rule,
}

/// Compiled exclusion rules.
pub struct CompiledExclusions {
    paths: Vec<PathBuf>,
    filenames: HashSet<String>,
    patterns: Vec<Pattern>,
    regexes: Vec<Regex>,
}

impl CompiledExclusions {
    fn new(rules: ExclusionRules) -> OrganizeResult<Self> {
        let patterns = rules
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|e| OrganizeError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let regexes = rules
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| OrganizeError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            paths: rules.paths,
            filenames: rules.filenames.into_iter().collect(),
            patterns,
            regexes,
        })
    }

    /// Checks an entry against the rules.
    pub fn check(&self, path: &Path, file_name: &str) -> Option<ExclusionMatch> {
        // Excluded paths that no longer exist simply never match.
        if self
            .paths
            .iter()
            .any(|excluded| same_file(excluded, path).unwrap_or(false))
        {
            return Some(ExclusionMatch::Path);
        }

        if self.filenames.contains(file_name)
            || self.patterns.iter().any(|p| p.matches(file_name))
            || self.regexes.iter().any(|r| r.is_match(file_name))
        {
            return Some(ExclusionMatch::Rule);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = OrganizerConfig::default();
        assert!(!config.dry_run);
        assert!(!config.embed_date);
        assert!(config.verbose);
        assert!(config.exclusions.paths.is_empty());
    }

    #[test]
    fn test_empty_rules_match_nothing() {
        let compiled = ExclusionRules::default().compile().unwrap();
        assert_eq!(compiled.check(Path::new("/tmp/a.txt"), "a.txt"), None);
    }

    #[test]
    fn test_exclude_exact_filename() {
        let rules = ExclusionRules {
            filenames: vec!["Thumbs.db".to_string()],
            ..Default::default()
        };
        let compiled = rules.compile().unwrap();

        assert_eq!(
            compiled.check(Path::new("Thumbs.db"), "Thumbs.db"),
            Some(ExclusionMatch::Rule)
        );
        assert_eq!(compiled.check(Path::new("image.jpg"), "image.jpg"), None);
    }

    #[test]
    fn test_exclude_glob_patterns() {
        let rules = ExclusionRules {
            patterns: vec!["*.part".to_string(), "[0-9]*.tmp".to_string()],
            ..Default::default()
        };
        let compiled = rules.compile().unwrap();

        assert!(compiled.check(Path::new("movie.part"), "movie.part").is_some());
        assert!(compiled.check(Path::new("1cache.tmp"), "1cache.tmp").is_some());
        assert!(compiled.check(Path::new("cache.tmp"), "cache.tmp").is_none());
    }

    #[test]
    fn test_exclude_regex() {
        let rules = ExclusionRules {
            regex: vec![r"^test_.*\.txt$".to_string()],
            ..Default::default()
        };
        let compiled = rules.compile().unwrap();

        assert!(compiled.check(Path::new("test_a.txt"), "test_a.txt").is_some());
        assert!(compiled.check(Path::new("file.txt"), "file.txt").is_none());
    }

    #[test]
    fn test_exclude_path_by_identity() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let tool = temp_dir.path().join("tool.exe");
        fs::write(&tool, "binary").expect("Failed to write file");
        let other = temp_dir.path().join("other.exe");
        fs::write(&other, "binary").expect("Failed to write file");

        let rules = ExclusionRules {
            paths: vec![tool.clone()],
            ..Default::default()
        };
        let compiled = rules.compile().unwrap();

        assert_eq!(compiled.check(&tool, "tool.exe"), Some(ExclusionMatch::Path));
        assert_eq!(compiled.check(&other, "other.exe"), None);
    }

    #[test]
    fn test_missing_excluded_path_never_matches() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, "data").expect("Failed to write file");

        let rules = ExclusionRules {
            paths: vec![temp_dir.path().join("gone.exe")],
            ..Default::default()
        };
        let compiled = rules.compile().unwrap();
        assert_eq!(compiled.check(&file, "a.txt"), None);
    }

    #[test]
    fn test_with_current_exe_adds_a_path() {
        let rules = ExclusionRules::default().with_current_exe();
        assert_eq!(rules.paths.len(), 1);
    }

    #[test]
    fn test_invalid_glob_returns_error() {
        let rules = ExclusionRules {
            patterns: vec!["[invalid".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            rules.compile(),
            Err(OrganizeError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_invalid_regex_returns_error() {
        let rules = ExclusionRules {
            regex: vec!["[invalid(".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            rules.compile(),
            Err(OrganizeError::InvalidPattern { .. })
        ));
    }
}
