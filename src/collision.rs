//! Collision-safe destination paths.
//!
//! A destination is only handed out when nothing occupies it and no earlier
//! file of the same run has claimed it. When the occupant is the very file
//! being organized, the file is reported as already in place instead.

use crate::errors::{OrganizeError, OrganizeResult};
use crate::naming::insert_before_extension;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Maximum number of `_copyN` alternatives tried before giving up.
pub const MAX_COPY_ATTEMPTS: usize = 1000;

/// Outcome of resolving a destination path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The path the file should be moved to.
    pub path: PathBuf,
    /// The file already lives at `path`; nothing needs to move.
    pub already_placed: bool,
}

/// Hands out unique destination paths for one organizing run.
#[derive(Debug, Default)]
pub struct CollisionResolver {
    claimed: HashSet<PathBuf>,
}

impl CollisionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `path` as taken for the rest of the run.
    ///
    /// Dry runs leave the filesystem untouched, so without claims two files
    /// with the same computed name would both be offered the same path.
    pub fn claim(&mut self, path: PathBuf) {
        self.claimed.insert(path);
    }

    /// Finds where `source_path` should go inside `target_dir`.
    ///
    /// Tries `candidate_name` first, then `{stem}_copy{N}{ext}` for
    /// `N = 1..=MAX_COPY_ATTEMPTS`; the lowest free `N` wins. Names are
    /// handled as [`OsStr`], so bytes that are not UTF-8 survive.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizeError::TooManyCollisions`] when every alternative is
    /// taken.
    pub fn resolve(
        &self,
        target_dir: &Path,
        candidate_name: impl AsRef<OsStr>,
        source_path: &Path,
    ) -> OrganizeResult<Resolution> {
        let candidate_name = candidate_name.as_ref();
        let target_path = target_dir.join(candidate_name);
        if let Some(resolution) = self.check(target_path.clone(), source_path) {
            return Ok(resolution);
        }

        for n in 1..=MAX_COPY_ATTEMPTS {
            let alternative = insert_before_extension(candidate_name, &format!("_copy{}", n));
            if let Some(resolution) = self.check(target_dir.join(alternative), source_path) {
                tracing::debug!(
                    "{} is taken, using {}",
                    target_path.display(),
                    resolution.path.display()
                );
                return Ok(resolution);
            }
        }

        Err(OrganizeError::TooManyCollisions {
            path: target_path,
            attempts: MAX_COPY_ATTEMPTS,
        })
    }

    /// Returns a resolution if `path` is usable, `None` if it is taken by
    /// something else.
    fn check(&self, path: PathBuf, source_path: &Path) -> Option<Resolution> {
        if self.claimed.contains(&path) {
            return None;
        }

        if !occupied(&path) {
            return Some(Resolution {
                path,
                already_placed: false,
            });
        }

        // Unreadable metadata counts as a different file.
        if same_file(&path, source_path).unwrap_or(false) {
            return Some(Resolution {
                path,
                already_placed: true,
            });
        }

        None
    }
}

/// True if anything, including a dangling symlink, exists at `path`.
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Checks whether two paths refer to the same underlying file.
///
/// Compares device and inode numbers, so hard links and paths through
/// symlinked directories are recognised.
#[cfg(unix)]
pub fn same_file(a: &Path, b: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let meta_a = fs::metadata(a)?;
    let meta_b = fs::metadata(b)?;
    Ok(meta_a.dev() == meta_b.dev() && meta_a.ino() == meta_b.ino())
}

/// Checks whether two paths refer to the same underlying file.
///
/// Compares fully resolved paths; hard links are not detected.
#[cfg(not(unix))]
pub fn same_file(a: &Path, b: &Path) -> io::Result<bool> {
    Ok(fs::canonicalize(a)? == fs::canonicalize(b)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target_dir = temp_dir.path().join("Documents");
        fs::create_dir(&target_dir).expect("Failed to create target directory");
        let source = temp_dir.path().join("a.txt");
        fs::write(&source, "source").expect("Failed to write source file");
        (temp_dir, target_dir, source)
    }

    #[test]
    fn test_free_target_is_used_directly() {
        let (_temp_dir, target_dir, source) = setup();
        let resolver = CollisionResolver::new();

        let resolution = resolver
            .resolve(&target_dir, "a.txt", &source)
            .expect("Failed to resolve");
        assert_eq!(resolution.path, target_dir.join("a.txt"));
        assert!(!resolution.already_placed);
    }

    #[test]
    fn test_missing_target_dir_is_not_a_collision() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("a.txt");
        fs::write(&source, "source").expect("Failed to write source file");

        let target_dir = temp_dir.path().join("Documents");
        let resolution = CollisionResolver::new()
            .resolve(&target_dir, "a.txt", &source)
            .expect("Failed to resolve");
        assert_eq!(resolution.path, target_dir.join("a.txt"));
    }

    #[test]
    fn test_unrelated_file_gets_copy_suffix() {
        let (_temp_dir, target_dir, source) = setup();
        fs::write(target_dir.join("a.txt"), "other").expect("Failed to write occupant");

        let resolution = CollisionResolver::new()
            .resolve(&target_dir, "a.txt", &source)
            .expect("Failed to resolve");
        assert_eq!(resolution.path, target_dir.join("a_copy1.txt"));
        assert!(!resolution.already_placed);
    }

    #[test]
    fn test_lowest_free_copy_number_wins() {
        let (_temp_dir, target_dir, source) = setup();
        fs::write(target_dir.join("a.txt"), "other").expect("Failed to write occupant");
        fs::write(target_dir.join("a_copy1.txt"), "other").expect("Failed to write occupant");
        fs::write(target_dir.join("a_copy3.txt"), "other").expect("Failed to write occupant");

        let resolution = CollisionResolver::new()
            .resolve(&target_dir, "a.txt", &source)
            .expect("Failed to resolve");
        assert_eq!(resolution.path, target_dir.join("a_copy2.txt"));
    }

    #[test]
    fn test_copy_suffix_without_extension() {
        let (_temp_dir, target_dir, source) = setup();
        fs::write(target_dir.join("notes"), "other").expect("Failed to write occupant");

        let resolution = CollisionResolver::new()
            .resolve(&target_dir, "notes", &source)
            .expect("Failed to resolve");
        assert_eq!(resolution.path, target_dir.join("notes_copy1"));
    }

    #[test]
    fn test_directory_occupant_is_a_collision() {
        let (_temp_dir, target_dir, source) = setup();
        fs::create_dir(target_dir.join("a.txt")).expect("Failed to create occupant dir");

        let resolution = CollisionResolver::new()
            .resolve(&target_dir, "a.txt", &source)
            .expect("Failed to resolve");
        assert_eq!(resolution.path, target_dir.join("a_copy1.txt"));
    }

    #[test]
    fn test_claimed_paths_are_skipped() {
        let (_temp_dir, target_dir, source) = setup();
        let mut resolver = CollisionResolver::new();
        resolver.claim(target_dir.join("a.txt"));

        let resolution = resolver
            .resolve(&target_dir, "a.txt", &source)
            .expect("Failed to resolve");
        assert_eq!(resolution.path, target_dir.join("a_copy1.txt"));
    }

    #[test]
    fn test_too_many_collisions() {
        let (_temp_dir, target_dir, source) = setup();
        let mut resolver = CollisionResolver::new();
        resolver.claim(target_dir.join("a.txt"));
        for n in 1..=MAX_COPY_ATTEMPTS {
            resolver.claim(target_dir.join(format!("a_copy{}.txt", n)));
        }

        let result = resolver.resolve(&target_dir, "a.txt", &source);
        assert!(matches!(
            result,
            Err(OrganizeError::TooManyCollisions { attempts, .. }) if attempts == MAX_COPY_ATTEMPTS
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_copy_suffix_keeps_raw_name_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let (_temp_dir, target_dir, source) = setup();
        let name = OsStr::from_bytes(b"caf\xe9.txt");
        fs::write(target_dir.join(name), "other").expect("Failed to write occupant");

        let resolution = CollisionResolver::new()
            .resolve(&target_dir, name, &source)
            .expect("Failed to resolve");
        assert_eq!(
            resolution.path,
            target_dir.join(OsStr::from_bytes(b"caf\xe9_copy1.txt"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_hard_link_is_already_placed() {
        let (_temp_dir, target_dir, source) = setup();
        fs::hard_link(&source, target_dir.join("a.txt")).expect("Failed to create hard link");

        let resolution = CollisionResolver::new()
            .resolve(&target_dir, "a.txt", &source)
            .expect("Failed to resolve");
        assert_eq!(resolution.path, target_dir.join("a.txt"));
        assert!(resolution.already_placed);
    }

    #[test]
    fn test_same_file() {
        let (_temp_dir, target_dir, source) = setup();
        let other = target_dir.join("other.txt");
        fs::write(&other, "other").expect("Failed to write other file");

        assert!(same_file(&source, &source).unwrap());
        assert!(!same_file(&source, &other).unwrap());
        assert!(same_file(&source, &target_dir.join("missing")).is_err());
    }
}
