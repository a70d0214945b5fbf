//! Target file names: optional date stamps and sanitization.

use crate::errors::{OrganizeError, OrganizeResult};
use crate::file_category::split_extension;
use chrono::{DateTime, Local, NaiveDate};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;

/// Format used for dates embedded in file names.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Characters that are rejected by at least one common filesystem.
pub const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replaces every character from [`INVALID_CHARS`] with `_`.
///
/// # Examples
///
/// ```
/// use sortdir::naming::sanitize_filename;
///
/// assert_eq!(sanitize_filename("a<b>:c.txt"), "a_b__c.txt");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if INVALID_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Computes the name a file gets in its category directory.
///
/// Without `embed_date` the original name is kept as is. With it, the date is
/// appended to the stem (`log.txt` becomes `log_2024-03-01.txt`) and the
/// result is sanitized.
pub fn compute_name(original_name: &str, embed_date: bool, creation_date: &str) -> String {
    if !embed_date {
        return original_name.to_string();
    }

    let (stem, ext) = split_extension(original_name);
    sanitize_filename(&format!("{}_{}{}", stem, creation_date, ext))
}

/// Computes the target name straight from the name found on disk.
///
/// Same rules as [`compute_name`], but a name that is not valid UTF-8 keeps
/// its original bytes instead of going through a lossy conversion.
///
/// # Examples
///
/// ```
/// use sortdir::naming::compute_os_name;
/// use std::ffi::OsStr;
///
/// let name = compute_os_name(OsStr::new("log.txt"), true, "2024-03-01");
/// assert_eq!(name, "log_2024-03-01.txt");
/// ```
pub fn compute_os_name(original_name: &OsStr, embed_date: bool, creation_date: &str) -> OsString {
    if !embed_date {
        return original_name.to_os_string();
    }

    match original_name.to_str() {
        Some(name) => compute_name(name, true, creation_date).into(),
        None => sanitize_os(insert_before_extension(
            original_name,
            &format!("_{}", creation_date),
        )),
    }
}

/// Inserts `suffix` between the stem and the extension of `name`.
///
/// Uses the same split as [`split_extension`]: leading dots never start an
/// extension.
pub fn insert_before_extension(name: &OsStr, suffix: &str) -> OsString {
    if let Some(name) = name.to_str() {
        let (stem, ext) = split_extension(name);
        return format!("{}{}{}", stem, suffix, ext).into();
    }
    insert_raw(name, suffix)
}

#[cfg(unix)]
fn insert_raw(name: &OsStr, suffix: &str) -> OsString {
    use std::os::unix::ffi::{OsStrExt, OsStringExt};

    let bytes = name.as_bytes();
    let leading = bytes.iter().take_while(|&&b| b == b'.').count();
    let split = bytes[leading..]
        .iter()
        .rposition(|&b| b == b'.')
        .map_or(bytes.len(), |i| leading + i);
    let (stem, ext) = bytes.split_at(split);

    let mut out = Vec::with_capacity(bytes.len() + suffix.len());
    out.extend_from_slice(stem);
    out.extend_from_slice(suffix.as_bytes());
    out.extend_from_slice(ext);
    OsString::from_vec(out)
}

// Names that are not valid Unicode are rare outside Unix.
#[cfg(not(unix))]
fn insert_raw(name: &OsStr, suffix: &str) -> OsString {
    let name = name.to_string_lossy();
    let (stem, ext) = split_extension(&name);
    format!("{}{}{}", stem, suffix, ext).into()
}

#[cfg(unix)]
fn sanitize_os(name: OsString) -> OsString {
    use std::os::unix::ffi::OsStringExt;

    let mut bytes = name.into_vec();
    for b in bytes.iter_mut() {
        if b.is_ascii() && INVALID_CHARS.contains(&char::from(*b)) {
            *b = b'_';
        }
    }
    OsString::from_vec(bytes)
}

#[cfg(not(unix))]
fn sanitize_os(name: OsString) -> OsString {
    sanitize_filename(&name.to_string_lossy()).into()
}

/// Formats a date the way it is embedded in file names.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Supplies the creation date used when embedding dates in file names.
pub trait DateSource {
    /// Returns the creation-like date of the file at `path`.
    fn creation_date(&self, path: &Path) -> OrganizeResult<NaiveDate>;

    /// The date used when [`DateSource::creation_date`] fails.
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Reads dates from filesystem metadata.
///
/// Prefers the birth time (creation time on Windows and macOS, `statx` birth
/// time on Linux filesystems that record it). Where birth time is not
/// available the last modification time is used instead. Dates are in local
/// time.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileTimestamps;

impl DateSource for FileTimestamps {
    fn creation_date(&self, path: &Path) -> OrganizeResult<NaiveDate> {
        let unavailable = |source| OrganizeError::TimestampUnavailable {
            path: path.to_path_buf(),
            source,
        };

        let metadata = fs::metadata(path).map_err(unavailable)?;
        let time = match metadata.created() {
            Ok(time) => time,
            Err(e) => {
                tracing::debug!(
                    "birth time unavailable for {}, using mtime: {}",
                    path.display(),
                    e
                );
                metadata.modified().map_err(unavailable)?
            }
        };

        Ok(DateTime::<Local>::from(time).date_naive())
    }
}

/// Always reports the same date; handy for reproducible runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedDate(pub NaiveDate);

impl DateSource for FixedDate {
    fn creation_date(&self, _path: &Path) -> OrganizeResult<NaiveDate> {
        Ok(self.0)
    }

    fn today(&self) -> NaiveDate {
        self.0
    }
}
