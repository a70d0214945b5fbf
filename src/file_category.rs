//! File categorization by extension.
//!
//! The extension table is plain data ([`DEFAULT_CATEGORIES`]); a [`CategoryMap`]
//! is built from it once and handed to the organizer, so lookups never touch
//! global state.
//!
//! # Examples
//!
//! ```
//! use sortdir::file_category::{Category, CategoryMap};
//!
//! let map = CategoryMap::default();
//! assert_eq!(map.classify("IMG.JPG"), Category::new("Images"));
//! assert_eq!(map.classify("notes"), Category::no_extension());
//! assert_eq!(map.classify("data.xyz"), Category::other());
//! ```

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Default extension table: category label followed by the lowercase
/// extensions (without the leading dot) that belong to it.
///
/// Add a row or an extension here to extend the built-in categories.
pub const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Images",
        &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp", "svg"],
    ),
    ("Videos", &["mp4", "mov", "avi", "mkv", "flv", "wmv", "webm"]),
    (
        "Documents",
        &[
            "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "rtf", "odt", "ods", "odp",
            "csv", "md",
        ],
    ),
    ("Audio", &["mp3", "wav", "flac", "aac", "ogg", "wma", "m4a"]),
    ("Archives", &["zip", "rar", "7z", "tar", "gz", "bz2", "xz"]),
    ("Executables", &["exe", "msi", "dmg", "deb", "rpm"]),
    (
        "Code",
        &[
            "py", "js", "html", "css", "json", "xml", "c", "cpp", "java", "go", "rb", "php", "sh",
            "bat", "yml", "yaml",
        ],
    ),
    ("Databases", &["sqlite", "db"]),
    ("Fonts", &["ttf", "otf", "woff", "woff2"]),
];

/// A destination subfolder label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Label for files whose extension is not in the table.
    pub const OTHER: &'static str = "Other";
    /// Label for files without an extension.
    pub const NO_EXTENSION: &'static str = "No_Extension";

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn other() -> Self {
        Self::new(Self::OTHER)
    }

    pub fn no_extension() -> Self {
        Self::new(Self::NO_EXTENSION)
    }

    /// Returns the directory name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use sortdir::file_category::Category;
    ///
    /// assert_eq!(Category::new("Images").dir_name(), "Images");
    /// assert_eq!(Category::other().dir_name(), "Other");
    /// ```
    pub fn dir_name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Splits a file name into its stem and extension.
///
/// The extension keeps its leading dot and is empty when the name has none.
/// Leading dots belong to the stem, so `.bashrc` has no extension, while
/// `archive.tar.gz` splits into `archive.tar` and `.gz`.
pub fn split_extension(name: &str) -> (&str, &str) {
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(idx) => name.split_at(leading + idx),
        None => (name, ""),
    }
}

/// Maps file extensions to categories.
#[derive(Debug, Clone)]
pub struct CategoryMap {
    extension_map: HashMap<String, Category>,
}

impl CategoryMap {
    /// Creates a map with no extensions; every file with an extension
    /// classifies as [`Category::OTHER`].
    pub fn empty() -> Self {
        Self {
            extension_map: HashMap::new(),
        }
    }

    /// Builds a map from a table shaped like [`DEFAULT_CATEGORIES`].
    pub fn from_table(table: &[(&str, &[&str])]) -> Self {
        let mut map = Self::empty();
        for (label, extensions) in table {
            for ext in *extensions {
                map.add_extension(ext, Category::new(*label));
            }
        }
        map
    }

    /// Adds or replaces a file extension to category mapping.
    pub fn add_extension(&mut self, ext: &str, category: Category) {
        self.extension_map
            .insert(ext.trim_start_matches('.').to_lowercase(), category);
    }

    /// Maps a bare extension (no dot) to a category, case-insensitively.
    pub fn extension_to_category(&self, ext: &str) -> Option<&Category> {
        self.extension_map.get(&ext.to_lowercase())
    }

    /// Classifies a file name by its extension.
    ///
    /// Returns [`Category::NO_EXTENSION`] when the name has no extension (or a
    /// bare trailing dot) and [`Category::OTHER`] when the extension is unknown.
    pub fn classify(&self, filename: &str) -> Category {
        let (_, ext) = split_extension(filename);
        let ext = ext.trim_start_matches('.');
        if ext.is_empty() {
            return Category::no_extension();
        }

        self.extension_to_category(ext)
            .cloned()
            .unwrap_or_else(Category::other)
    }
}

impl Default for CategoryMap {
    fn default() -> Self {
        Self::from_table(DEFAULT_CATEGORIES)
    }
}
