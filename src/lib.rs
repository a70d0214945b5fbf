//! sortdir - sort the files of a directory into category subdirectories
//!
//! Files are classified by extension, optionally renamed to carry their
//! creation date, and moved without ever overwriting an existing file.
//! Runs are idempotent and can be simulated with a dry run.

pub mod cli;
pub mod collision;
pub mod config;
pub mod errors;
pub mod file_category;
pub mod file_organizer;
pub mod naming;
pub mod output;
pub mod report;

pub use collision::{CollisionResolver, Resolution};
pub use config::{ExclusionRules, OrganizerConfig};
pub use errors::{OrganizeError, OrganizeResult};
pub use file_category::{Category, CategoryMap};
pub use file_organizer::{Organizer, organize};
pub use report::{EntryOutcome, OrganizeReport, SkipReason};

pub use cli::{Cli, run_cli};
