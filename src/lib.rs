//! dirsift - extension-based file organization
//!
//! This library classifies the top-level files of a directory by extension,
//! groups them into category buckets and relocates them concurrently into
//! category subdirectories, with size-based filtering, collision-safe naming,
//! per-file failure isolation and a dry-run preview mode.

pub mod category;
pub mod cli;
pub mod config;
pub mod organizer;
pub mod output;
pub mod relocate;
pub mod size;
pub mod unique_name;

pub use category::{Classifier, NO_EXTENSION};
pub use config::{CompiledFilters, ConfigError, OrganizeConfig};
pub use organizer::{
    CancellationToken, OrganizeError, OrganizeReport, OrganizeRequest, Organizer,
};
pub use relocate::{FileEntry, RelocationOutcome, RelocationStatus};
pub use size::{SizeBounds, SizeUnit};

pub use cli::{Cli, run};
