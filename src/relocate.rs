//! Per-file relocation with failure isolation.
//!
//! A relocation copies one file into its category directory under a
//! collision-free name, optionally deleting the original afterwards. Every
//! possible failure is captured into the returned [`RelocationOutcome`];
//! [`RelocationExecutor::relocate`] never propagates an error, so one broken
//! file can never abort its siblings.

use crate::unique_name;
use log::{error, info, warn};
use serde::Serialize;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// A file selected for relocation during the scan phase.
///
/// Entries are derived once, before any concurrent work starts, and are
/// read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    /// Full path of the source file.
    pub path: PathBuf,
    /// The file's name component.
    pub base_name: String,
    /// Lowercase extension without leading dot, or empty when absent.
    pub extension: String,
    /// File size in bytes at scan time.
    pub size_bytes: u64,
}

/// How a single relocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelocationStatus {
    /// The file was copied (and, when requested, the original deleted).
    Copied,
    /// Dry run: the destination was computed but nothing was touched.
    Simulated,
    /// The relocation failed; the error message is recorded.
    Failed,
    /// The run was cancelled before this file was dispatched.
    Cancelled,
}

/// The result of relocating (or simulating the relocation of) one file.
#[derive(Debug, Clone, Serialize)]
pub struct RelocationOutcome {
    /// Original source path.
    pub source: PathBuf,
    /// Category label the file was routed to.
    pub category: String,
    /// Resolved destination path, when one was computed.
    pub destination: Option<PathBuf>,
    /// Final status.
    pub status: RelocationStatus,
    /// Failure message, present only for [`RelocationStatus::Failed`].
    pub error: Option<String>,
}

impl RelocationOutcome {
    fn failed(entry: &FileEntry, category: &str, destination: Option<PathBuf>, message: String) -> Self {
        error!("{}: {}", entry.path.display(), message);
        Self {
            source: entry.path.clone(),
            category: category.to_string(),
            destination,
            status: RelocationStatus::Failed,
            error: Some(message),
        }
    }

    /// Builds the outcome for a file that was never dispatched because the
    /// run was cancelled.
    pub fn cancelled(entry: &FileEntry, category: &str) -> Self {
        Self {
            source: entry.path.clone(),
            category: category.to_string(),
            destination: None,
            status: RelocationStatus::Cancelled,
            error: None,
        }
    }
}

/// Options controlling how relocations are performed.
#[derive(Debug, Clone, Copy)]
pub struct RelocateOptions {
    /// Delete the source file after a successful copy.
    pub delete_originals: bool,
    /// Compute destinations and log intents without touching the filesystem.
    pub dry_run: bool,
}

/// Performs the copy, optional delete-of-original and error capture for one
/// file.
pub struct RelocationExecutor;

impl RelocationExecutor {
    /// Relocates `entry` into `dest_dir`, returning the outcome.
    ///
    /// Steps: ensure the destination directory exists (skipped entirely in
    /// dry runs), resolve a collision-free name, copy bytes and permissions,
    /// then delete the original when requested. Name reservation is atomic
    /// (`create_new`), so concurrent relocations into the same directory
    /// cannot claim the same destination.
    pub fn relocate(
        entry: &FileEntry,
        category: &str,
        dest_dir: &Path,
        options: &RelocateOptions,
    ) -> RelocationOutcome {
        if options.dry_run {
            let name = unique_name::preview(dest_dir, &entry.base_name);
            let destination = dest_dir.join(name);
            info!(
                "Would copy {} to {}",
                entry.path.display(),
                destination.display()
            );
            return RelocationOutcome {
                source: entry.path.clone(),
                category: category.to_string(),
                destination: Some(destination),
                status: RelocationStatus::Simulated,
                error: None,
            };
        }

        // create_dir_all treats an already-existing directory as success, so
        // concurrent workers racing on the same category are safe here.
        if let Err(e) = fs::create_dir_all(dest_dir) {
            return RelocationOutcome::failed(
                entry,
                category,
                None,
                format!("Failed to create directory {}: {}", dest_dir.display(), e),
            );
        }

        let (destination, dest_file) = match unique_name::reserve(dest_dir, &entry.base_name) {
            Ok(reserved) => reserved,
            Err(e) => {
                return RelocationOutcome::failed(
                    entry,
                    category,
                    None,
                    format!("Failed to reserve destination name: {}", e),
                );
            }
        };

        if let Err(e) = copy_contents(&entry.path, dest_file) {
            // Best-effort cleanup of the reserved, partially written file.
            let _ = fs::remove_file(&destination);
            return RelocationOutcome::failed(
                entry,
                category,
                Some(destination.clone()),
                format!("Failed to copy to {}: {}", destination.display(), e),
            );
        }

        if let Err(e) = copy_permissions(&entry.path, &destination) {
            warn!(
                "Copied {} but could not copy permissions: {}",
                destination.display(),
                e
            );
        }

        info!("Copied {} to {}", entry.path.display(), destination.display());

        if options.delete_originals {
            if let Err(e) = fs::remove_file(&entry.path) {
                return RelocationOutcome::failed(
                    entry,
                    category,
                    Some(destination),
                    format!("Copied, but failed to delete original: {}", e),
                );
            }
            info!("Deleted {}", entry.path.display());
        }

        RelocationOutcome {
            source: entry.path.clone(),
            category: category.to_string(),
            destination: Some(destination),
            status: RelocationStatus::Copied,
            error: None,
        }
    }
}

/// Streams the source file's bytes into an already-open destination file.
fn copy_contents(source: &Path, mut dest_file: File) -> io::Result<()> {
    let mut src_file = File::open(source)?;
    io::copy(&mut src_file, &mut dest_file)?;
    dest_file.sync_all()?;
    Ok(())
}

fn copy_permissions(source: &Path, destination: &Path) -> io::Result<()> {
    let permissions = fs::metadata(source)?.permissions();
    fs::set_permissions(destination, permissions)
}
