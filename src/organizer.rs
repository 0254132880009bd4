//! Directory scanning and relocation orchestration.
//!
//! The orchestrator scans the top level of a source directory, groups
//! eligible files by category, ensures the category subdirectories exist and
//! fans the per-file relocations out across a bounded rayon worker pool.
//! The scan is single-threaded and completes before any relocation starts,
//! so the category buckets are read-only during the concurrent phase.
//!
//! Errors while listing the directory abort the whole call; errors while
//! relocating a single file only mark that file's entry in the report.

use crate::category::{Classifier, extension_of};
use crate::config::CompiledFilters;
use crate::relocate::{
    FileEntry, RelocateOptions, RelocationExecutor, RelocationOutcome, RelocationStatus,
};
use crate::size::{SizeBounds, SizeUnit};
use log::{error, info};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Parameters for one `organize` call.
#[derive(Debug, Clone)]
pub struct OrganizeRequest {
    /// Directory whose top-level files are organized.
    pub source_dir: PathBuf,
    /// Delete each source file after a successful copy.
    pub delete_originals: bool,
    /// Compute and log everything without touching the filesystem.
    pub dry_run: bool,
    /// Minimum size in `size_unit` units; `0` means no lower bound.
    pub min_size: f64,
    /// Maximum size in `size_unit` units; `0` means no upper bound.
    pub max_size: f64,
    /// Unit for `min_size` and `max_size`.
    pub size_unit: SizeUnit,
}

impl OrganizeRequest {
    /// Validates the size bounds and converts them to bytes.
    ///
    /// Negative or non-finite magnitudes and a nonzero minimum above a
    /// nonzero maximum are rejected before any scanning begins.
    pub fn validate(&self) -> Result<SizeBounds, OrganizeError> {
        if !self.min_size.is_finite() || self.min_size < 0.0 {
            return Err(OrganizeError::InvalidBounds {
                reason: format!("minimum size must be a non-negative number, got {}", self.min_size),
            });
        }
        if !self.max_size.is_finite() || self.max_size < 0.0 {
            return Err(OrganizeError::InvalidBounds {
                reason: format!("maximum size must be a non-negative number, got {}", self.max_size),
            });
        }
        let bounds = SizeBounds::from_magnitudes(self.min_size, self.max_size, self.size_unit);
        if bounds.min_bytes != 0 && bounds.max_bytes != 0 && bounds.min_bytes > bounds.max_bytes {
            return Err(OrganizeError::InvalidBounds {
                reason: format!(
                    "minimum size ({} bytes) exceeds maximum size ({} bytes)",
                    bounds.min_bytes, bounds.max_bytes
                ),
            });
        }
        Ok(bounds)
    }
}

/// Errors that abort an `organize` call before or during the scan.
///
/// Per-file relocation failures are not represented here; they are isolated
/// into the report.
#[derive(Debug)]
pub enum OrganizeError {
    /// The requested size bounds are malformed.
    InvalidBounds { reason: String },
    /// The source directory could not be listed.
    ScanFailed { path: PathBuf, source: io::Error },
    /// The worker pool could not be built.
    WorkerPool { reason: String },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBounds { reason } => write!(f, "Invalid size bounds: {}", reason),
            Self::ScanFailed { path, source } => {
                write!(f, "Failed to scan {}: {}", path.display(), source)
            }
            Self::WorkerPool { reason } => write!(f, "Failed to build worker pool: {}", reason),
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ScanFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for orchestration operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Signal for stopping a run early.
///
/// Cancelling stops the dispatch of not-yet-started relocations; in-flight
/// ones finish normally and the report covers everything, with undispatched
/// files marked [`RelocationStatus::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Ordered mapping from category label to the files routed to it.
///
/// Insertion order is first-observed order and determines report ordering.
/// Built single-threaded during the scan; read-only afterwards.
#[derive(Debug, Default)]
pub struct CategoryBuckets {
    inner: Vec<(String, Vec<FileEntry>)>,
}

impl CategoryBuckets {
    fn push(&mut self, category: String, entry: FileEntry) {
        match self.inner.iter_mut().find(|(label, _)| *label == category) {
            Some((_, files)) => files.push(entry),
            None => self.inner.push((category, vec![entry])),
        }
    }

    /// Iterates buckets in first-observed order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FileEntry])> {
        self.inner
            .iter()
            .map(|(label, files)| (label.as_str(), files.as_slice()))
    }

    /// Total number of files across all buckets.
    pub fn file_count(&self) -> usize {
        self.inner.iter().map(|(_, files)| files.len()).sum()
    }

    /// True when no file passed the filters.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Outcomes for one category, in scan order.
#[derive(Debug, Serialize)]
pub struct CategoryReport {
    /// Category label, which is also the subdirectory name.
    pub label: String,
    /// One outcome per file routed to this category.
    pub outcomes: Vec<RelocationOutcome>,
}

/// Aggregated result of one `organize` call.
#[derive(Debug, Serialize)]
pub struct OrganizeReport {
    /// RFC 3339 timestamp of when the run started.
    pub started_at: String,
    /// The organized directory.
    pub source_dir: PathBuf,
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Per-category outcomes, in the order categories were first observed.
    pub categories: Vec<CategoryReport>,
}

impl OrganizeReport {
    fn count(&self, status: RelocationStatus) -> usize {
        self.categories
            .iter()
            .flat_map(|c| c.outcomes.iter())
            .filter(|o| o.status == status)
            .count()
    }

    /// Number of files across all categories.
    pub fn total(&self) -> usize {
        self.categories.iter().map(|c| c.outcomes.len()).sum()
    }

    /// Number of files actually copied.
    pub fn copied(&self) -> usize {
        self.count(RelocationStatus::Copied)
    }

    /// Number of files whose relocation was only simulated.
    pub fn simulated(&self) -> usize {
        self.count(RelocationStatus::Simulated)
    }

    /// Number of files whose relocation failed.
    pub fn failed(&self) -> usize {
        self.count(RelocationStatus::Failed)
    }

    /// Number of files never dispatched due to cancellation.
    pub fn cancelled(&self) -> usize {
        self.count(RelocationStatus::Cancelled)
    }

    /// Renders a human-readable summary listing source paths per category.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for category in &self.categories {
            out.push_str(&format!("{}:\n", category.label));
            for outcome in &category.outcomes {
                let note = match outcome.status {
                    RelocationStatus::Copied => String::new(),
                    RelocationStatus::Simulated => " (simulated)".to_string(),
                    RelocationStatus::Cancelled => " (cancelled)".to_string(),
                    RelocationStatus::Failed => format!(
                        " (failed: {})",
                        outcome.error.as_deref().unwrap_or("unknown error")
                    ),
                };
                out.push_str(&format!("  - {}{}\n", outcome.source.display(), note));
            }
        }
        out
    }
}

/// Callback invoked after each file finishes, with (completed, total).
pub type ProgressFn = dyn Fn(u64, u64) + Send + Sync;

/// Scans a directory, groups files by category and relocates them
/// concurrently.
pub struct Organizer {
    classifier: Classifier,
    filters: Option<CompiledFilters>,
    workers: usize,
    progress: Option<Box<ProgressFn>>,
}

impl Organizer {
    /// Creates an organizer with the built-in classifier, no extra filters
    /// and rayon's default worker count.
    pub fn new() -> Self {
        Self {
            classifier: Classifier::default(),
            filters: None,
            workers: 0,
            progress: None,
        }
    }

    /// Replaces the classifier.
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Adds name-based exclusion filters on top of the built-in hidden-file
    /// skip.
    pub fn with_filters(mut self, filters: CompiledFilters) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Sets the worker pool size; `0` selects rayon's default.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Registers a progress callback invoked after each file completes.
    pub fn with_progress(mut self, progress: Box<ProgressFn>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Organizes the top-level files of the request's source directory.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsift::organizer::{CancellationToken, Organizer, OrganizeRequest};
    /// use dirsift::size::SizeUnit;
    /// use std::path::PathBuf;
    ///
    /// let request = OrganizeRequest {
    ///     source_dir: PathBuf::from("/home/user/Downloads"),
    ///     delete_originals: false,
    ///     dry_run: true,
    ///     min_size: 0.0,
    ///     max_size: 0.0,
    ///     size_unit: SizeUnit::Bytes,
    /// };
    /// let organizer = Organizer::new();
    /// let report = organizer.organize(&request, &CancellationToken::new())?;
    /// println!("{}", report.render());
    /// # Ok::<(), dirsift::organizer::OrganizeError>(())
    /// ```
    pub fn organize(
        &self,
        request: &OrganizeRequest,
        cancel: &CancellationToken,
    ) -> OrganizeResult<OrganizeReport> {
        let bounds = request.validate()?;
        let started_at = chrono::Utc::now().to_rfc3339();

        let buckets = self.scan(request, &bounds)?;
        info!(
            "Scan of {} found {} file(s) across {} categorie(s)",
            request.source_dir.display(),
            buckets.file_count(),
            buckets.iter().count()
        );

        self.ensure_category_dirs(request, &buckets);
        let outcomes = self.run_relocations(request, &buckets, cancel)?;

        // Relocations ran in scan order, so the flat outcome list can be
        // sliced back into per-category groups.
        let mut remaining = outcomes.into_iter();
        let categories = buckets
            .iter()
            .map(|(label, files)| CategoryReport {
                label: label.to_string(),
                outcomes: remaining.by_ref().take(files.len()).collect(),
            })
            .collect();

        Ok(OrganizeReport {
            started_at,
            source_dir: request.source_dir.clone(),
            dry_run: request.dry_run,
            categories,
        })
    }

    /// Lists, filters and classifies the top-level entries of the source
    /// directory. Subdirectories and hidden names are skipped; any listing
    /// error aborts the call.
    fn scan(&self, request: &OrganizeRequest, bounds: &SizeBounds) -> OrganizeResult<CategoryBuckets> {
        let scan_failed = |source: io::Error| OrganizeError::ScanFailed {
            path: request.source_dir.clone(),
            source,
        };

        let mut buckets = CategoryBuckets::default();
        for entry in fs::read_dir(&request.source_dir).map_err(scan_failed)? {
            let entry = entry.map_err(scan_failed)?;
            if !entry.file_type().map_err(scan_failed)?.is_file() {
                continue;
            }

            let base_name = entry.file_name().to_string_lossy().to_string();
            if base_name.starts_with('.') {
                continue;
            }
            if let Some(filters) = &self.filters
                && !filters.should_include(Path::new(&base_name))
            {
                continue;
            }

            let size_bytes = entry.metadata().map_err(scan_failed)?.len();
            if !bounds.includes(size_bytes) {
                continue;
            }

            let extension = extension_of(&base_name).unwrap_or_default();
            let category = self.classifier.classify(&extension);
            buckets.push(
                category,
                FileEntry {
                    path: entry.path(),
                    base_name,
                    extension,
                    size_bytes,
                },
            );
        }
        Ok(buckets)
    }

    /// Creates (or, in a dry run, logs the intent to create) one
    /// subdirectory per observed category.
    ///
    /// Creation failures are logged but not fatal here: each relocation
    /// re-ensures its directory and captures the failure per file.
    fn ensure_category_dirs(&self, request: &OrganizeRequest, buckets: &CategoryBuckets) {
        for (label, _) in buckets.iter() {
            let dir = request.source_dir.join(label);
            if dir.exists() {
                continue;
            }
            if request.dry_run {
                info!("Would create directory: {}", dir.display());
            } else if let Err(e) = fs::create_dir_all(&dir) {
                error!("Failed to create directory {}: {}", dir.display(), e);
            } else {
                info!("Created directory: {}", dir.display());
            }
        }
    }

    /// Dispatches one relocation per file across the bounded worker pool and
    /// collects the outcomes in scan order.
    fn run_relocations(
        &self,
        request: &OrganizeRequest,
        buckets: &CategoryBuckets,
        cancel: &CancellationToken,
    ) -> OrganizeResult<Vec<RelocationOutcome>> {
        let options = RelocateOptions {
            delete_originals: request.delete_originals,
            dry_run: request.dry_run,
        };

        let mut tasks: Vec<(&str, PathBuf, &FileEntry)> = Vec::with_capacity(buckets.file_count());
        for (label, files) in buckets.iter() {
            let dest_dir = request.source_dir.join(label);
            for entry in files {
                tasks.push((label, dest_dir.clone(), entry));
            }
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| OrganizeError::WorkerPool {
                reason: e.to_string(),
            })?;

        let total = tasks.len() as u64;
        let done = AtomicU64::new(0);
        let outcomes = pool.install(|| {
            tasks
                .par_iter()
                .map(|(label, dest_dir, entry)| {
                    let outcome = if cancel.is_cancelled() {
                        RelocationOutcome::cancelled(entry, label)
                    } else {
                        RelocationExecutor::relocate(entry, label, dest_dir, &options)
                    };
                    let completed = done.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(progress) = &self.progress {
                        progress(completed, total);
                    }
                    outcome
                })
                .collect()
        });
        Ok(outcomes)
    }
}

impl Default for Organizer {
    fn default() -> Self {
        Self::new()
    }
}
