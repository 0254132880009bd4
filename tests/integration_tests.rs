//! Integration tests for dirsift
//!
//! These tests exercise the complete organize pipeline against real
//! temporary directories: scanning, size filtering, classification,
//! concurrent relocation, collision handling, dry-run behavior and per-file
//! failure isolation.

use dirsift::config::{FilterRules, OrganizeConfig};
use dirsift::organizer::{CancellationToken, OrganizeReport, OrganizeRequest, Organizer};
use dirsift::relocate::RelocationStatus;
use dirsift::size::SizeUnit;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A test fixture that sets up a temporary directory with a configurable
/// file structure.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a file with `size` bytes of content.
    fn create_file(&self, name: &str, size: usize) {
        fs::write(self.path().join(name), vec![b'x'; size]).expect("Failed to create file");
    }

    fn create_subdir(&self, name: &str) {
        fs::create_dir(self.path().join(name)).expect("Failed to create subdirectory");
    }

    /// Default request: no bounds, keep originals, real run.
    fn request(&self) -> OrganizeRequest {
        OrganizeRequest {
            source_dir: self.path().to_path_buf(),
            delete_originals: false,
            dry_run: false,
            min_size: 0.0,
            max_size: 0.0,
            size_unit: SizeUnit::Bytes,
        }
    }

    fn organize(&self, request: &OrganizeRequest) -> OrganizeReport {
        Organizer::new()
            .organize(request, &CancellationToken::new())
            .expect("organize should succeed")
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(
            path.exists() && path.is_file(),
            "File should exist: {}",
            path.display()
        );
    }

    fn assert_file_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "File should not exist: {}", path.display());
    }

    fn assert_dir_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(
            path.exists() && path.is_dir(),
            "Directory should exist: {}",
            path.display()
        );
    }

    fn assert_dir_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(
            !path.exists(),
            "Directory should not exist: {}",
            path.display()
        );
    }

    /// Count top-level entries of a kind.
    fn count_entries(&self, dirs: bool) -> usize {
        fs::read_dir(self.path())
            .expect("Failed to read directory")
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let is_dir = entry.metadata().ok()?.is_dir();
                (is_dir == dirs).then_some(())
            })
            .count()
    }
}

/// Collapses a report into a sorted category -> sorted source names map, for
/// structural comparison between runs.
fn report_structure(report: &OrganizeReport) -> BTreeMap<String, Vec<String>> {
    let mut structure = BTreeMap::new();
    for category in &report.categories {
        let mut names: Vec<String> = category
            .outcomes
            .iter()
            .map(|o| {
                o.source
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .to_string()
            })
            .collect();
        names.sort();
        structure.insert(category.label.clone(), names);
    }
    structure
}

// ============================================================================
// End-to-end organization
// ============================================================================

#[test]
fn test_end_to_end_with_size_filter() {
    let fixture = TestFixture::new();
    fixture.create_file("report.xlsx", 500);
    fixture.create_file("photo.jpg", 2000);
    fixture.create_file("notes", 100);

    let mut request = fixture.request();
    request.min_size = 200.0;

    let report = fixture.organize(&request);

    fixture.assert_dir_exists("Excel Files");
    fixture.assert_dir_exists("Images");
    fixture.assert_file_exists("Excel Files/report.xlsx");
    fixture.assert_file_exists("Images/photo.jpg");

    // Too small for the filter: untouched, and no bucket was created for it.
    fixture.assert_file_exists("notes");
    fixture.assert_dir_not_exists("no_extension");

    // Originals remain because delete_originals is off.
    fixture.assert_file_exists("report.xlsx");
    fixture.assert_file_exists("photo.jpg");

    assert_eq!(report.copied(), 2);
    assert_eq!(report.failed(), 0);
}

#[test]
fn test_delete_originals_removes_sources() {
    let fixture = TestFixture::new();
    fixture.create_file("song.mp3", 100);
    fixture.create_file("essay.txt", 100);

    let mut request = fixture.request();
    request.delete_originals = true;

    let report = fixture.organize(&request);

    assert_eq!(report.copied(), 2);
    fixture.assert_file_exists("Audio Files/song.mp3");
    fixture.assert_file_exists("Text Files/essay.txt");
    fixture.assert_file_not_exists("song.mp3");
    fixture.assert_file_not_exists("essay.txt");
}

#[test]
fn test_unknown_extension_gets_literal_category() {
    let fixture = TestFixture::new();
    fixture.create_file("bundle.ZIP", 10);

    let report = fixture.organize(&fixture.request());

    assert_eq!(report.copied(), 1);
    fixture.assert_file_exists("zip/bundle.ZIP");
}

#[test]
fn test_file_without_extension_goes_to_no_extension() {
    let fixture = TestFixture::new();
    fixture.create_file("README", 10);

    fixture.organize(&fixture.request());

    fixture.assert_file_exists("no_extension/README");
}

#[test]
fn test_mp4_is_routed_to_audio_files() {
    // mp4 is declared under both the audio and video rules; first-match
    // keeps the original declaration order, so it lands in Audio Files.
    let fixture = TestFixture::new();
    fixture.create_file("clip.mp4", 10);

    fixture.organize(&fixture.request());

    fixture.assert_file_exists("Audio Files/clip.mp4");
    fixture.assert_dir_not_exists("Video Files");
}

#[test]
fn test_hidden_files_and_subdirectories_are_skipped() {
    let fixture = TestFixture::new();
    fixture.create_file(".hidden.txt", 10);
    fixture.create_subdir("existing_dir");
    fixture.create_file("visible.txt", 10);

    let report = fixture.organize(&fixture.request());

    assert_eq!(report.total(), 1);
    fixture.assert_file_exists(".hidden.txt");
    fixture.assert_dir_exists("existing_dir");
    fixture.assert_file_exists("Text Files/visible.txt");
}

#[test]
fn test_collision_gets_numbered_name() {
    let fixture = TestFixture::new();
    fixture.create_subdir("Text Files");
    fixture.create_file("Text Files/essay.txt", 5);
    fixture.create_file("essay.txt", 10);

    let report = fixture.organize(&fixture.request());

    assert_eq!(report.copied(), 1);
    fixture.assert_file_exists("Text Files/essay.txt");
    fixture.assert_file_exists("Text Files/essay(1).txt");
    assert_eq!(
        fs::metadata(fixture.path().join("Text Files/essay(1).txt"))
            .unwrap()
            .len(),
        10
    );
}

#[test]
fn test_max_size_bound_is_inclusive() {
    let fixture = TestFixture::new();
    fixture.create_file("small.txt", 100);
    fixture.create_file("exact.txt", 200);
    fixture.create_file("big.txt", 201);

    let mut request = fixture.request();
    request.max_size = 200.0;

    let report = fixture.organize(&request);

    assert_eq!(report.copied(), 2);
    fixture.assert_file_exists("Text Files/small.txt");
    fixture.assert_file_exists("Text Files/exact.txt");
    fixture.assert_file_exists("big.txt");
    fixture.assert_file_not_exists("Text Files/big.txt");
}

#[test]
fn test_size_bounds_in_kilobytes() {
    let fixture = TestFixture::new();
    fixture.create_file("tiny.txt", 512);
    fixture.create_file("large.txt", 2048);

    let mut request = fixture.request();
    request.min_size = 1.0;
    request.size_unit = SizeUnit::Kilobytes;

    let report = fixture.organize(&request);

    assert_eq!(report.copied(), 1);
    fixture.assert_file_exists("Text Files/large.txt");
    fixture.assert_file_exists("tiny.txt");
}

#[test]
fn test_many_files_all_relocated() {
    let fixture = TestFixture::new();
    for i in 0..40 {
        fixture.create_file(&format!("photo{}.jpg", i), 16);
        fixture.create_file(&format!("doc{}.txt", i), 16);
    }

    let mut request = fixture.request();
    request.delete_originals = true;
    let report = Organizer::new()
        .with_workers(4)
        .organize(&request, &CancellationToken::new())
        .expect("organize should succeed");

    assert_eq!(report.copied(), 80);
    assert_eq!(report.failed(), 0);
    for i in 0..40 {
        fixture.assert_file_exists(&format!("Images/photo{}.jpg", i));
        fixture.assert_file_exists(&format!("Text Files/doc{}.txt", i));
    }
}

#[test]
fn test_repeated_runs_never_overwrite() {
    // Ten files in a row all want the same destination name; name
    // reservation must give each a distinct one.
    let fixture = TestFixture::new();
    let mut request = fixture.request();
    request.delete_originals = true;

    for round in 0..10 {
        fixture.create_file("same.jpg", round + 1);
        fixture.organize(&request);
    }

    let images: Vec<PathBuf> = fs::read_dir(fixture.path().join("Images"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(images.len(), 10);
}

// ============================================================================
// Dry-run mode
// ============================================================================

#[test]
fn test_dry_run_leaves_filesystem_unchanged() {
    let fixture = TestFixture::new();
    fixture.create_file("report.xlsx", 500);
    fixture.create_file("photo.jpg", 2000);

    let files_before = fixture.count_entries(false);
    let dirs_before = fixture.count_entries(true);

    let mut request = fixture.request();
    request.dry_run = true;
    request.delete_originals = true;
    let report = fixture.organize(&request);

    assert_eq!(report.simulated(), 2);
    assert_eq!(report.copied(), 0);
    assert_eq!(fixture.count_entries(false), files_before);
    assert_eq!(fixture.count_entries(true), dirs_before);
    fixture.assert_dir_not_exists("Excel Files");
    fixture.assert_dir_not_exists("Images");
}

#[test]
fn test_dry_run_report_matches_real_run_structure() {
    let fixture = TestFixture::new();
    fixture.create_file("report.xlsx", 500);
    fixture.create_file("photo.jpg", 2000);
    fixture.create_file("song.mp3", 300);

    let mut dry_request = fixture.request();
    dry_request.dry_run = true;
    let dry_report = fixture.organize(&dry_request);

    let real_report = fixture.organize(&fixture.request());

    assert_eq!(report_structure(&dry_report), report_structure(&real_report));
    assert_eq!(dry_report.simulated(), 3);
    assert_eq!(real_report.copied(), 3);
}

// ============================================================================
// Failure isolation and fatal errors
// ============================================================================

#[test]
fn test_one_failing_file_does_not_abort_siblings() {
    let fixture = TestFixture::new();
    fixture.create_file("a.jpg", 10);
    fixture.create_file("b.txt", 10);
    fixture.create_file("c.csv", 10);
    // "Text Files" already exists as a regular file, so relocating b.txt
    // cannot create its category directory. The blocker is below the size
    // filter so it is not itself scanned.
    fixture.create_file("Text Files", 1);

    let mut request = fixture.request();
    request.min_size = 5.0;
    let report = fixture.organize(&request);

    assert_eq!(report.copied(), 2);
    assert_eq!(report.failed(), 1);
    fixture.assert_file_exists("Images/a.jpg");
    fixture.assert_file_exists("Excel Files/c.csv");
    fixture.assert_file_exists("b.txt");

    let failed: Vec<_> = report
        .categories
        .iter()
        .flat_map(|c| c.outcomes.iter())
        .filter(|o| o.status == RelocationStatus::Failed)
        .collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].source.ends_with("b.txt"));
    assert!(failed[0].error.is_some());
}

#[test]
fn test_missing_source_directory_is_fatal() {
    let request = OrganizeRequest {
        source_dir: PathBuf::from("/nonexistent/dirsift/test/dir"),
        delete_originals: false,
        dry_run: false,
        min_size: 0.0,
        max_size: 0.0,
        size_unit: SizeUnit::Bytes,
    };
    let result = Organizer::new().organize(&request, &CancellationToken::new());
    assert!(result.is_err());
}

#[test]
fn test_invalid_bounds_rejected_before_scanning() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", 10);

    let mut request = fixture.request();
    request.min_size = 10.0;
    request.max_size = 1.0;

    let result = Organizer::new().organize(&request, &CancellationToken::new());
    assert!(result.is_err());
    // Nothing was moved.
    fixture.assert_file_exists("a.txt");
    fixture.assert_dir_not_exists("Text Files");
}

// ============================================================================
// Configuration-driven behavior
// ============================================================================

#[test]
fn test_config_filters_exclude_files() {
    let fixture = TestFixture::new();
    fixture.create_file("keep.txt", 10);
    fixture.create_file("Thumbs.db", 10);
    fixture.create_file("junk.tmp", 10);

    let config = OrganizeConfig {
        filters: FilterRules {
            exclude_filenames: vec!["Thumbs.db".to_string()],
            exclude_extensions: vec!["tmp".to_string()],
            ..Default::default()
        },
        ..Default::default()
    };
    let filters = config.compile_filters().unwrap();

    let report = Organizer::new()
        .with_filters(filters)
        .organize(&fixture.request(), &CancellationToken::new())
        .expect("organize should succeed");

    assert_eq!(report.total(), 1);
    fixture.assert_file_exists("Text Files/keep.txt");
    fixture.assert_file_exists("Thumbs.db");
    fixture.assert_file_exists("junk.tmp");
}

#[test]
fn test_custom_category_rule_from_config() {
    let fixture = TestFixture::new();
    fixture.create_file("bundle.zip", 10);

    let toml_src = r#"
        [[categories]]
        label = "Archives"
        extensions = ["zip", "rar"]
    "#;
    let config: OrganizeConfig = toml::from_str(toml_src).unwrap();

    let mut classifier = dirsift::Classifier::default();
    for rule in &config.categories {
        classifier.add_rule(&rule.label, &rule.extensions);
    }

    Organizer::new()
        .with_classifier(classifier)
        .organize(&fixture.request(), &CancellationToken::new())
        .expect("organize should succeed");

    fixture.assert_file_exists("Archives/bundle.zip");
}

// ============================================================================
// Report contents
// ============================================================================

#[test]
fn test_report_render_lists_sources_per_category() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", 10);
    fixture.create_file("b.txt", 10);

    let report = fixture.organize(&fixture.request());
    let rendered = report.render();

    assert!(rendered.contains("Text Files:"));
    assert!(rendered.contains("a.txt"));
    assert!(rendered.contains("b.txt"));
}

#[test]
fn test_report_serializes_to_json() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", 10);

    let report = fixture.organize(&fixture.request());
    let json = serde_json::to_string(&report).expect("report should serialize");

    assert!(json.contains("\"Text Files\""));
    assert!(json.contains("\"Copied\""));
}
