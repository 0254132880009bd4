//! Extension-based file classification.
//!
//! This module maps a filename's extension to a destination category label via
//! an ordered list of rules evaluated first-match-wins. Classification is
//! purely string based; file contents are never inspected.
//!
//! # Examples
//!
//! ```
//! use dirsift::category::Classifier;
//!
//! let classifier = Classifier::default();
//! assert_eq!(classifier.classify("xlsx"), "Excel Files");
//! assert_eq!(classifier.classify("JPG"), "Images");
//! assert_eq!(classifier.classify("zip"), "zip");
//! ```

/// Category label used for files that carry no extension at all.
pub const NO_EXTENSION: &str = "no_extension";

/// The built-in rule table, in declaration order.
///
/// `mp4` is listed under both "Audio Files" and "Video Files"; because rules
/// are evaluated first-match-wins, `mp4` always resolves to "Audio Files".
/// The overlap is inherited from the original rule set and is kept here
/// deliberately rather than silently reordered.
const BUILTIN_RULES: &[(&str, &[&str])] = &[
    ("Excel Files", &["xls", "xlsx", "xlsm", "xlsb", "csv"]),
    ("Images", &["jpg", "jpeg", "png", "gif", "bmp", "tiff"]),
    ("Word Files", &["docm", "docx", "dot", "dotx"]),
    (
        "PDF Files",
        &["pdf", "pdf/e", "pdf/x", "pdf/vt", "pdf/ua", "pades", "pdf/h", "pdf/a"],
    ),
    ("Audio Files", &["mp4", "mp3", "flac", "wav", "wma", "aac"]),
    ("Video Files", &["mp4", "mov", "avi", "wmv", "avchd", "flv", "webm"]),
    ("Text Files", &["txt"]),
    ("Adobe Illustrator Files", &["ai"]),
    ("Adobe Photoshop Files", &["ps"]),
    ("PowerPoint Files", &["ppt", "pptx"]),
];

/// A single classification rule: a set of extensions mapped to one label.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    /// The destination category label (also the subdirectory name).
    pub label: String,
    /// Lowercase extensions, without leading dot, matched by this rule.
    pub extensions: Vec<String>,
}

/// Maps file extensions to category labels.
///
/// Rules are kept as an ordered list and evaluated in declared order; the
/// first rule containing the extension wins. Extensions that match no rule
/// keep their literal lowercase form as their own category.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<CategoryRule>,
}

impl Classifier {
    /// Creates a classifier with the built-in rule table.
    pub fn new() -> Self {
        let rules = BUILTIN_RULES
            .iter()
            .map(|(label, extensions)| CategoryRule {
                label: (*label).to_string(),
                extensions: extensions.iter().map(|e| (*e).to_string()).collect(),
            })
            .collect();
        Self { rules }
    }

    /// Appends a rule after all existing rules.
    ///
    /// Appended rules can therefore introduce new categories but never
    /// shadow a built-in extension.
    pub fn add_rule(&mut self, label: &str, extensions: &[String]) {
        self.rules.push(CategoryRule {
            label: label.to_string(),
            extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
        });
    }

    /// Returns the rules in evaluation order.
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Maps an extension to its category label.
    ///
    /// The lookup is case-insensitive. An empty extension yields
    /// [`NO_EXTENSION`]; an extension matching no rule yields its own
    /// lowercase form.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirsift::category::{Classifier, NO_EXTENSION};
    ///
    /// let classifier = Classifier::default();
    /// assert_eq!(classifier.classify("pdf"), "PDF Files");
    /// assert_eq!(classifier.classify(""), NO_EXTENSION);
    /// ```
    pub fn classify(&self, extension: &str) -> String {
        if extension.is_empty() {
            return NO_EXTENSION.to_string();
        }
        let lower = extension.to_lowercase();
        for rule in &self.rules {
            if rule.extensions.iter().any(|e| *e == lower) {
                return rule.label.clone();
            }
        }
        lower
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts the extension of a file name: the part after the last dot,
/// lowercased, without the dot. A name with no dot, or with a dot only in
/// first position (a dotfile), has no extension.
///
/// # Examples
///
/// ```
/// use dirsift::category::extension_of;
///
/// assert_eq!(extension_of("report.XLSX"), Some("xlsx".to_string()));
/// assert_eq!(extension_of("archive.tar.gz"), Some("gz".to_string()));
/// assert_eq!(extension_of("notes"), None);
/// assert_eq!(extension_of(".bashrc"), None);
/// ```
pub fn extension_of(file_name: &str) -> Option<String> {
    match file_name.rfind('.') {
        Some(0) | None => None,
        Some(idx) if idx + 1 == file_name.len() => None,
        Some(idx) => Some(file_name[idx + 1..].to_lowercase()),
    }
}
