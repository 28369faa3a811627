//! Bundle model and the directory loader.
//!
//! A bundle is one documentation file plus a tree of source files and a
//! tree of reference files. Loading is the only I/O the engine needs;
//! everything downstream works on the in-memory [`Bundle`].

use crate::error::AnalysisError;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the parts of a bundle live, relative to its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLayout {
    pub doc_file: String,
    pub scripts_dir: String,
    pub references_dir: String,
}

impl Default for BundleLayout {
    fn default() -> Self {
        Self {
            doc_file: "SKILL.md".to_string(),
            scripts_dir: "scripts".to_string(),
            references_dir: "references".to_string(),
        }
    }
}

/// A source file, path relative to the scripts directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

/// A reference file, path relative to the references directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFile {
    pub path: PathBuf,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    pub name: String,
    /// Name of the documentation file, used to pick a segmenting mode
    pub doc_file: String,
    /// Documentation text; empty when the file is absent or unreadable
    pub documentation: String,
    pub sources: Vec<SourceFile>,
    pub references: Vec<ReferenceFile>,
    /// Non-fatal load problems, e.g. `skipping scripts/x.py: <cause>`
    pub warnings: Vec<String>,
}

impl Bundle {
    /// In-memory bundle with markdown documentation and no files.
    pub fn new(name: impl Into<String>, documentation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc_file: BundleLayout::default().doc_file,
            documentation: documentation.into(),
            ..Self::default()
        }
    }

    /// Load a bundle directory.
    ///
    /// Only a missing or unlistable root is an error. Files that cannot be
    /// read are skipped with a warning.
    pub fn load(root: &Path, layout: &BundleLayout) -> Result<Self, AnalysisError> {
        if !root.exists() {
            return Err(AnalysisError::BundleNotFound(root.to_path_buf()));
        }
        fs::read_dir(root).map_err(|source| AnalysisError::BundleUnreadable {
            path: root.to_path_buf(),
            source,
        })?;

        let mut bundle = Bundle {
            name: bundle_name(root),
            doc_file: layout.doc_file.clone(),
            ..Bundle::default()
        };

        let doc_path = root.join(&layout.doc_file);
        if doc_path.is_file() {
            match fs::read_to_string(&doc_path) {
                Ok(text) => bundle.documentation = text,
                Err(e) => bundle.warn(root, &doc_path, &e),
            }
        } else {
            tracing::info!(path = %doc_path.display(), "no documentation file");
        }

        let scripts = root.join(&layout.scripts_dir);
        for path in bundle.discover(root, &scripts) {
            match fs::read_to_string(&path) {
                Ok(content) => bundle.sources.push(SourceFile {
                    path: relative(&scripts, &path),
                    content,
                }),
                Err(e) => bundle.warn(root, &path, &e),
            }
        }

        let references = root.join(&layout.references_dir);
        for path in bundle.discover(root, &references) {
            match fs::read(&path) {
                Ok(bytes) => bundle.references.push(ReferenceFile {
                    path: relative(&references, &path),
                    content: String::from_utf8_lossy(&bytes).into_owned(),
                }),
                Err(e) => bundle.warn(root, &path, &e),
            }
        }

        tracing::info!(
            bundle = %bundle.name,
            sources = bundle.sources.len(),
            references = bundle.references.len(),
            warnings = bundle.warnings.len(),
            "bundle loaded"
        );
        Ok(bundle)
    }

    /// Every non-hidden file below `dir`, sorted. A missing `dir` yields
    /// nothing.
    fn discover(&mut self, root: &Path, dir: &Path) -> Vec<PathBuf> {
        if !dir.is_dir() {
            return Vec::new();
        }
        let pattern = format!("{}/**/*", glob::Pattern::escape(&dir.to_string_lossy()));
        let paths = match glob::glob(&pattern) {
            Ok(paths) => paths,
            Err(e) => {
                self.warn(root, dir, &e);
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) => {
                    let hidden = path
                        .file_name()
                        .is_some_and(|n| n.to_string_lossy().starts_with('.'));
                    if path.is_file() && !hidden {
                        files.push(path);
                    }
                }
                Err(e) => {
                    let path = e.path().to_path_buf();
                    self.warn(root, &path, e.error());
                }
            }
        }
        // Sort for deterministic output
        files.sort();
        files
    }

    fn warn(&mut self, root: &Path, path: &Path, cause: &dyn std::fmt::Display) {
        let shown = path.strip_prefix(root).unwrap_or(path);
        tracing::warn!("skipping {}: {}", shown.display(), cause);
        self.warnings
            .push(format!("skipping {}: {}", shown.display(), cause));
    }
}

fn relative(base: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(base).unwrap_or(path).to_path_buf()
}

fn bundle_name(root: &Path) -> String {
    root.file_name()
        .map(PathBuf::from)
        .or_else(|| {
            root.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(PathBuf::from))
        })
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}
