//! The analysis pipeline: documentation and code are analyzed
//! independently, then correlated and aggregated into one result.

use crate::bundle::Bundle;
use crate::correlate::correlate;
use crate::docs::analyze_documentation;
use crate::extract::extract;
use crate::references::analyze_reference;
use crate::report::AnalysisResult;
use crate::rules::RuleTable;
use crate::segment::SegmentMode;
use chrono::{DateTime, Utc};
use std::path::Path;

/// How the documentation text should be segmented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModeSelection {
    /// Plain text for `.txt` documentation, markdown otherwise
    #[default]
    Auto,
    Fixed(SegmentMode),
}

impl ModeSelection {
    pub fn resolve(&self, doc_file: &str) -> SegmentMode {
        match self {
            ModeSelection::Fixed(mode) => *mode,
            ModeSelection::Auto => {
                let is_text = Path::new(doc_file)
                    .extension()
                    .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
                if is_text {
                    SegmentMode::Plain
                } else {
                    SegmentMode::Markdown
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    pub mode: ModeSelection,
    /// Versions starting with this prefix are reported as outdated
    pub legacy_version_prefix: String,
    pub rules: RuleTable,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            mode: ModeSelection::Auto,
            legacy_version_prefix: "1.".to_string(),
            rules: RuleTable::default(),
        }
    }
}

/// Analyze a loaded bundle. The result depends only on the bundle, the
/// options and `now`.
pub fn analyze(bundle: &Bundle, options: &AnalyzerOptions, now: DateTime<Utc>) -> AnalysisResult {
    let mode = options.mode.resolve(&bundle.doc_file);
    tracing::debug!(bundle = %bundle.name, ?mode, "analyzing documentation");
    let documentation = analyze_documentation(&bundle.documentation, mode);

    let code: Vec<_> = bundle
        .sources
        .iter()
        .map(|s| extract(&s.path, &s.content, &options.rules))
        .collect();

    let references: Vec<_> = bundle
        .references
        .iter()
        .map(|r| analyze_reference(&r.path.to_string_lossy().replace('\\', "/"), &r.content))
        .collect();

    let conflicts = correlate(&documentation, &code, &options.legacy_version_prefix);

    let result = AnalysisResult::new(
        bundle.name.clone(),
        now,
        documentation,
        code,
        references,
        conflicts,
        bundle.warnings.clone(),
    );
    tracing::info!(
        bundle = %result.skill_name,
        conflicts = result.statistics.total_conflicts,
        "analysis complete"
    );
    result
}
