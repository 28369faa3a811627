//! Report builder: dedup, ordering, statistics, summary and recommendations.

use crate::conflict::{Conflict, ConflictKind, Severity};
use crate::docs::DocumentationAnalysis;
use crate::model::{BlockKind, CodeFileAnalysis, SyntaxStatus};
use crate::references::ReferenceFileAnalysis;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

pub const NO_CONFLICTS: &str = "No conflicts detected - skill is well-maintained";

/// Recommendation attached to each conflict kind, in output order.
const KIND_RECOMMENDATIONS: &[(ConflictKind, &str)] = &[
    (
        ConflictKind::MissingImplementation,
        "Implement missing functions or remove them from documentation",
    ),
    (ConflictKind::SyntaxError, "Fix syntax errors in code examples"),
    (ConflictKind::MissingImport, "Add missing import statements"),
    (ConflictKind::UndocumentedFunction, "Document all implemented functions"),
    (
        ConflictKind::VersionMismatch,
        "Update documentation to reference current versions",
    ),
    (ConflictKind::DeprecatedMethod, "Replace deprecated methods and APIs"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentationMetrics {
    pub code_blocks: usize,
    pub function_references: usize,
    pub api_references: usize,
    pub version_info: usize,
    pub sections: usize,
    pub lists: usize,
    pub tables: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CodeMetrics {
    pub files_analyzed: usize,
    pub total_functions: usize,
    pub total_classes: usize,
    pub total_imports: usize,
    pub files_with_deprecated_usage: usize,
    pub files_with_syntax_errors: usize,
    pub files_unchecked: usize,
    /// Files per detected language
    pub languages: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceMetrics {
    pub files_analyzed: usize,
    pub by_type: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total_conflicts: usize,
    /// Only kinds that occur
    pub conflicts_by_type: BTreeMap<String, usize>,
    /// Always holds high, medium and low
    pub conflicts_by_severity: BTreeMap<String, usize>,
    pub documentation_metrics: DocumentationMetrics,
    pub code_metrics: CodeMetrics,
    pub reference_metrics: ReferenceMetrics,
}

impl Statistics {
    pub fn compute(
        conflicts: &[Conflict],
        docs: &DocumentationAnalysis,
        code: &[CodeFileAnalysis],
        references: &[ReferenceFileAnalysis],
    ) -> Self {
        let mut conflicts_by_type = BTreeMap::new();
        let mut conflicts_by_severity: BTreeMap<String, usize> = Severity::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        for c in conflicts {
            *conflicts_by_type.entry(c.kind().as_str().to_string()).or_insert(0) += 1;
            *conflicts_by_severity
                .entry(c.severity().as_str().to_string())
                .or_insert(0) += 1;
        }

        let documentation_metrics = DocumentationMetrics {
            code_blocks: docs.code_samples.len(),
            function_references: docs.function_references.len(),
            api_references: docs.api_references.len(),
            version_info: docs.versions.len(),
            sections: docs.count_blocks(BlockKind::Section),
            lists: docs.count_blocks(BlockKind::List),
            tables: docs.count_blocks(BlockKind::Table),
        };

        let mut code_metrics = CodeMetrics {
            files_analyzed: code.len(),
            ..CodeMetrics::default()
        };
        for file in code {
            code_metrics.total_functions += file.functions.len();
            code_metrics.total_classes += file.classes.len();
            code_metrics.total_imports += file.imports.len();
            if file.deprecated_usage {
                code_metrics.files_with_deprecated_usage += 1;
            }
            match file.syntax {
                SyntaxStatus::Invalid => code_metrics.files_with_syntax_errors += 1,
                SyntaxStatus::Unchecked => code_metrics.files_unchecked += 1,
                SyntaxStatus::Valid => {}
            }
            *code_metrics.languages.entry(file.language.clone()).or_insert(0) += 1;
        }

        let mut reference_metrics = ReferenceMetrics {
            files_analyzed: references.len(),
            ..ReferenceMetrics::default()
        };
        for r in references {
            *reference_metrics
                .by_type
                .entry(r.kind.as_str().to_string())
                .or_insert(0) += 1;
        }

        Self {
            total_conflicts: conflicts.len(),
            conflicts_by_type,
            conflicts_by_severity,
            documentation_metrics,
            code_metrics,
            reference_metrics,
        }
    }

    fn by_severity(&self, severity: Severity) -> usize {
        self.conflicts_by_severity
            .get(severity.as_str())
            .copied()
            .unwrap_or(0)
    }

    fn by_type(&self, kind: ConflictKind) -> usize {
        self.conflicts_by_type.get(kind.as_str()).copied().unwrap_or(0)
    }

    /// `Found N conflicts. High severity: h. Medium severity: m. Low severity: l`
    pub fn summary(&self) -> String {
        format!(
            "Found {} conflicts. High severity: {}. Medium severity: {}. Low severity: {}",
            self.total_conflicts,
            self.by_severity(Severity::High),
            self.by_severity(Severity::Medium),
            self.by_severity(Severity::Low),
        )
    }

    /// Recommendations derived from the counts alone, in a fixed order.
    pub fn recommendations(&self) -> Vec<String> {
        if self.total_conflicts == 0 {
            return vec![NO_CONFLICTS.to_string()];
        }
        let mut out = Vec::new();
        if self.by_severity(Severity::High) > 0 {
            out.push(
                "Address high severity conflicts immediately as they may break functionality"
                    .to_string(),
            );
        }
        for (kind, text) in KIND_RECOMMENDATIONS {
            if self.by_type(*kind) > 0 {
                out.push(text.to_string());
            }
        }
        out
    }
}

/// Deduplicate on (type, message, anchor) and sort by the same key.
pub fn normalize_conflicts(mut conflicts: Vec<Conflict>) -> Vec<Conflict> {
    conflicts.sort_by(|a, b| {
        (a.kind(), a.message(), a.anchor()).cmp(&(b.kind(), b.message(), b.anchor()))
    });
    conflicts.dedup_by(|a, b| {
        a.kind() == b.kind() && a.message() == b.message() && a.anchor() == b.anchor()
    });
    conflicts
}

/// Everything known about one bundle after analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub skill_name: String,
    pub analysis_date: DateTime<Utc>,
    pub documentation: DocumentationAnalysis,
    pub code: Vec<CodeFileAnalysis>,
    pub references: Vec<ReferenceFileAnalysis>,
    pub conflicts: Vec<Conflict>,
    pub warnings: Vec<String>,
    pub statistics: Statistics,
}

impl AnalysisResult {
    /// Aggregate the sub-analyses. Conflicts are normalized and the
    /// statistics computed from the normalized list.
    pub fn new(
        skill_name: impl Into<String>,
        analysis_date: DateTime<Utc>,
        documentation: DocumentationAnalysis,
        code: Vec<CodeFileAnalysis>,
        references: Vec<ReferenceFileAnalysis>,
        conflicts: Vec<Conflict>,
        warnings: Vec<String>,
    ) -> Self {
        let conflicts = normalize_conflicts(conflicts);
        let statistics = Statistics::compute(&conflicts, &documentation, &code, &references);
        Self {
            skill_name: skill_name.into(),
            analysis_date,
            documentation,
            code,
            references,
            conflicts,
            warnings,
            statistics,
        }
    }

    pub fn report(&self) -> ConflictReport<'_> {
        ConflictReport {
            skill_name: &self.skill_name,
            analysis_date: self.analysis_date,
            summary: self.statistics.summary(),
            conflicts: &self.conflicts,
            warnings: &self.warnings,
            statistics: &self.statistics,
            recommendations: self.statistics.recommendations(),
        }
    }
}

/// The serialized report.
#[derive(Debug, Serialize)]
pub struct ConflictReport<'a> {
    pub skill_name: &'a str,
    pub analysis_date: DateTime<Utc>,
    pub summary: String,
    pub conflicts: &'a [Conflict],
    pub warnings: &'a [String],
    pub statistics: &'a Statistics,
    pub recommendations: Vec<String>,
}

impl ConflictReport<'_> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
