//! Reference-file classification by keyword sniffing.
//!
//! Reference material is not structurally analyzed; each file only gets a
//! coarse kind for the report statistics.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    ApiReference,
    Schema,
    Guide,
    Documentation,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::ApiReference => "api_reference",
            ReferenceKind::Schema => "schema",
            ReferenceKind::Guide => "guide",
            ReferenceKind::Documentation => "documentation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceFileAnalysis {
    pub file: String,
    #[serde(rename = "type")]
    pub kind: ReferenceKind,
    pub size: usize,
}

/// Keyword groups, checked in order; the first group with a hit wins.
const KEYWORDS: &[(ReferenceKind, &[&str])] = &[
    (ReferenceKind::ApiReference, &["api", "endpoint"]),
    (ReferenceKind::Schema, &["schema", "model"]),
    (ReferenceKind::Guide, &["guide", "tutorial"]),
];

pub fn classify(content: &str) -> ReferenceKind {
    let lower = content.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(kind, _)| *kind)
        .unwrap_or(ReferenceKind::Documentation)
}

pub fn analyze_reference(file: &str, content: &str) -> ReferenceFileAnalysis {
    ReferenceFileAnalysis {
        file: file.to_string(),
        kind: classify(content),
        size: content.len(),
    }
}
