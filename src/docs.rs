//! Documentation analysis: what the prose claims.
//!
//! Runs the segmenter and pulls out the facts the correlator needs:
//! fenced code samples, function references, `object.method` API tokens
//! and version strings. Frontmatter and the document title are recorded
//! for the report.

use crate::model::*;
use crate::segment::{segment, SegmentMode};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static RE_BACKTICK_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`(\w+)\([^)`]*\)`").unwrap());

static RE_BARE_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\(\s*\)").unwrap());

static RE_API_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Za-z_]\w*\.[A-Za-z_]\w*)\b").unwrap());

static RE_VERSIONS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        r"\bversion\s+v?(\d+\.\d+(?:\.\d+)?)",
        r"\bv(\d+\.\d+(?:\.\d+)?)",
        r"\brequires\s+(\d+\.\d+(?:\.\d+)?)",
    ]
    .map(|p| RegexBuilder::new(p).case_insensitive(true).build().unwrap())
});

static RE_MD_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[[:blank:]]+(.+)$").unwrap());

static RE_LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.?\s*").unwrap());

/// Everything extracted from one documentation text.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentationAnalysis {
    pub title: String,
    pub metadata: BTreeMap<String, String>,
    pub blocks: Vec<TextBlock>,
    pub code_samples: Vec<DocumentedCodeSample>,
    /// One entry per distinct name, sorted by name
    pub function_references: Vec<SymbolReference>,
    pub api_references: BTreeSet<String>,
    /// Distinct version strings in document order
    pub versions: Vec<String>,
}

impl DocumentationAnalysis {
    /// The documented symbol universe.
    pub fn symbol_names(&self) -> BTreeSet<String> {
        self.function_references
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }

    pub fn count_blocks(&self, kind: BlockKind) -> usize {
        self.blocks.iter().filter(|b| b.kind == kind).count()
    }
}

/// Analyze documentation text.
pub fn analyze_documentation(input: &str, mode: SegmentMode) -> DocumentationAnalysis {
    let (metadata, body) = split_frontmatter(input);
    let blocks = segment(&body, mode);

    let code_samples = blocks
        .iter()
        .filter(|b| b.kind == BlockKind::Code)
        .map(|b| {
            let language = b.language.as_deref().unwrap_or(UNKNOWN_LANGUAGE);
            DocumentedCodeSample::from_raw(language, &b.text())
        })
        .collect();

    let title = extract_title(&metadata, &body, mode);

    DocumentationAnalysis {
        title,
        metadata,
        blocks,
        code_samples,
        function_references: function_references(&body),
        api_references: RE_API_REF
            .captures_iter(&body)
            .map(|caps| caps[1].to_string())
            .collect(),
        versions: versions(&body),
    }
}

/// Function names mentioned as `` `name()` ``, `` `name(args)` `` or `name()`.
///
/// Names are case-sensitive; a name seen in backticks anywhere is recorded
/// as backticked.
pub fn function_references(text: &str) -> Vec<SymbolReference> {
    let mut seen: BTreeMap<String, ReferenceForm> = BTreeMap::new();
    for caps in RE_BACKTICK_CALL.captures_iter(text) {
        seen.insert(caps[1].to_string(), ReferenceForm::Backticked);
    }
    for caps in RE_BARE_CALL.captures_iter(text) {
        seen.entry(caps[1].to_string()).or_insert(ReferenceForm::Call);
    }
    seen.into_iter()
        .map(|(name, form)| SymbolReference { name, form })
        .collect()
}

/// Version strings (`version X.Y[.Z]`, `vX.Y[.Z]`, `requires X.Y[.Z]`),
/// deduplicated, in order of first appearance.
pub fn versions(text: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = RE_VERSIONS
        .iter()
        .flat_map(|re| {
            re.captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(|m| (m.start(), m.as_str().to_string()))
        })
        .collect();
    found.sort();

    let mut seen = BTreeSet::new();
    found
        .into_iter()
        .filter(|(_, v)| seen.insert(v.clone()))
        .map(|(_, v)| v)
        .collect()
}

/// Split a leading `---` frontmatter block of `key: value` lines.
///
/// The returned body keeps frontmatter lines as blanks so block line
/// numbers still match the input.
fn split_frontmatter(input: &str) -> (BTreeMap<String, String>, String) {
    let mut metadata = BTreeMap::new();
    let lines: Vec<&str> = input.lines().collect();
    if lines.first().map(|l| l.trim()) != Some("---") {
        return (metadata, input.to_string());
    }
    let Some(end) = lines.iter().skip(1).position(|l| l.trim() == "---") else {
        return (metadata, input.to_string());
    };
    let end = end + 1;

    for line in &lines[1..end] {
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            metadata.insert(key.trim().to_string(), value.to_string());
        }
    }

    let mut body = "\n".repeat(end + 1);
    body.push_str(&lines[end + 1..].join("\n"));
    (metadata, body)
}

fn extract_title(metadata: &BTreeMap<String, String>, body: &str, mode: SegmentMode) -> String {
    if let Some(title) = metadata.get("title").or_else(|| metadata.get("name")) {
        if !title.is_empty() {
            return title.clone();
        }
    }

    let non_empty: Vec<&str> = body
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    match mode {
        SegmentMode::Markdown => {
            if let Some(caps) = RE_MD_TITLE.captures(body) {
                return caps[1].trim().to_string();
            }
        }
        SegmentMode::Plain => {
            let candidate = non_empty.iter().take(5).find(|line| {
                let len = line.chars().count();
                let lower = line.to_lowercase();
                len > 10
                    && len < 100
                    && !["chapter", "section", "page"]
                        .iter()
                        .any(|p| lower.starts_with(p))
                    && !RE_LEADING_NUMBER.is_match(line)
                    && line.chars().next().is_some_and(char::is_uppercase)
            });
            if let Some(line) = candidate {
                return line.to_string();
            }
        }
    }

    non_empty
        .first()
        .map(|l| l.to_string())
        .unwrap_or_else(|| "Untitled".to_string())
}
