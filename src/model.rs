//! Data model shared by the segmenter, the extractor and the correlator.

use crate::hash::content_hash;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Language name used when a fence has no tag or a file extension is unmapped.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Kind of a segmented documentation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Section,
    Code,
    List,
    Table,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Section => "section",
            BlockKind::Code => "code",
            BlockKind::List => "list",
            BlockKind::Table => "table",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker style of a list block, taken from its first item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStyle {
    Bullet,
    Numbered,
    Lettered,
    Parenthesized,
}

/// One segmented unit of documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextBlock {
    pub kind: BlockKind,
    /// Section heading text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Code fence language tag ("unknown" when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_style: Option<ListStyle>,
    /// 1-based line where the block starts
    pub line: usize,
    /// Body lines: section prose, fence interior, list items or table rows
    pub lines: Vec<String>,
    pub hash: String,
}

impl TextBlock {
    pub fn new(
        kind: BlockKind,
        label: Option<String>,
        list_style: Option<ListStyle>,
        line: usize,
        lines: Vec<String>,
    ) -> Self {
        let (title, language) = match kind {
            BlockKind::Code => (None, label),
            _ => (label, None),
        };
        let key = title.as_deref().or(language.as_deref()).unwrap_or("");
        let hash = content_hash(&format!("{}\0{}\0{}", kind, key, lines.join("\n")));
        Self {
            kind,
            title,
            language,
            list_style,
            line,
            lines,
            hash,
        }
    }

    /// Interior text of the block, lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// A fenced code excerpt found in the documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentedCodeSample {
    pub language: String,
    /// Trimmed sample text
    pub code: String,
    pub line_count: usize,
    /// Hash of the untrimmed interior text
    pub hash: String,
}

impl DocumentedCodeSample {
    pub fn from_raw(language: &str, raw: &str) -> Self {
        Self {
            language: language.to_string(),
            code: raw.trim().to_string(),
            line_count: raw.split('\n').count(),
            hash: content_hash(raw),
        }
    }
}

/// How a symbol was mentioned in prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceForm {
    /// `` `name()` `` or `` `name(args)` ``
    Backticked,
    /// bare `name()`
    Call,
}

/// A function or API name mentioned in the documentation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SymbolReference {
    pub name: String,
    pub form: ReferenceForm,
}

/// Outcome of syntax validation for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxStatus {
    Valid,
    Invalid,
    /// No validator exists for the language.
    Unchecked,
}

/// A syntax problem found by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxIssue {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
    /// 1-based line number
    pub line: usize,
}

impl SyntaxIssue {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            kind: "syntax_error",
            message: message.into(),
            line,
        }
    }
}

impl fmt::Display for SyntaxIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {})", self.message, self.line)
    }
}

/// Facts extracted from one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeFileAnalysis {
    /// Path relative to the scripts directory
    pub file: String,
    pub language: String,
    pub size: usize,
    pub lines: usize,
    pub imports: BTreeSet<String>,
    pub functions: BTreeSet<String>,
    pub classes: BTreeSet<String>,
    pub deprecated_usage: bool,
    pub syntax: SyntaxStatus,
    pub syntax_valid: bool,
    pub errors: Vec<SyntaxIssue>,
}

impl CodeFileAnalysis {
    /// Size-only record for files without a rule table.
    pub fn unknown(file: &str, content: &str) -> Self {
        Self {
            file: file.to_string(),
            language: UNKNOWN_LANGUAGE.to_string(),
            size: content.len(),
            lines: content.split('\n').count(),
            imports: BTreeSet::new(),
            functions: BTreeSet::new(),
            classes: BTreeSet::new(),
            deprecated_usage: false,
            syntax: SyntaxStatus::Unchecked,
            syntax_valid: true,
            errors: Vec::new(),
        }
    }
}
