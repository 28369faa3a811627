//! Conflict records and severity classification.

use serde::Serialize;
use std::fmt;

/// Kind of inconsistency between documentation and implementation.
///
/// Declaration order is the report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    MissingImplementation,
    SyntaxError,
    UndocumentedFunction,
    MissingImport,
    VersionMismatch,
    DeprecatedMethod,
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictKind::MissingImplementation => "missing_implementation",
            ConflictKind::SyntaxError => "syntax_error",
            ConflictKind::UndocumentedFunction => "undocumented_function",
            ConflictKind::MissingImport => "missing_import",
            ConflictKind::VersionMismatch => "version_mismatch",
            ConflictKind::DeprecatedMethod => "deprecated_method",
        }
    }

    /// Fixed severity of each kind.
    pub fn severity(&self) -> Severity {
        match self {
            ConflictKind::MissingImplementation | ConflictKind::SyntaxError => Severity::High,
            ConflictKind::UndocumentedFunction
            | ConflictKind::MissingImport
            | ConflictKind::VersionMismatch => Severity::Medium,
            ConflictKind::DeprecatedMethod => Severity::Low,
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected inconsistency. Built through the per-kind constructors and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Conflict {
    #[serde(rename = "type")]
    kind: ConflictKind,
    severity: Severity,
    message: String,
    suggestion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    anchor: Option<String>,
}

impl Conflict {
    fn new(kind: ConflictKind, message: String, suggestion: String, anchor: Option<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message,
            suggestion,
            anchor,
        }
    }

    pub fn missing_implementation(symbol: &str) -> Self {
        Self::new(
            ConflictKind::MissingImplementation,
            format!("Function '{symbol}' referenced in documentation but not found in implementation"),
            format!("Add implementation for {symbol} or remove from documentation"),
            None,
        )
    }

    pub fn undocumented_function(symbol: &str) -> Self {
        Self::new(
            ConflictKind::UndocumentedFunction,
            format!("Function '{symbol}' implemented but not documented"),
            format!("Add documentation for {symbol}"),
            None,
        )
    }

    /// `sample_hash` anchors the conflict to the offending code sample.
    pub fn syntax_error(detail: &str, sample_hash: &str) -> Self {
        Self::new(
            ConflictKind::SyntaxError,
            format!("Syntax error in documented code block: {detail}"),
            "Fix syntax error in code example".to_string(),
            Some(sample_hash.to_string()),
        )
    }

    pub fn missing_import(module: &str) -> Self {
        Self::new(
            ConflictKind::MissingImport,
            format!("Import '{module}' used in documentation but not found in implementation"),
            format!("Add import statement for {module}"),
            None,
        )
    }

    pub fn version_mismatch(version: &str) -> Self {
        Self::new(
            ConflictKind::VersionMismatch,
            format!("Documentation references old version {version}"),
            "Update documentation to current version".to_string(),
            None,
        )
    }

    /// `file` is the source file that uses deprecated APIs.
    pub fn deprecated_method(file: &str) -> Self {
        Self::new(
            ConflictKind::DeprecatedMethod,
            format!("File '{file}' uses deprecated methods or APIs"),
            format!("Replace deprecated usage in {file}"),
            Some(file.to_string()),
        )
    }

    pub fn kind(&self) -> ConflictKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn suggestion(&self) -> &str {
        &self.suggestion
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity.as_str().to_uppercase(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_by_kind() {
        assert_eq!(Conflict::missing_implementation("f").severity(), Severity::High);
        assert_eq!(Conflict::syntax_error("x", "h").severity(), Severity::High);
        assert_eq!(Conflict::undocumented_function("f").severity(), Severity::Medium);
        assert_eq!(Conflict::missing_import("os").severity(), Severity::Medium);
        assert_eq!(Conflict::version_mismatch("1.0").severity(), Severity::Medium);
        assert_eq!(Conflict::deprecated_method("a.py").severity(), Severity::Low);
    }

    #[test]
    fn message_names_symbol() {
        let c = Conflict::missing_implementation("parseConfig");
        assert!(c.message().contains("parseConfig"));
        assert!(c.suggestion().contains("parseConfig"));
        assert!(c.anchor().is_none());
    }

    #[test]
    fn serializes_type_and_optional_anchor() {
        let json = serde_json::to_value(Conflict::syntax_error("bad", "abc")).unwrap();
        assert_eq!(json["type"], "syntax_error");
        assert_eq!(json["severity"], "high");
        assert_eq!(json["anchor"], "abc");

        let json = serde_json::to_value(Conflict::undocumented_function("f")).unwrap();
        assert!(json.get("anchor").is_none());
    }

    #[test]
    fn display_shows_severity() {
        let c = Conflict::version_mismatch("1.2.0");
        assert_eq!(c.to_string(), "[MEDIUM] Documentation references old version 1.2.0");
    }
}
