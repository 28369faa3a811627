//! Reference correlator: diffs what the documentation claims against what
//! the implementation contains.
//!
//! Every symbol-level difference becomes its own [`Conflict`]. The output is
//! unordered; the report builder deduplicates and sorts.

use crate::conflict::Conflict;
use crate::docs::DocumentationAnalysis;
use crate::model::{CodeFileAnalysis, DocumentedCodeSample};
use crate::rules::symbols;
use crate::validate::validator_for;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Import forms recognised in documented samples, whatever the language.
/// ES `import … from "x"` comes first so it wins over bare `import X`.
static RE_SAMPLE_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(concat!(
        r#"^[[:blank:]]*import[[:blank:]]+(?:type[[:blank:]]+)?(?:[\w*{}\s,]+[[:blank:]]+from[[:blank:]]+)?['"]([^'"]+)['"]"#,
        r"|^[[:blank:]]*from[[:blank:]]+([\w.]+)[[:blank:]]+import\b",
        r"|^[[:blank:]]*import[[:blank:]]+([\w.]+)",
        r#"|\brequire\(\s*['"]([^'"]+)['"]\s*\)"#,
    ))
    .multi_line(true)
    .build()
    .unwrap()
});

/// Fence tags whose imports are compared against the implementation.
const IMPORT_LANGUAGES: &[&str] = &[
    "python", "py", "python3", "javascript", "js", "jsx", "typescript", "ts", "tsx",
];

/// Produce every conflict between the documentation and the code files.
///
/// Versions starting with `legacy_prefix` are reported as outdated.
pub fn correlate(
    docs: &DocumentationAnalysis,
    code: &[CodeFileAnalysis],
    legacy_prefix: &str,
) -> Vec<Conflict> {
    let documented = docs.symbol_names();
    let implemented: BTreeSet<&str> = code
        .iter()
        .flat_map(|a| a.functions.iter().map(String::as_str))
        .collect();
    let implemented_imports: BTreeSet<&str> = code
        .iter()
        .flat_map(|a| a.imports.iter().map(String::as_str))
        .collect();

    let mut conflicts = Vec::new();

    // 1. Documented but not implemented
    for name in &documented {
        if !implemented.contains(name.as_str()) {
            conflicts.push(Conflict::missing_implementation(name));
        }
    }

    // 2. Implemented but not documented
    for name in &implemented {
        if !documented.contains(*name) {
            conflicts.push(Conflict::undocumented_function(name));
        }
    }

    // 3. Broken samples, one per distinct hash
    let mut checked = BTreeSet::new();
    for sample in &docs.code_samples {
        if !checked.insert(sample.hash.as_str()) {
            continue;
        }
        let Some(check) = validator_for(&sample.language) else {
            continue;
        };
        if let Err(issue) = check(&sample.code) {
            tracing::debug!(hash = %sample.hash, "documented sample fails to parse: {issue}");
            conflicts.push(Conflict::syntax_error(&issue.to_string(), &sample.hash));
        }
    }

    // 4. Imports shown in samples but absent from the implementation
    for module in sample_imports(&docs.code_samples) {
        if !implemented_imports.contains(module.as_str()) {
            conflicts.push(Conflict::missing_import(&module));
        }
    }

    // 5. Outdated versions
    for version in &docs.versions {
        if version.starts_with(legacy_prefix) {
            conflicts.push(Conflict::version_mismatch(version));
        }
    }

    // 6. Deprecated usage
    for analysis in code.iter().filter(|a| a.deprecated_usage) {
        conflicts.push(Conflict::deprecated_method(&analysis.file));
    }

    tracing::debug!(
        documented = documented.len(),
        implemented = implemented.len(),
        conflicts = conflicts.len(),
        "correlated"
    );
    conflicts
}

/// Module names imported by python, javascript and typescript samples.
pub fn sample_imports(samples: &[DocumentedCodeSample]) -> BTreeSet<String> {
    samples
        .iter()
        .filter(|s| IMPORT_LANGUAGES.contains(&s.language.as_str()))
        .flat_map(|s| symbols(&RE_SAMPLE_IMPORT, &s.code))
        .collect()
}
