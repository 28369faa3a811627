//! Code symbol extractor: one source file in, one [`CodeFileAnalysis`] out.

use crate::model::*;
use crate::rules::{language_for_path, RuleTable};
use crate::validate::validator_for;
use std::path::Path;

/// Extract imports, functions, classes, the deprecated-usage flag and the
/// syntax status of one file.
///
/// The language comes from the extension only. Files whose language has
/// no rule table keep just their size and line count.
pub fn extract(path: &Path, content: &str, rules: &RuleTable) -> CodeFileAnalysis {
    let file = path.to_string_lossy().replace('\\', "/");
    let language = language_for_path(path);

    let Some(table) = rules.get(language) else {
        tracing::debug!(file = %file, "no rule table, recording size only");
        return CodeFileAnalysis::unknown(&file, content);
    };

    let mut analysis = CodeFileAnalysis::unknown(&file, content);
    analysis.language = language.to_string();
    analysis.imports = table.imports(content).into_iter().collect();
    analysis.functions = table.functions(content).into_iter().collect();
    analysis.classes = table.classes(content).into_iter().collect();
    analysis.deprecated_usage = table.uses_deprecated(content);

    if let Some(check) = validator_for(language) {
        match check(content) {
            Ok(()) => analysis.syntax = SyntaxStatus::Valid,
            Err(issue) => {
                tracing::debug!(file = %file, "syntax error: {issue}");
                analysis.syntax = SyntaxStatus::Invalid;
                analysis.syntax_valid = false;
                analysis.errors.push(issue);
            }
        }
    }

    tracing::debug!(
        file = %file,
        language,
        functions = analysis.functions.len(),
        imports = analysis.imports.len(),
        "extracted"
    );
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(path: &str, content: &str) -> CodeFileAnalysis {
        extract(Path::new(path), content, &RuleTable::default())
    }

    #[test]
    fn python_file() {
        let a = run(
            "tools/config.py",
            "import json\n\nclass Store:\n    pass\n\ndef loadConfig(path):\n    return json.load(open(path))\n",
        );
        assert_eq!(a.file, "tools/config.py");
        assert_eq!(a.language, "python");
        assert!(a.functions.contains("loadConfig"));
        assert!(a.classes.contains("Store"));
        assert!(a.imports.contains("json"));
        assert_eq!(a.syntax, SyntaxStatus::Valid);
        assert!(a.syntax_valid);
        assert!(a.errors.is_empty());
    }

    #[test]
    fn python_syntax_error_recorded() {
        let a = run("bad.py", "def broken(:\n    pass\n");
        assert_eq!(a.syntax, SyntaxStatus::Invalid);
        assert!(!a.syntax_valid);
        assert_eq!(a.errors.len(), 1);
        assert_eq!(a.errors[0].line, 1);
    }

    #[test]
    fn unvalidated_language_is_unchecked() {
        let a = run("app.js", "function start() {}\n");
        assert_eq!(a.syntax, SyntaxStatus::Unchecked);
        assert!(a.syntax_valid);
        assert!(a.functions.contains("start"));
    }

    #[test]
    fn unknown_extension_skips_extraction() {
        let a = run("notes.txt", "def looks_like_python():\n    import os\n");
        assert_eq!(a.language, UNKNOWN_LANGUAGE);
        assert!(a.functions.is_empty());
        assert!(a.imports.is_empty());
        assert_eq!(a.size, 39);
        assert_eq!(a.lines, 3);
    }

    #[test]
    fn deprecated_flag() {
        let a = run("old.java", "public class Old {\n    @Deprecated\n    public void run() {\n    }\n}\n");
        assert!(a.deprecated_usage);
        assert!(a.functions.contains("run"));
        assert!(a.classes.contains("Old"));
    }

    #[test]
    fn duplicate_definitions_collapse() {
        let a = run("dup.py", "def f():\n    pass\n\ndef f():\n    pass\n");
        assert_eq!(a.functions.len(), 1);
    }
}
