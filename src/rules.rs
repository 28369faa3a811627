//! Per-language extraction rules.
//!
//! A [`RuleTable`] maps a language name to the regexes used to pull
//! imports, function names and class names out of a source file, plus the
//! patterns that flag deprecated usage. Supporting a new language means
//! registering a new entry; existing entries are never replaced.

use crate::model::UNKNOWN_LANGUAGE;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

/// File extension → language name. Lookup is case-insensitive.
const EXTENSIONS: &[(&str, &str)] = &[
    ("py", "python"),
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("java", "java"),
    ("rs", "rust"),
    ("sh", "bash"),
    ("bash", "bash"),
];

/// Resolve a language from the file extension alone.
pub fn language_for_path(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return UNKNOWN_LANGUAGE;
    };
    let ext = ext.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
        .unwrap_or(UNKNOWN_LANGUAGE)
}

/// Compiled extraction rules for one language.
#[derive(Debug, Clone)]
pub struct LanguageRules {
    imports: Regex,
    functions: Regex,
    classes: Regex,
    deprecated: Vec<Regex>,
}

impl LanguageRules {
    /// Compile a rule set. Symbol patterns run in multi-line mode,
    /// deprecated patterns are case-insensitive.
    pub fn new(
        imports: &str,
        functions: &str,
        classes: &str,
        deprecated: &[&str],
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            imports: multi_line(imports)?,
            functions: multi_line(functions)?,
            classes: multi_line(classes)?,
            deprecated: deprecated
                .iter()
                .map(|p| RegexBuilder::new(p).case_insensitive(true).build())
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn imports(&self, content: &str) -> Vec<String> {
        symbols(&self.imports, content)
    }

    pub fn functions(&self, content: &str) -> Vec<String> {
        symbols(&self.functions, content)
    }

    pub fn classes(&self, content: &str) -> Vec<String> {
        symbols(&self.classes, content)
    }

    /// True as soon as any deprecated pattern matches.
    pub fn uses_deprecated(&self, content: &str) -> bool {
        self.deprecated.iter().any(|re| re.is_match(content))
    }
}

fn multi_line(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).multi_line(true).build()
}

/// All symbol names matched by `re`.
///
/// With several capture groups the last group that captured something
/// non-empty is the name, so optional modifiers in front of it (visibility,
/// `async`, ...) are skipped. A pattern without groups yields the whole match.
pub fn symbols(re: &Regex, content: &str) -> Vec<String> {
    re.captures_iter(content)
        .filter_map(|caps| {
            if caps.len() == 1 {
                return Some(caps[0].trim().to_string());
            }
            (1..caps.len())
                .rev()
                .filter_map(|i| caps.get(i))
                .map(|m| m.as_str())
                .find(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect()
}

/// Language name → rules.
#[derive(Debug, Clone)]
pub struct RuleTable {
    entries: BTreeMap<String, LanguageRules>,
}

impl RuleTable {
    /// A table with no languages.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add rules for a language not yet in the table.
    ///
    /// Returns `false` and leaves the table untouched when the language is
    /// already registered.
    pub fn register(&mut self, language: &str, rules: LanguageRules) -> bool {
        if self.entries.contains_key(language) {
            return false;
        }
        self.entries.insert(language.to_string(), rules);
        true
    }

    pub fn get(&self, language: &str) -> Option<&LanguageRules> {
        self.entries.get(language)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

// -- Built-in rules -----------------------------------------------------------

static BUILTIN: LazyLock<RuleTable> = LazyLock::new(|| {
    let mut table = RuleTable::empty();
    for (language, rules) in [
        ("python", python()),
        ("javascript", javascript()),
        ("typescript", typescript()),
        ("java", java()),
        ("rust", rust()),
        ("bash", bash()),
    ] {
        table.register(language, rules.unwrap());
    }
    table
});

fn python() -> Result<LanguageRules, regex::Error> {
    LanguageRules::new(
        r"^[[:blank:]]*(?:import[[:blank:]]+([\w.]+)|from[[:blank:]]+([\w.]+)[[:blank:]]+import\b)",
        r"^(?:async[[:blank:]]+)?def[[:blank:]]+(\w+)[[:blank:]]*\(",
        r"^class[[:blank:]]+(\w+)",
        &[r"\.deprecated\(", r"@deprecated", r"#.*deprecated"],
    )
}

fn javascript() -> Result<LanguageRules, regex::Error> {
    LanguageRules::new(
        r#"^[[:blank:]]*import[[:blank:]]+(?:[\w*{}\s,]+[[:blank:]]+from[[:blank:]]+)?['"]([^'"]+)['"]|\brequire\(\s*['"]([^'"]+)['"]\s*\)"#,
        r"^(?:export[[:blank:]]+)?(?:async[[:blank:]]+)?function\*?[[:blank:]]+(\w+)|^(?:export[[:blank:]]+)?(?:const|let|var)[[:blank:]]+(\w+)[[:blank:]]*=[[:blank:]]*(?:async[[:blank:]]*)?(?:\(|function\b)",
        r"^(?:export[[:blank:]]+)?(?:default[[:blank:]]+)?class[[:blank:]]+(\w+)",
        &[r"\.deprecated", r"@deprecated", r"//.*deprecated"],
    )
}

fn typescript() -> Result<LanguageRules, regex::Error> {
    LanguageRules::new(
        r#"^[[:blank:]]*import[[:blank:]]+(?:type[[:blank:]]+)?(?:[\w*{}\s,]+[[:blank:]]+from[[:blank:]]+)?['"]([^'"]+)['"]|\brequire\(\s*['"]([^'"]+)['"]\s*\)"#,
        r"^(?:export[[:blank:]]+)?(?:async[[:blank:]]+)?function\*?[[:blank:]]+(\w+)|^(?:export[[:blank:]]+)?(?:const|let)[[:blank:]]+(\w+)[[:blank:]]*(?::[^=\n]+)?=[[:blank:]]*(?:async[[:blank:]]*)?\(",
        r"^(?:export[[:blank:]]+)?(?:default[[:blank:]]+)?(?:abstract[[:blank:]]+)?(?:class|interface)[[:blank:]]+(\w+)",
        &[r"@deprecated", r"//.*deprecated"],
    )
}

fn java() -> Result<LanguageRules, regex::Error> {
    LanguageRules::new(
        r"^[[:blank:]]*import[[:blank:]]+(?:static[[:blank:]]+)?([\w.*]+)[[:blank:]]*;",
        r"^[[:blank:]]*(?:(public|private|protected)[[:blank:]]+)?(?:(static)[[:blank:]]+)?(?:final[[:blank:]]+)?[\w<>\[\],.]+[[:blank:]]+(\w+)[[:blank:]]*\([^;\n]*$",
        r"^[[:blank:]]*(?:(public)[[:blank:]]+)?(?:abstract[[:blank:]]+|final[[:blank:]]+)*class[[:blank:]]+(\w+)",
        &[r"@Deprecated", r"//.*deprecated"],
    )
}

fn rust() -> Result<LanguageRules, regex::Error> {
    LanguageRules::new(
        r"^[[:blank:]]*(?:pub(?:\([^)]*\))?[[:blank:]]+)?use[[:blank:]]+([\w:]+)",
        r#"^[[:blank:]]*(?:pub(?:\([^)\n]*\))?[[:blank:]]+)?(?:const[[:blank:]]+)?(?:async[[:blank:]]+)?(?:unsafe[[:blank:]]+)?(?:extern[[:blank:]]+"[^"\n]*"[[:blank:]]+)?fn[[:blank:]]+(\w+)"#,
        r"^[[:blank:]]*(?:pub(?:\([^)]*\))?[[:blank:]]+)?(?:struct|enum|trait)[[:blank:]]+(\w+)",
        &[r"#\[deprecated", r"//.*deprecated"],
    )
}

fn bash() -> Result<LanguageRules, regex::Error> {
    LanguageRules::new(
        r"^[[:blank:]]*(?:source|\.|import)[[:blank:]]+([^[:space:];]+)",
        r"^[[:blank:]]*(?:function[[:blank:]]+)?([a-zA-Z_][a-zA-Z0-9_:.-]*)[[:blank:]]*\([[:blank:]]*\)",
        // bash has no classes
        r"\A\b\B",
        &[r"#.*deprecated"],
    )
}
