//! Syntax validators, looked up by language.
//!
//! Only languages with a parser linked into this binary can be checked:
//! Python through tree-sitter and JSON through serde_json. Every other
//! language has no validator, which is a normal outcome and not an error.

use crate::model::SyntaxIssue;
use tree_sitter::{Node, Parser};

/// Checks a source text, returning the first syntax problem found.
pub type Validator = fn(&str) -> Result<(), SyntaxIssue>;

/// Validator capability for a language name (fence tag or rule-table key).
pub fn validator_for(language: &str) -> Option<Validator> {
    match language.to_ascii_lowercase().as_str() {
        "python" | "py" | "python3" => Some(validate_python),
        "json" => Some(validate_json),
        _ => None,
    }
}

fn validate_python(source: &str) -> Result<(), SyntaxIssue> {
    // Indentation is checked while tokenizing, before any parsing
    check_indentation(source)?;

    let mut issues = Vec::new();

    let mut parser = Parser::new();
    match parser.set_language(&tree_sitter_python::language()) {
        Ok(()) => {
            if let Some(tree) = parser.parse(source, None) {
                let root = tree.root_node();
                if root.has_error() {
                    issues.push(match first_error(root) {
                        Some(node) => describe(node, source),
                        None => SyntaxIssue::new("invalid syntax", 1),
                    });
                }
                issues.extend(misplaced_statement(root));
            }
        }
        Err(e) => tracing::warn!("python grammar unavailable, checking indentation only: {e}"),
    }

    match issues.into_iter().min_by_key(|i| i.line) {
        Some(issue) => Err(issue),
        None => Ok(()),
    }
}

/// First ERROR or MISSING node in document order.
fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i) {
                if child.has_error() || child.is_missing() {
                    stack.push(child);
                }
            }
        }
    }
    None
}

fn describe(node: Node<'_>, source: &str) -> SyntaxIssue {
    let line = node.start_position().row + 1;
    if node.is_missing() {
        return SyntaxIssue::new(format!("missing `{}`", node.kind()), line);
    }
    let snippet = node
        .utf8_text(source.as_bytes())
        .unwrap_or("")
        .lines()
        .next()
        .unwrap_or("")
        .trim();
    if snippet.is_empty() {
        SyntaxIssue::new("invalid syntax", line)
    } else {
        let snippet: String = snippet.chars().take(40).collect();
        SyntaxIssue::new(format!("invalid syntax near `{snippet}`"), line)
    }
}

// -- Python 3 rules the grammar accepts ---------------------------------------
//
// tree-sitter-python recovers from bad indentation, still knows the
// Python 2 `print`/`exec` statements and does not track scopes. These
// checks reject what the interpreter rejects.

/// First statement that is only legal in another context, in document order.
fn misplaced_statement(root: Node<'_>) -> Option<SyntaxIssue> {
    // (node, inside a function, inside a loop)
    let mut stack = vec![(root, false, false)];
    while let Some((node, in_function, in_loop)) = stack.pop() {
        let line = node.start_position().row + 1;
        let message = match node.kind() {
            "print_statement" => Some("Missing parentheses in call to 'print'"),
            "exec_statement" => Some("Missing parentheses in call to 'exec'"),
            "return_statement" if !in_function => Some("'return' outside function"),
            "break_statement" if !in_loop => Some("'break' outside loop"),
            "continue_statement" if !in_loop => Some("'continue' not properly in loop"),
            _ => None,
        };
        if let Some(message) = message {
            return Some(SyntaxIssue::new(message, line));
        }

        let (in_function, in_loop) = match node.kind() {
            "function_definition" => (true, false),
            "class_definition" => (false, false),
            "for_statement" | "while_statement" => (in_function, true),
            _ => (in_function, in_loop),
        };
        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i) {
                stack.push((child, in_function, in_loop));
            }
        }
    }
    None
}

/// One logical line: a statement start, possibly continued over several
/// physical lines by brackets, triple-quoted strings or a backslash.
struct LogicalLine {
    line: usize,
    indent: usize,
    /// Ends with `:`, so the next statement must be indented deeper
    opens_block: bool,
}

#[derive(Clone, Copy)]
struct StringState {
    quote: char,
    triple: bool,
}

fn logical_lines(source: &str) -> Vec<LogicalLine> {
    let mut out = Vec::new();
    let mut current: Option<LogicalLine> = None;
    let mut depth = 0usize;
    let mut string: Option<StringState> = None;
    let mut last_sig: Option<char> = None;

    for (idx, text) in source.lines().enumerate() {
        if current.is_none() {
            let body = text.trim_start();
            if body.is_empty() || body.starts_with('#') {
                continue;
            }
            current = Some(LogicalLine {
                line: idx + 1,
                indent: indent_width(text),
                opens_block: false,
            });
            last_sig = None;
        }

        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if let Some(st) = string {
                if c == '\\' {
                    i += 2;
                    continue;
                }
                if st.triple {
                    if chars[i..].starts_with(&[st.quote; 3]) {
                        string = None;
                        i += 3;
                        continue;
                    }
                } else if c == st.quote {
                    string = None;
                }
                i += 1;
                continue;
            }
            match c {
                '#' => break,
                '\'' | '"' => {
                    let triple = chars[i..].starts_with(&[c; 3]);
                    string = Some(StringState { quote: c, triple });
                    last_sig = Some(c);
                    i += if triple { 3 } else { 1 };
                    continue;
                }
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth = depth.saturating_sub(1),
                _ => {}
            }
            if !c.is_whitespace() {
                last_sig = Some(c);
            }
            i += 1;
        }

        // An unterminated single-quoted string ends with its line
        if string.is_some_and(|st| !st.triple) {
            string = None;
        }
        let continued = string.is_some() || depth > 0 || last_sig == Some('\\');
        if !continued {
            if let Some(mut logical) = current.take() {
                logical.opens_block = last_sig == Some(':');
                out.push(logical);
            }
        }
    }
    out.extend(current);
    out
}

/// Column width of the leading whitespace; tabs advance to the next
/// multiple of eight.
fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / 8 + 1) * 8,
            _ => break,
        }
    }
    width
}

fn check_indentation(source: &str) -> Result<(), SyntaxIssue> {
    let mut levels = vec![0usize];
    let mut expect_block = false;
    let mut last_line = 0;

    for logical in logical_lines(source) {
        let top = levels.last().copied().unwrap_or(0);
        if expect_block {
            if logical.indent <= top {
                return Err(SyntaxIssue::new("expected an indented block", logical.line));
            }
            levels.push(logical.indent);
        } else if logical.indent > top {
            return Err(SyntaxIssue::new("unexpected indent", logical.line));
        } else if logical.indent < top {
            while levels.last().is_some_and(|&l| l > logical.indent) {
                levels.pop();
            }
            if levels.last() != Some(&logical.indent) {
                return Err(SyntaxIssue::new(
                    "unindent does not match any outer indentation level",
                    logical.line,
                ));
            }
        }
        expect_block = logical.opens_block;
        last_line = logical.line;
    }

    if expect_block {
        return Err(SyntaxIssue::new("expected an indented block", last_line));
    }
    Ok(())
}

fn validate_json(source: &str) -> Result<(), SyntaxIssue> {
    serde_json::from_str::<serde_json::Value>(source)
        .map(|_| ())
        .map_err(|e| SyntaxIssue::new(e.to_string(), e.line().max(1)))
}
