//! Structural text segmenter: a line-by-line state machine.
//!
//! Turns documentation text into an ordered list of typed blocks:
//! sections, code fences, lists and tables. Two heading dialects are
//! supported: markdown (`## Title`) and plain text extracted from PDFs,
//! where headings are recognised heuristically (numbered, lettered,
//! all-caps and `Title:` lines).

use crate::model::*;
use regex::Regex;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

static RE_FENCE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[[:blank:]]*(`{3,}|~{3,})[[:blank:]]*\{?\.?([A-Za-z0-9_+#.-]*)").unwrap()
});

static RE_FENCE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[[:blank:]]*(`{3,}|~{3,})[[:blank:]]*$").unwrap());

static RE_MD_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}[[:blank:]]+(.+)$").unwrap());

// Plain-text headings, matched against the trimmed line
static RE_PLAIN_NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[[:blank:]]+(.+)$").unwrap());

static RE_PLAIN_SUBNUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(?:\.[0-9]+)+\.?[[:blank:]]+(.+)$").unwrap());

static RE_PLAIN_LETTERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]\.[[:blank:]]+(.+)$").unwrap());

static RE_PLAIN_CAPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z[:blank:]]{5,}$").unwrap());

static RE_PLAIN_COLON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z[:blank:]]+:$").unwrap());

static RE_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[[:blank:]]*[-*+•][[:blank:]]+(.+)$").unwrap());

static RE_NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[[:blank:]]*[0-9]+[.)][[:blank:]]+(.+)$").unwrap());

static RE_LETTERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[[:blank:]]*[a-zA-Z]\.[[:blank:]]+(.+)$").unwrap());

static RE_PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[[:blank:]]*\([0-9]+\)[[:blank:]]+(.+)$").unwrap());

static RE_CELL_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{3,}|\t{2,}").unwrap());

/// Plain-text heading titles must be at least this many characters...
const PLAIN_TITLE_MIN: usize = 10;
/// ...and shorter than this.
const PLAIN_TITLE_MAX: usize = 100;

// -- Public API ---------------------------------------------------------------

/// Heading dialect of the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentMode {
    #[default]
    Markdown,
    /// Text extracted from a PDF; no markdown heading syntax is assumed.
    Plain,
}

/// Split documentation text into typed blocks, ordered by start line.
pub fn segment(input: &str, mode: SegmentMode) -> Vec<TextBlock> {
    let mut state = ParserState::new(mode);

    for (idx, line) in input.lines().enumerate() {
        process_line(&mut state, idx + 1, line);
    }

    // An unterminated fence is closed by the end of input; its lines are
    // already in the draft.
    state
        .drafts
        .into_iter()
        .map(|d| TextBlock::new(d.kind, d.label, d.style, d.line, d.lines))
        .collect()
}

impl TextBlock {
    /// Cells of each row of a table block; the first row is the header.
    /// Empty for other block kinds.
    pub fn table_rows(&self) -> Vec<Vec<String>> {
        if self.kind != BlockKind::Table {
            return Vec::new();
        }
        self.lines.iter().map(|row| split_row(row)).collect()
    }
}

// -- Parser state -------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    InSectionBody,
    InCodeFence,
    InList,
    InTable,
}

struct Draft {
    kind: BlockKind,
    label: Option<String>,
    style: Option<ListStyle>,
    line: usize,
    lines: Vec<String>,
}

struct ParserState {
    mode: SegmentMode,
    state: State,
    drafts: Vec<Draft>,
    /// Open section, stays open across fences, lists and tables
    section: Option<usize>,
    /// Open fence, list or table
    current: Option<usize>,
    /// Fence character and run length of the open fence
    fence: Option<(char, usize)>,
}

impl ParserState {
    fn new(mode: SegmentMode) -> Self {
        Self {
            mode,
            state: State::Outside,
            drafts: Vec::new(),
            section: None,
            current: None,
            fence: None,
        }
    }

    fn open(&mut self, kind: BlockKind, label: Option<String>, style: Option<ListStyle>, line: usize) {
        self.drafts.push(Draft {
            kind,
            label,
            style,
            line,
            lines: Vec::new(),
        });
        let idx = self.drafts.len() - 1;
        match kind {
            BlockKind::Section => {
                self.section = Some(idx);
                self.state = State::InSectionBody;
            }
            BlockKind::Code => {
                self.current = Some(idx);
                self.state = State::InCodeFence;
            }
            BlockKind::List => {
                self.current = Some(idx);
                self.state = State::InList;
            }
            BlockKind::Table => {
                self.current = Some(idx);
                self.state = State::InTable;
            }
        }
    }

    /// Close the open fence, list or table and fall back to the section body.
    fn close_current(&mut self) {
        self.current = None;
        self.fence = None;
        self.state = if self.section.is_some() {
            State::InSectionBody
        } else {
            State::Outside
        };
    }

    fn push(&mut self, text: String) {
        if let Some(idx) = self.current {
            self.drafts[idx].lines.push(text);
        }
    }
}

// -- Line processing ----------------------------------------------------------

fn process_line(s: &mut ParserState, lineno: usize, line: &str) {
    // 1. Inside a fence everything is content until the matching close
    if s.state == State::InCodeFence {
        if is_fence_close(line, s.fence) {
            s.close_current();
        } else {
            s.push(line.to_string());
        }
        return;
    }

    // 2. Fence open
    if let Some(caps) = RE_FENCE_OPEN.captures(line) {
        let marker = &caps[1];
        let tag = caps[2].trim_end_matches('}').to_lowercase();
        let language = if tag.is_empty() {
            UNKNOWN_LANGUAGE.to_string()
        } else {
            tag
        };
        s.close_current();
        let ch = marker.chars().next().unwrap_or('`');
        s.open(BlockKind::Code, Some(language), None, lineno);
        s.fence = Some((ch, marker.len()));
        return;
    }

    // 3. Blank line closes lists and tables
    if line.trim().is_empty() {
        if matches!(s.state, State::InList | State::InTable) {
            s.close_current();
        }
        return;
    }

    // 4. Heading opens a new section
    if let Some(title) = heading_title(line, s.mode) {
        s.close_current();
        s.open(BlockKind::Section, Some(title), None, lineno);
        return;
    }

    // 5. List item
    if let Some((style, text)) = list_item(line) {
        if s.state != State::InList {
            s.close_current();
            s.open(BlockKind::List, None, Some(style), lineno);
        }
        s.push(text);
        return;
    }

    // 6. Indented continuation of the last list item
    if s.state == State::InList && line.starts_with([' ', '\t']) {
        if let Some(idx) = s.current {
            if let Some(last) = s.drafts[idx].lines.last_mut() {
                last.push(' ');
                last.push_str(line.trim());
            }
        }
        return;
    }

    // 7. Table row
    if is_pipe_separator(line) {
        // A separator row carries no cells, inside a table or not
        return;
    }
    if is_table_row(line) {
        if s.state != State::InTable {
            s.close_current();
            s.open(BlockKind::Table, None, None, lineno);
        }
        s.push(line.trim().to_string());
        return;
    }

    // 8. Prose: close list/table, append to the open section (or drop preamble)
    if matches!(s.state, State::InList | State::InTable) {
        s.close_current();
    }
    if let Some(idx) = s.section {
        s.drafts[idx].lines.push(line.trim().to_string());
    }
}

// -- Helper functions ---------------------------------------------------------

fn is_fence_close(line: &str, fence: Option<(char, usize)>) -> bool {
    let Some((ch, len)) = fence else {
        return false;
    };
    match RE_FENCE_CLOSE.captures(line) {
        Some(caps) => {
            let marker = &caps[1];
            marker.starts_with(ch) && marker.len() >= len
        }
        None => false,
    }
}

/// Title of a heading line, if the line is one in the given mode.
fn heading_title(line: &str, mode: SegmentMode) -> Option<String> {
    match mode {
        SegmentMode::Markdown => RE_MD_HEADING.captures(line).map(|caps| {
            caps[1]
                .trim()
                .trim_end_matches('#')
                .trim_end()
                .to_string()
        }),
        SegmentMode::Plain => {
            let trimmed = line.trim();
            let title = [&*RE_PLAIN_SUBNUMBERED, &*RE_PLAIN_NUMBERED, &*RE_PLAIN_LETTERED]
                .iter()
                .find_map(|re| re.captures(trimmed).map(|caps| caps[1].trim().to_string()))
                .or_else(|| {
                    (RE_PLAIN_CAPS.is_match(trimmed) || RE_PLAIN_COLON.is_match(trimmed))
                        .then(|| trimmed.to_string())
                })?;
            is_plain_title(&title).then_some(title)
        }
    }
}

/// Running headers and footers in PDF text are usually short or lowercase.
fn is_plain_title(title: &str) -> bool {
    let len = title.chars().count();
    (PLAIN_TITLE_MIN..PLAIN_TITLE_MAX).contains(&len)
        && title.chars().next().is_some_and(char::is_uppercase)
}

fn list_item(line: &str) -> Option<(ListStyle, String)> {
    let patterns: [(&Regex, ListStyle); 4] = [
        (&*RE_BULLET, ListStyle::Bullet),
        (&*RE_NUMBERED, ListStyle::Numbered),
        (&*RE_LETTERED, ListStyle::Lettered),
        (&*RE_PARENTHESIZED, ListStyle::Parenthesized),
    ];
    patterns.iter().find_map(|(re, style)| {
        re.captures(line)
            .map(|caps| (*style, caps[1].trim().to_string()))
    })
}

fn is_pipe_row(line: &str) -> bool {
    let t = line.trim();
    t.len() >= 2 && t.starts_with('|') && t.ends_with('|')
}

fn is_pipe_separator(line: &str) -> bool {
    is_pipe_row(line)
        && line.contains('-')
        && line.trim().chars().all(|c| matches!(c, '|' | '-' | ':' | ' ' | '\t'))
}

fn is_table_row(line: &str) -> bool {
    if is_pipe_row(line) {
        return true;
    }
    split_row(line).len() >= 2
}

/// Split a table row into its non-empty cells.
fn split_row(line: &str) -> Vec<String> {
    let t = line.trim();
    if is_pipe_row(t) {
        return t[1..t.len() - 1]
            .split('|')
            .map(|c| c.trim().to_string())
            .collect();
    }
    RE_CELL_SEPARATOR
        .split(t)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(blocks: &[TextBlock]) -> Vec<BlockKind> {
        blocks.iter().map(|b| b.kind).collect()
    }

    #[test]
    fn code_fence_with_language() {
        let blocks = segment("```python\nimport os\nprint(1)\n```\n", SegmentMode::Markdown);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Code);
        assert_eq!(blocks[0].language.as_deref(), Some("python"));
        assert_eq!(blocks[0].lines, vec!["import os", "print(1)"]);
        assert_eq!(blocks[0].line, 1);
    }

    #[test]
    fn fence_without_tag_is_unknown() {
        let blocks = segment("```\nx\n```\n", SegmentMode::Markdown);
        assert_eq!(blocks[0].language.as_deref(), Some(UNKNOWN_LANGUAGE));
    }

    #[test]
    fn unterminated_fence_closed_at_end() {
        let blocks = segment("# Intro\n```js\nfoo();\n", SegmentMode::Markdown);
        assert_eq!(kinds(&blocks), vec![BlockKind::Section, BlockKind::Code]);
        assert_eq!(blocks[1].lines, vec!["foo();"]);
    }

    #[test]
    fn empty_blocks_are_emitted() {
        let blocks = segment("# Empty\n```\n```\n# Next\n", SegmentMode::Markdown);
        assert_eq!(
            kinds(&blocks),
            vec![BlockKind::Section, BlockKind::Code, BlockKind::Section]
        );
        assert!(blocks[0].lines.is_empty());
        assert!(blocks[1].lines.is_empty());
    }

    #[test]
    fn fence_content_is_not_segmented() {
        let blocks = segment("```\n# not a heading\n- not a list\n```\n", SegmentMode::Markdown);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines.len(), 2);
    }

    #[test]
    fn longer_fence_needs_matching_close() {
        let input = "````md\n```\ninner\n```\n````\n";
        let blocks = segment(input, SegmentMode::Markdown);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines, vec!["```", "inner", "```"]);
    }

    #[test]
    fn sections_collect_body_and_drop_preamble() {
        let input = "preamble text\n# Usage\nRun it.\n\nThen stop.\n## Details ##\nMore.\n";
        let blocks = segment(input, SegmentMode::Markdown);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].title.as_deref(), Some("Usage"));
        assert_eq!(blocks[0].lines, vec!["Run it.", "Then stop."]);
        assert_eq!(blocks[1].title.as_deref(), Some("Details"));
    }

    #[test]
    fn section_stays_open_across_code() {
        let input = "# Usage\nBefore.\n```sh\nrun\n```\nAfter.\n";
        let blocks = segment(input, SegmentMode::Markdown);
        assert_eq!(kinds(&blocks), vec![BlockKind::Section, BlockKind::Code]);
        assert_eq!(blocks[0].lines, vec!["Before.", "After."]);
    }

    #[test]
    fn list_closed_by_blank_line() {
        let input = "# Steps\n- one\n- two\n  continued\n\n- three\n";
        let blocks = segment(input, SegmentMode::Markdown);
        assert_eq!(
            kinds(&blocks),
            vec![BlockKind::Section, BlockKind::List, BlockKind::List]
        );
        assert_eq!(blocks[1].lines, vec!["one", "two continued"]);
        assert_eq!(blocks[1].list_style, Some(ListStyle::Bullet));
        assert_eq!(blocks[2].lines, vec!["three"]);
    }

    #[test]
    fn list_styles() {
        let blocks = segment("1. first\n2. second\n\na. alpha\n\n(1) paren\n", SegmentMode::Markdown);
        let styles: Vec<_> = blocks.iter().map(|b| b.list_style).collect();
        assert_eq!(
            styles,
            vec![
                Some(ListStyle::Numbered),
                Some(ListStyle::Lettered),
                Some(ListStyle::Parenthesized)
            ]
        );
    }

    #[test]
    fn whitespace_table_header_and_rows() {
        let input = "# Options\nName     Type     Default\nport     int      8080\nhost     str      local\nAfter the table.\n";
        let blocks = segment(input, SegmentMode::Markdown);
        assert_eq!(kinds(&blocks), vec![BlockKind::Section, BlockKind::Table]);
        let rows = blocks[1].table_rows();
        assert_eq!(rows[0], vec!["Name", "Type", "Default"]);
        assert_eq!(rows.len(), 3);
        assert_eq!(blocks[0].lines, vec!["After the table."]);
    }

    #[test]
    fn pipe_table_skips_separator() {
        let input = "| a | b |\n|---|:-:|\n| 1 | 2 |\n";
        let blocks = segment(input, SegmentMode::Markdown);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].table_rows(), vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn plain_mode_numbered_heading() {
        let input = "1. Installation Guide\nRun the installer.\n";
        let blocks = segment(input, SegmentMode::Plain);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Section);
        assert_eq!(blocks[0].title.as_deref(), Some("Installation Guide"));
        assert_eq!(blocks[0].lines, vec!["Run the installer."]);
    }

    #[test]
    fn plain_mode_short_title_is_a_list_item() {
        let blocks = segment("1. Intro\n", SegmentMode::Plain);
        assert_eq!(blocks[0].kind, BlockKind::List);
    }

    #[test]
    fn plain_mode_caps_and_subnumbered() {
        let input = "GETTING STARTED\ntext\n2.1 Configuration Files\nmore\n";
        let blocks = segment(input, SegmentMode::Plain);
        let titles: Vec<_> = blocks.iter().filter_map(|b| b.title.as_deref()).collect();
        assert_eq!(titles, vec!["GETTING STARTED", "Configuration Files"]);
    }

    #[test]
    fn plain_mode_ignores_markdown_headings() {
        let blocks = segment("# Installation Guide\n", SegmentMode::Plain);
        assert!(blocks.iter().all(|b| b.kind != BlockKind::Section));
    }

    #[test]
    fn markdown_mode_ignores_plain_headings() {
        let blocks = segment("INSTALLATION NOTES\n", SegmentMode::Markdown);
        assert!(blocks.is_empty());
    }

    #[test]
    fn segmentation_is_deterministic() {
        let input = "# A\ntext\n```py\nx = 1\n```\n- item\n";
        assert_eq!(
            segment(input, SegmentMode::Markdown),
            segment(input, SegmentMode::Markdown)
        );
    }

    #[test]
    fn stray_separator_row_is_dropped() {
        let blocks = segment("# Notes
intro
|---|---|
after
", SegmentMode::Markdown);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines, vec!["intro", "after"]);
    }
}
