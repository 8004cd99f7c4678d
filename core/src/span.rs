//! Line and indentation arithmetic shared by the parser and the rewriter.

/// Columns a tab occupies when stripping or emitting indentation.
pub const TAB_WIDTH: usize = 4;

/// Number of `\n`-separated segments in `text` (an empty string is one line).
pub fn count_lines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count() + 1
}

/// Remove up to `columns` columns of leading indentation from `line`.
///
/// Spaces count as one column and tabs as [`TAB_WIDTH`]. Stops at the first
/// non-blank character, so content is never removed.
pub fn strip_leading_spaces(columns: usize, line: &str) -> &str {
    let mut remaining = columns;
    let mut rest = line;

    while remaining > 0 {
        if let Some(next) = rest.strip_prefix(' ') {
            rest = next;
            remaining -= 1;
        } else if let Some(next) = rest.strip_prefix('\t') {
            rest = next;
            remaining = remaining.saturating_sub(TAB_WIDTH);
        } else {
            break;
        }
    }

    rest
}

/// Indentation reaching `column`, with every run of [`TAB_WIDTH`] spaces
/// written as a tab.
pub fn lead_whitespace_for_column(column: usize) -> String {
    let mut out = "\t".repeat(column / TAB_WIDTH);
    out.push_str(&" ".repeat(column % TAB_WIDTH));
    out
}

/// Byte offsets of line starts, for offset → (line, column) lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { starts }
    }

    /// 1-based line and 0-based byte column of `offset`.
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let line = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line + 1, offset - self.starts[line])
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}
