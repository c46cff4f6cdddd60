//! Offset → line/column conversion
//!
//! The lexer works in byte offsets; diagnostics and lexeme positions carry
//! line/column. [`LineIndex`] is built once per input and answers lookups in
//! O(log n).

use text_size::TextSize;

/// A line/column pair. Both components are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

/// Maps byte offsets to line/column positions
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(TextSize::new(i as u32 + 1));
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a line/column position
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let col = u32::from(offset) - u32::from(self.line_starts[line]);
        LineCol {
            line: line as u32 + 1,
            col: col + 1,
        }
    }

    /// The line number (1-indexed) containing the offset
    pub fn line(&self, offset: TextSize) -> u32 {
        self.line_col(offset).line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_starts_at_one() {
        let index = LineIndex::new("select 1");
        assert_eq!(index.line_col(TextSize::new(0)), LineCol { line: 1, col: 1 });
        assert_eq!(index.line_col(TextSize::new(7)), LineCol { line: 1, col: 8 });
    }

    #[test]
    fn offsets_after_newlines() {
        let index = LineIndex::new("select 1\nfrom t\n");
        assert_eq!(index.line_col(TextSize::new(9)), LineCol { line: 2, col: 1 });
        assert_eq!(
            index.line_col(TextSize::new(14)),
            LineCol { line: 2, col: 6 }
        );
        // Offset just past the final newline is the start of line 3
        assert_eq!(
            index.line_col(TextSize::new(16)),
            LineCol { line: 3, col: 1 }
        );
    }

    #[test]
    fn empty_input_has_one_line() {
        let index = LineIndex::new("");
        assert_eq!(index.line(TextSize::new(0)), 1);
    }
}
