//! Formatting options
//!
//! Every switch is an enum or a typed field; there is no stringly-typed
//! options bag, so unknown options are unrepresentable. Values that are
//! free-form strings (`newline`, `indent_char`, `parameter_symbol`) are
//! validated once when formatting starts.

use smol_str::SmolStr;

/// Case transformation applied to `Keyword` print tokens.
///
/// `Preserve` leaves the token text untouched; keywords synthesized from a
/// parsed tree carry their canonical lowercase spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeywordCase {
    #[default]
    Lower,
    Upper,
    Preserve,
}

/// Case transformation applied to unquoted identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierCase {
    #[default]
    Preserve,
    Lower,
    Upper,
}

/// Identifier delimiter style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierEscape {
    /// Quote only when the name requires it (non-plain word or reserved)
    None,
    #[default]
    DoubleQuote,
    Backtick,
    Bracket,
}

/// Where the separator goes when a list breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommaBreak {
    #[default]
    None,
    Before,
    After,
}

/// Where AND/OR go when a condition chain breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AndBreak {
    #[default]
    None,
    Before,
    After,
}

/// Output form for exported comments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentStyleOption {
    #[default]
    Block,
    Line,
}

/// How parameters render and collect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterStyle {
    #[default]
    Named,
    Positional,
    Anonymous,
}

/// Style options for the formatter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    pub indent_char: char,
    pub indent_size: usize,
    pub newline: SmolStr,
    pub keyword_case: KeywordCase,
    pub identifier_case: IdentifierCase,
    pub identifier_escape: IdentifierEscape,
    pub comma_break: CommaBreak,
    pub and_break: AndBreak,
    pub values_comma_break: CommaBreak,
    pub insert_columns_one_line: bool,
    pub expression_width: usize,
    pub line_wrapping: bool,
    pub export_comment: bool,
    pub comment_style: CommentStyleOption,
    pub parameter_symbol: SmolStr,
    pub parameter_style: ParameterStyle,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_char: ' ',
            indent_size: 4,
            newline: SmolStr::new("\n"),
            keyword_case: KeywordCase::Lower,
            identifier_case: IdentifierCase::Preserve,
            identifier_escape: IdentifierEscape::DoubleQuote,
            comma_break: CommaBreak::None,
            and_break: AndBreak::None,
            values_comma_break: CommaBreak::None,
            insert_columns_one_line: false,
            expression_width: 50,
            line_wrapping: false,
            export_comment: false,
            comment_style: CommentStyleOption::Block,
            parameter_symbol: SmolStr::new(":"),
            parameter_style: ParameterStyle::Named,
        }
    }
}

impl FormatOptions {
    /// Indentation string for one level
    pub fn indent(&self, level: usize) -> String {
        std::iter::repeat(self.indent_char)
            .take(self.indent_size * level)
            .collect()
    }

    /// True when any break option forces clause-per-line layout
    pub(crate) fn breaks_clauses(&self) -> bool {
        self.comma_break != CommaBreak::None
            || self.values_comma_break != CommaBreak::None
            || self.and_break != AndBreak::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let opts = FormatOptions::default();
        assert_eq!(opts.indent_char, ' ');
        assert_eq!(opts.indent_size, 4);
        assert_eq!(opts.newline, "\n");
        assert_eq!(opts.keyword_case, KeywordCase::Lower);
        assert_eq!(opts.identifier_escape, IdentifierEscape::DoubleQuote);
        assert_eq!(opts.comma_break, CommaBreak::None);
        assert_eq!(opts.expression_width, 50);
        assert!(!opts.export_comment);
        assert_eq!(opts.parameter_symbol, ":");
        assert_eq!(opts.parameter_style, ParameterStyle::Named);
    }

    #[test]
    fn indent_repeats_the_indent_char() {
        let opts = FormatOptions::default();
        assert_eq!(opts.indent(2), "        ");
        let tabs = FormatOptions {
            indent_char: '\t',
            indent_size: 1,
            ..FormatOptions::default()
        };
        assert_eq!(tabs.indent(3), "\t\t\t");
    }
}
