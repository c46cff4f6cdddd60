//! Print-token rendering
//!
//! The writer owns every layout decision: break or inline at soft breaks,
//! separator placement, indent emission, token casing, identifier escaping,
//! comment export, and parameter restyling/collection.

use smol_str::SmolStr;

use super::options::{
    AndBreak, CommaBreak, CommentStyleOption, FormatOptions, IdentifierCase, IdentifierEscape,
    KeywordCase, ParameterStyle,
};
use super::tokens::{CommaPolicy, ContainerKind, PrintToken};
use super::FormatError;
use crate::lexer::{keywords, CommentStyle};

/// One collected bind parameter, in first-occurrence order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamBinding {
    pub name: Option<SmolStr>,
    pub index: u32,
    /// Exactly what was written into the SQL text
    pub placeholder: String,
}

/// What the previous written token was, for spacing decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    None,
    Word,
    Keyword,
    Operator,
    OpenDelim,
    TightOp,
    PrefixOp,
    Comma,
}

pub(crate) struct Writer<'a> {
    opts: &'a FormatOptions,
    out: String,
    indent: usize,
    stack: Vec<ContainerKind>,
    prev: Prev,
    line_len: usize,
    /// A line comment was just written; the next text must start a line
    pending_hard: bool,
    /// Swallow the soft break that follows a before-style separator
    swallow_soft: bool,
    /// Force the next soft break to break (after-style separators)
    force_soft: bool,
    group_just_opened: Option<ContainerKind>,
    params: Vec<ParamBinding>,
    param_keys: Vec<String>,
}

impl<'a> Writer<'a> {
    pub(crate) fn new(opts: &'a FormatOptions) -> Result<Self, FormatError> {
        validate(opts)?;
        Ok(Self {
            opts,
            out: String::new(),
            indent: 0,
            stack: Vec::new(),
            prev: Prev::None,
            line_len: 0,
            pending_hard: false,
            swallow_soft: false,
            force_soft: false,
            group_just_opened: None,
            params: Vec::new(),
            param_keys: Vec::new(),
        })
    }

    pub(crate) fn render(
        mut self,
        tokens: &[PrintToken],
    ) -> Result<(String, Vec<ParamBinding>), FormatError> {
        for (i, token) in tokens.iter().enumerate() {
            // A name directly heading an argument list renders bare: escaping
            // every function call would quote the whole builtin vocabulary
            if let PrintToken::Identifier { text, quoted } = token {
                let heads_call = matches!(
                    tokens.get(i + 1),
                    Some(PrintToken::Group(ContainerKind::FunctionArgList))
                );
                self.identifier(text, *quoted, heads_call);
                continue;
            }
            self.token(token)?;
        }
        if self.indent != 0 || !self.stack.is_empty() {
            return Err(FormatError::IndentMismatch);
        }
        let trimmed = self.out.trim_end().to_string();
        Ok((trimmed, self.params))
    }

    fn token(&mut self, token: &PrintToken) -> Result<(), FormatError> {
        match token {
            PrintToken::Group(kind) => {
                self.stack.push(*kind);
                self.group_just_opened = Some(*kind);
            }
            PrintToken::GroupEnd => {
                if self.stack.pop().is_none() {
                    return Err(FormatError::IndentMismatch);
                }
            }
            PrintToken::IndentOpen => self.indent += 1,
            PrintToken::IndentClose => {
                if self.indent == 0 {
                    return Err(FormatError::IndentMismatch);
                }
                self.indent -= 1;
            }
            PrintToken::SoftBreak => {
                // Resolved eagerly, against the container the break sits in
                if self.swallow_soft {
                    self.swallow_soft = false;
                } else if self.soft_breaks_here() {
                    self.newline();
                }
                self.force_soft = false;
            }
            PrintToken::HardBreak => self.newline(),
            PrintToken::Punct(text) if text == "," => self.comma(),
            PrintToken::Punct(text) => self.punct(text),
            PrintToken::Keyword(text) => self.keyword(text),
            PrintToken::Identifier { text, quoted } => self.identifier(text, *quoted, false),
            PrintToken::Literal(text) => self.write(text, Prev::Word),
            PrintToken::Operator(text) => self.operator(text),
            PrintToken::Comment { text, style } => self.comment(text, *style),
            PrintToken::Hint(text) => self.hint(text),
            PrintToken::Param {
                name,
                index,
                raw,
                ..
            } => self.param(name.as_ref(), *index, raw),
        }
        Ok(())
    }

    // =========================================================================
    // Break policy
    // =========================================================================

    fn current_container(&self) -> Option<ContainerKind> {
        self.stack.last().copied()
    }

    /// The comma-break option governing the current container, if any
    fn comma_option(&self) -> CommaBreak {
        let Some(kind) = self.current_container() else {
            return CommaBreak::None;
        };
        match kind.comma_policy() {
            CommaPolicy::List => {
                if kind == ContainerKind::InsertColumnList && self.opts.insert_columns_one_line {
                    CommaBreak::None
                } else {
                    self.opts.comma_break
                }
            }
            CommaPolicy::ValuesRows => self.opts.values_comma_break,
            CommaPolicy::Inline => CommaBreak::None,
        }
    }

    /// Whether a soft break in the current container becomes a newline
    fn soft_breaks_here(&self) -> bool {
        if self.force_soft {
            return true;
        }
        if self.opts.line_wrapping && self.line_len > self.opts.expression_width {
            return true;
        }
        let Some(kind) = self.current_container() else {
            return false;
        };
        match kind.comma_policy() {
            CommaPolicy::List | CommaPolicy::ValuesRows => self.comma_option() != CommaBreak::None,
            CommaPolicy::Inline => matches!(
                kind,
                ContainerKind::Statement
                    | ContainerKind::SelectClauseBody
                    | ContainerKind::FromClauseBody
                    | ContainerKind::WhereClauseBody
                    | ContainerKind::HavingBody
                    | ContainerKind::QualifyBody
                    | ContainerKind::WindowBody
                    | ContainerKind::CaseBody
                    | ContainerKind::MergeClauseList
            ) && self.opts.breaks_clauses(),
        }
    }

    fn flush_hard(&mut self) {
        if self.pending_hard {
            self.newline();
            self.pending_hard = false;
        }
    }

    fn newline(&mut self) {
        // Drop any trailing pad before breaking
        while self.out.ends_with(' ') || self.out.ends_with('\t') {
            self.out.pop();
        }
        self.out.push_str(&self.opts.newline);
        let pad = self.opts.indent(self.indent);
        self.line_len = pad.chars().count();
        self.out.push_str(&pad);
        self.prev = Prev::None;
    }

    // =========================================================================
    // Writing
    // =========================================================================

    fn needs_space(&self, next_tight: bool) -> bool {
        if next_tight {
            return false;
        }
        !matches!(
            self.prev,
            Prev::None | Prev::OpenDelim | Prev::TightOp | Prev::PrefixOp
        )
    }

    /// Append text, spacing it from the previous token per the joinery rules
    fn write(&mut self, text: &str, class: Prev) {
        self.flush_hard();
        let next_tight = matches!(text, ")" | "]" | "." | "::" | ";" | ",");
        if self.needs_space(next_tight) {
            self.out.push(' ');
            self.line_len += 1;
        }
        self.out.push_str(text);
        self.line_len += text.chars().count();
        self.prev = class;
        self.group_just_opened = None;
    }

    fn comma(&mut self) {
        match self.comma_option() {
            CommaBreak::Before => {
                self.pending_hard = false;
                self.newline();
                self.out.push(',');
                self.line_len += 1;
                self.prev = Prev::Comma;
                self.swallow_soft = true;
            }
            CommaBreak::After => {
                self.write(",", Prev::Comma);
                self.force_soft = true;
            }
            CommaBreak::None => {
                self.write(",", Prev::Comma);
            }
        }
    }

    fn punct(&mut self, text: &str) {
        match text {
            "(" => {
                let call_style = self
                    .group_just_opened
                    .map(|k| k.is_call_style())
                    .unwrap_or(false);
                self.flush_hard();
                if !call_style && self.needs_space(false) {
                    self.out.push(' ');
                    self.line_len += 1;
                }
                self.out.push('(');
                self.line_len += 1;
                self.prev = Prev::OpenDelim;
                self.group_just_opened = None;
            }
            "[" => {
                // Subscripts and array suffixes join the base tightly
                self.flush_hard();
                self.out.push('[');
                self.line_len += 1;
                self.prev = Prev::OpenDelim;
            }
            "." => {
                self.flush_hard();
                self.out.push('.');
                self.line_len += 1;
                self.prev = Prev::TightOp;
            }
            _ => self.write(text, Prev::Word),
        }
    }

    fn keyword(&mut self, text: &str) {
        let cased = match self.opts.keyword_case {
            KeywordCase::Lower => text.to_ascii_lowercase(),
            KeywordCase::Upper => text.to_ascii_uppercase(),
            KeywordCase::Preserve => text.to_string(),
        };
        // AND/OR breaking inside condition bodies
        let is_connective =
            text.eq_ignore_ascii_case("and") || text.eq_ignore_ascii_case("or");
        let takes_break = self
            .current_container()
            .map(|k| k.takes_and_break())
            .unwrap_or(false);
        if is_connective && takes_break {
            match self.opts.and_break {
                AndBreak::Before => self.newline(),
                AndBreak::After | AndBreak::None => {}
            }
            self.write(&cased, Prev::Keyword);
            if self.opts.and_break == AndBreak::After {
                self.newline();
            }
            return;
        }
        self.write(&cased, Prev::Keyword);
    }

    fn identifier(&mut self, text: &str, quoted: bool, heads_call: bool) {
        let name = if quoted {
            text.to_string()
        } else {
            match self.opts.identifier_case {
                IdentifierCase::Preserve => text.to_string(),
                IdentifierCase::Lower => text.to_ascii_lowercase(),
                IdentifierCase::Upper => text.to_ascii_uppercase(),
            }
        };
        let escape = if heads_call && !quoted {
            IdentifierEscape::None
        } else {
            self.opts.identifier_escape
        };
        let rendered = match escape {
            IdentifierEscape::None => {
                // Source-quoted names keep their delimiters: unquoting a
                // mixed-case or spaced name would change what it resolves to
                if (quoted && !heads_call) || needs_escape(&name) {
                    format!("\"{}\"", name.replace('"', "\"\""))
                } else {
                    name
                }
            }
            IdentifierEscape::DoubleQuote => format!("\"{}\"", name.replace('"', "\"\"")),
            IdentifierEscape::Backtick => format!("`{name}`"),
            IdentifierEscape::Bracket => format!("[{name}]"),
        };
        self.write(&rendered, Prev::Word);
    }

    fn operator(&mut self, text: &str) {
        let prefix = matches!(text, "-" | "+" | "~")
            && matches!(
                self.prev,
                Prev::None
                    | Prev::OpenDelim
                    | Prev::Comma
                    | Prev::TightOp
                    | Prev::PrefixOp
                    | Prev::Keyword
                    | Prev::Operator
            );
        if matches!(text, "::") {
            self.write(text, Prev::TightOp);
        } else if prefix {
            self.write(text, Prev::PrefixOp);
        } else {
            self.write(text, Prev::Operator);
        }
    }

    /// Render a comment in the configured output form. The source form is
    /// irrelevant here: `comment_style` picks the shape, and only a text
    /// that cannot survive line form (embedded newline) stays block.
    fn comment(&mut self, text: &str, _source_style: CommentStyle) {
        if !self.opts.export_comment {
            return;
        }
        let as_line = match self.opts.comment_style {
            CommentStyleOption::Line => !text.contains('\n'),
            CommentStyleOption::Block => false,
        };
        if as_line {
            self.write(&format!("--{text}"), Prev::Word);
            // Anything after a line comment must start a fresh line
            self.pending_hard = true;
        } else {
            let lead = if text.starts_with(' ') || text.is_empty() { "" } else { " " };
            let tail = if text.ends_with(' ') || text.is_empty() { "" } else { " " };
            self.write(&format!("/*{lead}{text}{tail}*/"), Prev::Word);
        }
    }

    fn hint(&mut self, text: &str) {
        let body = if self.opts.keyword_case == KeywordCase::Upper {
            uppercase_hint_words(text)
        } else {
            text.to_string()
        };
        self.write(&format!("/*+{body}*/"), Prev::Word);
    }

    fn param(&mut self, name: Option<&SmolStr>, index: Option<u32>, raw: &str) {
        // Identity: the name for named forms, the marker for `$n`, and a
        // per-occurrence key for bare `?` (each `?` is its own parameter)
        let key = match name {
            Some(name) => name.to_string(),
            None if raw == "?" => format!("?#{}", self.param_keys.len()),
            None => raw.to_string(),
        };
        let placeholder = match self.opts.parameter_style {
            ParameterStyle::Named => match name {
                Some(name) => format!("{}{}", self.opts.parameter_symbol, name),
                None => raw.to_string(),
            },
            ParameterStyle::Positional => {
                let position = match self.param_keys.iter().position(|k| *k == key) {
                    Some(i) => i as u32 + 1,
                    None => self.param_keys.len() as u32 + 1,
                };
                format!("${position}")
            }
            ParameterStyle::Anonymous => "?".to_string(),
        };

        if !self.param_keys.contains(&key) {
            self.param_keys.push(key);
            self.params.push(ParamBinding {
                name: name.cloned(),
                index: index.unwrap_or(self.params.len() as u32 + 1),
                placeholder: placeholder.clone(),
            });
        }
        self.write(&placeholder, Prev::Word);
    }
}

/// Does an identifier need delimiters under `IdentifierEscape::None`?
fn needs_escape(name: &str) -> bool {
    if keywords::is_reserved(name) {
        return true;
    }
    let mut chars = name.chars();
    match chars.next() {
        None => return true,
        Some(c) if c == '_' || (c.is_ascii() && unicode_ident::is_xid_start(c)) => {}
        Some(_) => return true,
    }
    chars.any(|c| !(c == '_' || c == '$' || (c.is_ascii() && unicode_ident::is_xid_continue(c))))
}

/// Uppercase hint body words that are known keywords
fn uppercase_hint_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word = String::new();
    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            word.push(c);
        } else {
            flush_hint_word(&mut out, &mut word);
            out.push(c);
        }
    }
    flush_hint_word(&mut out, &mut word);
    out
}

fn flush_hint_word(out: &mut String, word: &mut String) {
    if word.is_empty() {
        return;
    }
    if keywords::is_keyword(word) {
        out.push_str(&word.to_ascii_uppercase());
    } else {
        out.push_str(word);
    }
    word.clear();
}

fn validate(opts: &FormatOptions) -> Result<(), FormatError> {
    if opts.indent_char != ' ' && opts.indent_char != '\t' {
        return Err(FormatError::UnknownOption(format!(
            "indent_char {:?} is not a space or tab",
            opts.indent_char
        )));
    }
    if opts.newline != "\n" && opts.newline != "\r\n" {
        return Err(FormatError::UnknownOption(format!(
            "newline {:?} is not \\n or \\r\\n",
            opts.newline
        )));
    }
    if opts.parameter_symbol.is_empty() {
        return Err(FormatError::UnknownOption(
            "parameter_symbol must not be empty".to_string(),
        ));
    }
    Ok(())
}
