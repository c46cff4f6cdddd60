//! Print tokens
//!
//! The emitter lowers the AST into this closed token set; the writer renders
//! it under the style options. Container kinds encode the role of each
//! group so the writer can apply per-container policy (which comma option
//! applies, whether the group may break, call-style parenthesis joinery).

use smol_str::SmolStr;

use crate::ast::ParamMarker;
use crate::lexer::CommentStyle;

/// One rendering unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintToken {
    Keyword(SmolStr),
    Identifier {
        text: SmolStr,
        /// Written with quotes in the source; forces delimiters even under
        /// `IdentifierEscape::None`
        quoted: bool,
    },
    Literal(SmolStr),
    Operator(SmolStr),
    Punct(SmolStr),
    Comment {
        text: SmolStr,
        style: CommentStyle,
    },
    /// Hint body; renders as `/*+ … */` regardless of comment export
    Hint(SmolStr),
    /// Bind parameter; rendering and collection are writer policy
    Param {
        marker: ParamMarker,
        name: Option<SmolStr>,
        index: Option<u32>,
        raw: SmolStr,
    },
    /// Break here if the enclosing container breaks; otherwise plain spacing
    SoftBreak,
    /// Always break here
    HardBreak,
    IndentOpen,
    IndentClose,
    Group(ContainerKind),
    GroupEnd,
}

/// Role of a group in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Statement,
    SelectClauseBody,
    SelectItemList,
    SelectItem,
    WithClauseBody,
    CommonTableBody,
    FromClauseBody,
    JoinCondition,
    WhereClauseBody,
    GroupByBody,
    HavingBody,
    WindowBody,
    QualifyBody,
    OrderByBody,
    LimitBody,
    ValuesRowList,
    ValuesRow,
    InsertColumnList,
    SetClauseList,
    ReturningBody,
    MergeClauseList,
    FunctionArgList,
    WindowSpecBody,
    CaseBody,
    ParenBody,
    TupleBody,
    SubqueryBody,
    ColumnDefList,
    IndexColumnList,
    AliasColumnList,
}

impl ContainerKind {
    /// Which comma policy governs separators directly inside this container
    pub(crate) fn comma_policy(self) -> CommaPolicy {
        match self {
            ContainerKind::SelectItemList
            | ContainerKind::WithClauseBody
            | ContainerKind::InsertColumnList
            | ContainerKind::SetClauseList
            | ContainerKind::ReturningBody
            | ContainerKind::GroupByBody
            | ContainerKind::OrderByBody
            | ContainerKind::ColumnDefList => CommaPolicy::List,
            ContainerKind::ValuesRowList => CommaPolicy::ValuesRows,
            _ => CommaPolicy::Inline,
        }
    }

    /// Containers whose opening parenthesis joins the preceding name
    pub(crate) fn is_call_style(self) -> bool {
        matches!(
            self,
            ContainerKind::FunctionArgList | ContainerKind::InsertColumnList
        )
    }

    /// Containers where AND/OR breaking applies
    pub(crate) fn takes_and_break(self) -> bool {
        matches!(
            self,
            ContainerKind::WhereClauseBody
                | ContainerKind::HavingBody
                | ContainerKind::QualifyBody
                | ContainerKind::JoinCondition
        )
    }
}

/// Separator policy resolved per container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommaPolicy {
    /// Follows `comma_break`
    List,
    /// Follows `values_comma_break`
    ValuesRows,
    /// Never breaks
    Inline,
}
