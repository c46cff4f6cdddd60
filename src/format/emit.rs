//! AST → print-token lowering
//!
//! The emitter is style-free: it records structure (groups, soft breaks,
//! indent regions) and leaves every layout decision to the writer. Each AST
//! node emits a balanced `Group`/`GroupEnd` pair with its comments at the
//! group boundary.

use smol_str::SmolStr;

use super::tokens::{ContainerKind, PrintToken};
use crate::ast::{
    AlterAction, AlterTableStmt, CaseExpr, ColumnConstraint, ColumnDef, CommonTable,
    CreateIndexStmt, CreateTableStmt, DeleteStmt, DistinctClause, FrameBound, FrameUnits,
    FunctionCall, Identifier, InSet, InsertColumns, InsertSource, InsertStmt, IsTarget,
    JoinCondition, JoinKind, LockStrength, MergeInsertAction, MergeMatchedAction, MergeStmt,
    MergeWhenClause, NullsOrder, OrderByClause, OverClause, PatternOp, QualifiedName,
    ReturningClause, ReturningItems, SelectItem, SelectQuery, SetAssignment, SetOperator,
    SimpleSelect, SortDirection, SqlType, Statement, TableAlias, TableConstraint, TableSource,
    UnaryOp, UpdateStmt, Value, ValueKind, ValuesQuery, WindowSpec, WithClause,
};
use crate::lexer::{Comment, LiteralKind};

pub(crate) struct Emitter {
    tokens: Vec<PrintToken>,
}

impl Emitter {
    pub(crate) fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    pub(crate) fn into_tokens(self) -> Vec<PrintToken> {
        self.tokens
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn kw(&mut self, text: &str) {
        self.tokens.push(PrintToken::Keyword(SmolStr::new(text)));
    }

    fn ident(&mut self, identifier: &Identifier) {
        self.tokens.push(PrintToken::Identifier {
            text: identifier.name.clone(),
            quoted: identifier.quoted,
        });
    }

    fn lit(&mut self, text: impl Into<SmolStr>) {
        self.tokens.push(PrintToken::Literal(text.into()));
    }

    fn op(&mut self, text: &str) {
        self.tokens.push(PrintToken::Operator(SmolStr::new(text)));
    }

    fn punct(&mut self, text: &str) {
        self.tokens.push(PrintToken::Punct(SmolStr::new(text)));
    }

    fn soft(&mut self) {
        self.tokens.push(PrintToken::SoftBreak);
    }

    fn group(&mut self, kind: ContainerKind) {
        self.tokens.push(PrintToken::Group(kind));
    }

    fn end(&mut self) {
        self.tokens.push(PrintToken::GroupEnd);
    }

    fn indent_open(&mut self) {
        self.tokens.push(PrintToken::IndentOpen);
    }

    fn indent_close(&mut self) {
        self.tokens.push(PrintToken::IndentClose);
    }

    fn comments(&mut self, comments: &[Comment]) {
        for comment in comments {
            self.tokens.push(PrintToken::Comment {
                text: comment.text.clone(),
                style: comment.style,
            });
        }
    }

    fn comma(&mut self) {
        self.punct(",");
        self.soft();
    }

    fn qname(&mut self, qname: &QualifiedName) {
        for (i, part) in qname.parts.iter().enumerate() {
            if i > 0 {
                self.punct(".");
            }
            self.ident(part);
        }
    }

    fn sql_type(&mut self, data_type: &SqlType) {
        self.kw(&data_type.name);
        if !data_type.args.is_empty() {
            self.group(ContainerKind::FunctionArgList);
            self.punct("(");
            for (i, arg) in data_type.args.iter().enumerate() {
                if i > 0 {
                    self.punct(",");
                }
                self.lit(arg.clone());
            }
            self.punct(")");
            self.end();
        }
        if data_type.array {
            self.punct("[");
            self.punct("]");
        }
    }

    fn table_alias(&mut self, alias: &TableAlias) {
        self.kw("as");
        self.ident(&alias.name);
        if let Some(columns) = &alias.columns {
            self.group(ContainerKind::AliasColumnList);
            self.punct("(");
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    self.punct(",");
                }
                self.ident(column);
            }
            self.punct(")");
            self.end();
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub(crate) fn emit_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Select(query) => self.emit_query(query),
            Statement::Insert(insert) => self.emit_insert(insert),
            Statement::Update(update) => self.emit_update(update),
            Statement::Delete(delete) => self.emit_delete(delete),
            Statement::Merge(merge) => self.emit_merge(merge),
            Statement::CreateTable(create) => self.emit_create_table(create),
            Statement::CreateIndex(create) => self.emit_create_index(create),
            Statement::Alter(alter) => self.emit_alter(alter),
        }
    }

    pub(crate) fn emit_query(&mut self, query: &SelectQuery) {
        match query {
            SelectQuery::Simple(select) => self.emit_simple_select(select),
            SelectQuery::Binary(binary) => {
                self.comments(&binary.comments.leading);
                self.emit_query(&binary.left);
                self.soft();
                match binary.op {
                    SetOperator::Union => self.kw("union"),
                    SetOperator::UnionAll => {
                        self.kw("union");
                        self.kw("all");
                    }
                    SetOperator::Intersect => self.kw("intersect"),
                    SetOperator::IntersectAll => {
                        self.kw("intersect");
                        self.kw("all");
                    }
                    SetOperator::Except => self.kw("except"),
                    SetOperator::ExceptAll => {
                        self.kw("except");
                        self.kw("all");
                    }
                }
                self.soft();
                self.emit_query(&binary.right);
                self.comments(&binary.comments.trailing);
            }
            SelectQuery::Values(values) => self.emit_values_query(values),
        }
    }

    fn emit_simple_select(&mut self, select: &SimpleSelect) {
        self.group(ContainerKind::Statement);
        self.comments(&select.comments.leading);

        if let Some(with) = &select.with_clause {
            self.emit_with_clause(with);
            self.soft();
        }

        self.emit_select_clause(select);

        if let Some(from) = &select.from_clause {
            self.soft();
            self.group(ContainerKind::FromClauseBody);
            self.comments(&from.comments.leading);
            self.kw("from");
            self.indent_open();
            self.soft();
            self.emit_table_source(&from.source);
            self.indent_close();
            self.comments(&from.comments.trailing);
            self.end();
        }
        if let Some(where_clause) = &select.where_clause {
            self.soft();
            self.group(ContainerKind::WhereClauseBody);
            self.comments(&where_clause.comments.leading);
            self.kw("where");
            self.indent_open();
            self.soft();
            self.emit_value(&where_clause.condition);
            self.indent_close();
            self.comments(&where_clause.comments.trailing);
            self.end();
        }
        if let Some(group_by) = &select.group_by_clause {
            self.soft();
            self.group(ContainerKind::GroupByBody);
            self.comments(&group_by.comments.leading);
            self.kw("group");
            self.kw("by");
            self.indent_open();
            self.soft();
            for (i, item) in group_by.items.iter().enumerate() {
                if i > 0 {
                    self.comma();
                }
                self.emit_value(item);
            }
            self.indent_close();
            self.comments(&group_by.comments.trailing);
            self.end();
        }
        if let Some(having) = &select.having_clause {
            self.soft();
            self.group(ContainerKind::HavingBody);
            self.comments(&having.comments.leading);
            self.kw("having");
            self.indent_open();
            self.soft();
            self.emit_value(&having.condition);
            self.indent_close();
            self.comments(&having.comments.trailing);
            self.end();
        }
        if let Some(window) = &select.window_clause {
            self.soft();
            self.group(ContainerKind::WindowBody);
            self.comments(&window.comments.leading);
            self.kw("window");
            for (i, definition) in window.definitions.iter().enumerate() {
                if i > 0 {
                    self.punct(",");
                }
                self.soft();
                self.ident(&definition.name);
                self.kw("as");
                self.emit_window_spec(&definition.spec);
            }
            self.comments(&window.comments.trailing);
            self.end();
        }
        if let Some(qualify) = &select.qualify_clause {
            self.soft();
            self.group(ContainerKind::QualifyBody);
            self.comments(&qualify.comments.leading);
            self.kw("qualify");
            self.indent_open();
            self.soft();
            self.emit_value(&qualify.condition);
            self.indent_close();
            self.comments(&qualify.comments.trailing);
            self.end();
        }
        if let Some(order_by) = &select.order_by_clause {
            self.soft();
            self.emit_order_by(order_by, false);
        }
        if let Some(limit) = &select.limit_clause {
            self.soft();
            self.group(ContainerKind::LimitBody);
            self.comments(&limit.comments.leading);
            self.kw("limit");
            self.emit_value(&limit.value);
            self.comments(&limit.comments.trailing);
            self.end();
        }
        if let Some(offset) = &select.offset_clause {
            self.soft();
            self.group(ContainerKind::LimitBody);
            self.comments(&offset.comments.leading);
            self.kw("offset");
            self.emit_value(&offset.value);
            self.comments(&offset.comments.trailing);
            self.end();
        }
        if let Some(for_clause) = &select.for_clause {
            self.soft();
            self.comments(&for_clause.comments.leading);
            self.kw("for");
            match for_clause.lock {
                LockStrength::Update => self.kw("update"),
                LockStrength::NoKeyUpdate => {
                    self.kw("no");
                    self.kw("key");
                    self.kw("update");
                }
                LockStrength::Share => self.kw("share"),
                LockStrength::KeyShare => {
                    self.kw("key");
                    self.kw("share");
                }
            }
            self.comments(&for_clause.comments.trailing);
        }

        self.comments(&select.comments.trailing);
        self.end();
    }

    fn emit_select_clause(&mut self, select: &SimpleSelect) {
        let clause = &select.select_clause;
        self.group(ContainerKind::SelectClauseBody);
        self.comments(&clause.comments.leading);
        self.kw("select");

        for hint in &clause.hints {
            self.tokens.push(PrintToken::Hint(hint.clone()));
        }

        match &clause.distinct {
            Some(DistinctClause::Distinct) => self.kw("distinct"),
            Some(DistinctClause::DistinctOn(values)) => {
                self.kw("distinct");
                self.kw("on");
                self.group(ContainerKind::TupleBody);
                self.punct("(");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.punct(",");
                    }
                    self.emit_value(value);
                }
                self.punct(")");
                self.end();
            }
            None => {}
        }

        self.group(ContainerKind::SelectItemList);
        self.indent_open();
        self.soft();
        for (i, item) in clause.items.iter().enumerate() {
            if i > 0 {
                self.comma();
            }
            self.emit_select_item(item);
        }
        self.indent_close();
        self.end();

        self.comments(&clause.comments.trailing);
        self.end();
    }

    fn emit_select_item(&mut self, item: &SelectItem) {
        self.group(ContainerKind::SelectItem);
        self.comments(&item.comments.leading);
        self.emit_value(&item.value);
        if let Some(alias) = &item.alias {
            self.kw("as");
            self.ident(alias);
        }
        self.comments(&item.comments.trailing);
        self.end();
    }

    fn emit_with_clause(&mut self, with: &WithClause) {
        self.group(ContainerKind::WithClauseBody);
        self.comments(&with.comments.leading);
        self.kw("with");
        if with.recursive {
            self.kw("recursive");
        }
        self.indent_open();
        self.soft();
        for (i, table) in with.tables.iter().enumerate() {
            if i > 0 {
                self.comma();
            }
            self.emit_common_table(table);
        }
        self.indent_close();
        self.comments(&with.comments.trailing);
        self.end();
    }

    fn emit_common_table(&mut self, table: &CommonTable) {
        self.group(ContainerKind::CommonTableBody);
        self.comments(&table.comments.leading);
        self.ident(&table.alias_expression.table);
        if let Some(columns) = &table.alias_expression.columns {
            self.group(ContainerKind::AliasColumnList);
            self.punct("(");
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    self.punct(",");
                }
                self.ident(column);
            }
            self.punct(")");
            self.end();
        }
        self.kw("as");
        match table.materialized {
            Some(true) => self.kw("materialized"),
            Some(false) => {
                self.kw("not");
                self.kw("materialized");
            }
            None => {}
        }
        self.group(ContainerKind::SubqueryBody);
        self.punct("(");
        self.emit_query(&table.query);
        self.punct(")");
        self.end();
        self.comments(&table.comments.trailing);
        self.end();
    }

    pub(crate) fn emit_values_query(&mut self, values: &ValuesQuery) {
        self.group(ContainerKind::ValuesRowList);
        self.comments(&values.comments.leading);
        self.kw("values");
        self.indent_open();
        self.soft();
        for (i, row) in values.rows.iter().enumerate() {
            if i > 0 {
                self.comma();
            }
            self.group(ContainerKind::ValuesRow);
            self.comments(&row.comments.leading);
            self.punct("(");
            for (j, value) in row.values.iter().enumerate() {
                if j > 0 {
                    self.punct(",");
                }
                self.emit_value(value);
            }
            self.punct(")");
            self.comments(&row.comments.trailing);
            self.end();
        }
        self.indent_close();
        self.comments(&values.comments.trailing);
        self.end();
    }

    fn emit_order_by(&mut self, order_by: &OrderByClause, compact: bool) {
        let kind = if compact {
            ContainerKind::ParenBody
        } else {
            ContainerKind::OrderByBody
        };
        self.group(kind);
        self.comments(&order_by.comments.leading);
        self.kw("order");
        self.kw("by");
        if !compact {
            self.indent_open();
            self.soft();
        }
        for (i, item) in order_by.items.iter().enumerate() {
            if i > 0 {
                self.comma();
            }
            self.comments(&item.comments.leading);
            self.emit_value(&item.value);
            match item.direction {
                Some(SortDirection::Asc) => self.kw("asc"),
                Some(SortDirection::Desc) => self.kw("desc"),
                None => {}
            }
            match item.nulls {
                Some(NullsOrder::First) => {
                    self.kw("nulls");
                    self.kw("first");
                }
                Some(NullsOrder::Last) => {
                    self.kw("nulls");
                    self.kw("last");
                }
                None => {}
            }
            self.comments(&item.comments.trailing);
        }
        if !compact {
            self.indent_close();
        }
        self.comments(&order_by.comments.trailing);
        self.end();
    }

    // =========================================================================
    // Table sources
    // =========================================================================

    fn emit_table_source(&mut self, source: &TableSource) {
        match source {
            TableSource::Base(base) => {
                self.qname(&base.qname);
                if let Some(alias) = &base.alias {
                    self.table_alias(alias);
                }
            }
            TableSource::Derived(derived) => {
                self.group(ContainerKind::SubqueryBody);
                self.punct("(");
                self.emit_query(&derived.query);
                self.punct(")");
                self.end();
                self.table_alias(&derived.alias);
            }
            TableSource::Function(function) => {
                self.emit_function_call(&function.call);
                if let Some(alias) = &function.alias {
                    self.table_alias(alias);
                }
            }
            TableSource::Join(join) => {
                self.emit_table_source(&join.left);
                self.soft();
                self.comments(&join.comments.leading);
                if matches!(join.condition, Some(JoinCondition::Natural)) {
                    self.kw("natural");
                }
                match join.kind {
                    JoinKind::Inner => self.kw("join"),
                    JoinKind::Left => {
                        self.kw("left");
                        self.kw("join");
                    }
                    JoinKind::Right => {
                        self.kw("right");
                        self.kw("join");
                    }
                    JoinKind::Full => {
                        self.kw("full");
                        self.kw("join");
                    }
                    JoinKind::Cross => {
                        if join.condition.is_none() {
                            self.kw("cross");
                        }
                        self.kw("join");
                    }
                }
                self.emit_table_source(&join.right);
                match &join.condition {
                    Some(JoinCondition::On(condition)) => {
                        self.group(ContainerKind::JoinCondition);
                        self.kw("on");
                        self.emit_value(condition);
                        self.end();
                    }
                    Some(JoinCondition::Using(columns)) => {
                        self.kw("using");
                        self.group(ContainerKind::TupleBody);
                        self.punct("(");
                        for (i, column) in columns.iter().enumerate() {
                            if i > 0 {
                                self.punct(",");
                            }
                            self.ident(column);
                        }
                        self.punct(")");
                        self.end();
                    }
                    Some(JoinCondition::Natural) | None => {}
                }
                self.comments(&join.comments.trailing);
            }
            TableSource::Lateral(lateral) => {
                self.kw("lateral");
                self.emit_table_source(&lateral.source);
            }
        }
    }

    // =========================================================================
    // Values
    // =========================================================================

    pub(crate) fn emit_value(&mut self, value: &Value) {
        self.comments(&value.comments.leading);
        match &value.kind {
            ValueKind::Literal(literal) => self.emit_literal(literal),
            ValueKind::Identifier(identifier) => self.ident(identifier),
            ValueKind::Qualified(qname) => self.qname(qname),
            ValueKind::Parameter(param) => {
                self.tokens.push(PrintToken::Param {
                    marker: param.marker,
                    name: param.name.clone(),
                    index: param.index,
                    raw: param.raw.clone(),
                });
            }
            ValueKind::Binary(binary) => {
                self.emit_value(&binary.lhs);
                if binary.op.is_keyword() {
                    self.kw(binary.op.sql());
                } else {
                    self.op(binary.op.sql());
                }
                self.emit_value(&binary.rhs);
            }
            ValueKind::Unary(unary) => {
                match unary.op {
                    UnaryOp::Not => self.kw("not"),
                    UnaryOp::Plus => self.op("+"),
                    UnaryOp::Minus => self.op("-"),
                    UnaryOp::BitNot => self.op("~"),
                }
                self.emit_value(&unary.operand);
            }
            ValueKind::Function(call) => self.emit_function_call(call),
            ValueKind::Case(case) => self.emit_case(case),
            ValueKind::Cast(cast) => {
                if cast.postfix {
                    self.emit_value(&cast.value);
                    self.op("::");
                    self.sql_type(&cast.data_type);
                } else {
                    self.kw("cast");
                    self.group(ContainerKind::FunctionArgList);
                    self.punct("(");
                    self.emit_value(&cast.value);
                    self.kw("as");
                    self.sql_type(&cast.data_type);
                    self.punct(")");
                    self.end();
                }
            }
            ValueKind::Between(between) => {
                self.group(ContainerKind::ParenBody);
                self.emit_value(&between.value);
                if between.negated {
                    self.kw("not");
                }
                self.kw("between");
                self.emit_value(&between.low);
                self.kw("and");
                self.emit_value(&between.high);
                self.end();
            }
            ValueKind::InList(in_expr) => {
                self.emit_value(&in_expr.value);
                if in_expr.negated {
                    self.kw("not");
                }
                self.kw("in");
                self.group(ContainerKind::TupleBody);
                self.punct("(");
                match &in_expr.set {
                    InSet::List(items) => {
                        for (i, item) in items.iter().enumerate() {
                            if i > 0 {
                                self.punct(",");
                            }
                            self.emit_value(item);
                        }
                    }
                    InSet::Subquery(query) => self.emit_query(query),
                }
                self.punct(")");
                self.end();
            }
            ValueKind::PatternMatch(pattern) => {
                self.emit_value(&pattern.value);
                if pattern.negated {
                    self.kw("not");
                }
                match pattern.op {
                    PatternOp::Like => self.kw("like"),
                    PatternOp::ILike => self.kw("ilike"),
                    PatternOp::SimilarTo => {
                        self.kw("similar");
                        self.kw("to");
                    }
                }
                self.emit_value(&pattern.pattern);
                if let Some(escape) = &pattern.escape {
                    self.kw("escape");
                    self.emit_value(escape);
                }
            }
            ValueKind::Is(is_expr) => {
                self.emit_value(&is_expr.value);
                self.kw("is");
                if is_expr.negated {
                    self.kw("not");
                }
                match &is_expr.target {
                    IsTarget::Null => self.kw("null"),
                    IsTarget::True => self.kw("true"),
                    IsTarget::False => self.kw("false"),
                    IsTarget::DistinctFrom(target) => {
                        self.kw("distinct");
                        self.kw("from");
                        self.emit_value(target);
                    }
                }
            }
            ValueKind::Exists(exists) => {
                if exists.negated {
                    self.kw("not");
                }
                self.kw("exists");
                self.group(ContainerKind::SubqueryBody);
                self.punct("(");
                self.emit_query(&exists.query);
                self.punct(")");
                self.end();
            }
            ValueKind::Subquery(query) => {
                self.group(ContainerKind::SubqueryBody);
                self.punct("(");
                self.emit_query(query);
                self.punct(")");
                self.end();
            }
            ValueKind::ArrayAccess(access) => {
                self.emit_value(&access.base);
                self.punct("[");
                self.emit_value(&access.index);
                self.punct("]");
            }
            ValueKind::Tuple(tuple) => {
                self.group(ContainerKind::TupleBody);
                self.punct("(");
                for (i, item) in tuple.items.iter().enumerate() {
                    if i > 0 {
                        self.punct(",");
                    }
                    self.emit_value(item);
                }
                self.punct(")");
                self.end();
            }
            ValueKind::Paren(inner) => {
                self.group(ContainerKind::ParenBody);
                self.punct("(");
                self.emit_value(inner);
                self.punct(")");
                self.end();
            }
            ValueKind::Star(star) => {
                if let Some(qualifier) = &star.qualifier {
                    self.qname(qualifier);
                    self.punct(".");
                }
                self.op("*");
            }
        }
        self.comments(&value.comments.trailing);
    }

    fn emit_literal(&mut self, literal: &crate::ast::Literal) {
        match literal.kind {
            LiteralKind::String => {
                let escaped = literal.text.replace('\'', "''");
                self.lit(format!("'{escaped}'"));
            }
            LiteralKind::Numeric => self.lit(literal.text.clone()),
            // Bare keyword literals flow through keyword casing
            LiteralKind::Boolean | LiteralKind::Null => self.kw(&literal.text),
        }
    }

    fn emit_function_call(&mut self, call: &FunctionCall) {
        self.comments(&call.comments.leading);
        self.qname(&call.qname);
        self.group(ContainerKind::FunctionArgList);
        self.punct("(");
        if call.distinct {
            self.kw("distinct");
        }
        for (i, arg) in call.args.iter().enumerate() {
            if i > 0 {
                self.punct(",");
            }
            self.emit_value(arg);
        }
        if let Some(order_by) = &call.order_by {
            self.emit_order_by(order_by, true);
        }
        self.punct(")");
        self.end();

        if let Some(within_group) = &call.within_group {
            self.kw("within");
            self.kw("group");
            self.group(ContainerKind::ParenBody);
            self.punct("(");
            self.emit_order_by(within_group, true);
            self.punct(")");
            self.end();
        }
        if let Some(filter) = &call.filter {
            self.kw("filter");
            self.group(ContainerKind::ParenBody);
            self.punct("(");
            self.kw("where");
            self.emit_value(filter);
            self.punct(")");
            self.end();
        }
        match &call.over {
            Some(OverClause::Named(name)) => {
                self.kw("over");
                self.ident(name);
            }
            Some(OverClause::Spec(spec)) => {
                self.kw("over");
                self.emit_window_spec(spec);
            }
            None => {}
        }
        self.comments(&call.comments.trailing);
    }

    fn emit_window_spec(&mut self, spec: &WindowSpec) {
        self.group(ContainerKind::WindowSpecBody);
        self.punct("(");
        if !spec.partition_by.is_empty() {
            self.kw("partition");
            self.kw("by");
            for (i, value) in spec.partition_by.iter().enumerate() {
                if i > 0 {
                    self.punct(",");
                }
                self.emit_value(value);
            }
        }
        if let Some(order_by) = &spec.order_by {
            self.emit_order_by(order_by, true);
        }
        if let Some(frame) = &spec.frame {
            match frame.units {
                FrameUnits::Rows => self.kw("rows"),
                FrameUnits::Range => self.kw("range"),
                FrameUnits::Groups => self.kw("groups"),
            }
            if let Some(end) = &frame.end {
                self.kw("between");
                self.emit_frame_bound(&frame.start);
                self.kw("and");
                self.emit_frame_bound(end);
            } else {
                self.emit_frame_bound(&frame.start);
            }
        }
        self.punct(")");
        self.end();
    }

    fn emit_frame_bound(&mut self, bound: &FrameBound) {
        match bound {
            FrameBound::UnboundedPreceding => {
                self.kw("unbounded");
                self.kw("preceding");
            }
            FrameBound::Preceding(value) => {
                self.emit_value(value);
                self.kw("preceding");
            }
            FrameBound::CurrentRow => {
                self.kw("current");
                self.kw("row");
            }
            FrameBound::Following(value) => {
                self.emit_value(value);
                self.kw("following");
            }
            FrameBound::UnboundedFollowing => {
                self.kw("unbounded");
                self.kw("following");
            }
        }
    }

    fn emit_case(&mut self, case: &CaseExpr) {
        self.group(ContainerKind::CaseBody);
        self.kw("case");
        if let Some(operand) = &case.operand {
            self.emit_value(operand);
        }
        self.indent_open();
        for branch in &case.branches {
            self.soft();
            self.comments(&branch.comments.leading);
            self.kw("when");
            self.emit_value(&branch.condition);
            self.kw("then");
            self.emit_value(&branch.result);
            self.comments(&branch.comments.trailing);
        }
        if let Some(else_value) = &case.else_value {
            self.soft();
            self.kw("else");
            self.emit_value(else_value);
        }
        self.indent_close();
        self.soft();
        self.kw("end");
        self.end();
    }

    // =========================================================================
    // DML
    // =========================================================================

    fn emit_insert(&mut self, insert: &InsertStmt) {
        self.group(ContainerKind::Statement);
        self.comments(&insert.comments.leading);
        if let Some(with) = &insert.with_clause {
            self.emit_with_clause(with);
            self.soft();
        }
        self.kw("insert");
        self.kw("into");
        self.qname(&insert.table);
        if let Some(columns) = &insert.columns {
            self.emit_insert_columns(columns);
        }
        self.soft();
        match &insert.source {
            InsertSource::Values(values) => self.emit_values_query(values),
            InsertSource::Query(query) => self.emit_query(query),
            InsertSource::DefaultValues => {
                self.kw("default");
                self.kw("values");
            }
        }
        if let Some(returning) = &insert.returning {
            self.soft();
            self.emit_returning(returning);
        }
        self.comments(&insert.comments.trailing);
        self.end();
    }

    fn emit_insert_columns(&mut self, columns: &InsertColumns) {
        self.group(ContainerKind::InsertColumnList);
        self.comments(&columns.comments.leading);
        self.punct("(");
        self.indent_open();
        self.soft();
        for (i, column) in columns.columns.iter().enumerate() {
            if i > 0 {
                self.comma();
            }
            self.ident(column);
        }
        self.indent_close();
        self.soft();
        self.punct(")");
        self.comments(&columns.comments.trailing);
        self.end();
    }

    fn emit_returning(&mut self, returning: &ReturningClause) {
        self.group(ContainerKind::ReturningBody);
        self.comments(&returning.comments.leading);
        self.kw("returning");
        match &returning.items {
            ReturningItems::Star => self.op("*"),
            ReturningItems::Items(items) => {
                self.indent_open();
                self.soft();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.comma();
                    }
                    self.emit_select_item(item);
                }
                self.indent_close();
            }
        }
        self.comments(&returning.comments.trailing);
        self.end();
    }

    fn emit_update(&mut self, update: &UpdateStmt) {
        self.group(ContainerKind::Statement);
        self.comments(&update.comments.leading);
        if let Some(with) = &update.with_clause {
            self.emit_with_clause(with);
            self.soft();
        }
        self.kw("update");
        self.qname(&update.table);
        if let Some(alias) = &update.alias {
            self.table_alias(alias);
        }
        self.soft();
        self.kw("set");
        self.group(ContainerKind::SetClauseList);
        self.indent_open();
        self.soft();
        for (i, assignment) in update.assignments.iter().enumerate() {
            if i > 0 {
                self.comma();
            }
            self.emit_set_assignment(assignment);
        }
        self.indent_close();
        self.end();
        if let Some(from) = &update.from_clause {
            self.soft();
            self.group(ContainerKind::FromClauseBody);
            self.comments(&from.comments.leading);
            self.kw("from");
            self.emit_table_source(&from.source);
            self.comments(&from.comments.trailing);
            self.end();
        }
        if let Some(where_clause) = &update.where_clause {
            self.soft();
            self.group(ContainerKind::WhereClauseBody);
            self.comments(&where_clause.comments.leading);
            self.kw("where");
            self.indent_open();
            self.soft();
            self.emit_value(&where_clause.condition);
            self.indent_close();
            self.comments(&where_clause.comments.trailing);
            self.end();
        }
        if let Some(returning) = &update.returning {
            self.soft();
            self.emit_returning(returning);
        }
        self.comments(&update.comments.trailing);
        self.end();
    }

    fn emit_set_assignment(&mut self, assignment: &SetAssignment) {
        self.comments(&assignment.comments.leading);
        self.qname(&assignment.column);
        self.op("=");
        self.emit_value(&assignment.value);
        self.comments(&assignment.comments.trailing);
    }

    fn emit_delete(&mut self, delete: &DeleteStmt) {
        self.group(ContainerKind::Statement);
        self.comments(&delete.comments.leading);
        if let Some(with) = &delete.with_clause {
            self.emit_with_clause(with);
            self.soft();
        }
        self.kw("delete");
        self.kw("from");
        self.qname(&delete.table);
        if let Some(alias) = &delete.alias {
            self.table_alias(alias);
        }
        for source in &delete.using {
            self.soft();
            self.kw("using");
            self.emit_table_source(source);
        }
        if let Some(where_clause) = &delete.where_clause {
            self.soft();
            self.group(ContainerKind::WhereClauseBody);
            self.comments(&where_clause.comments.leading);
            self.kw("where");
            self.indent_open();
            self.soft();
            self.emit_value(&where_clause.condition);
            self.indent_close();
            self.comments(&where_clause.comments.trailing);
            self.end();
        }
        if let Some(returning) = &delete.returning {
            self.soft();
            self.emit_returning(returning);
        }
        self.comments(&delete.comments.trailing);
        self.end();
    }

    fn emit_merge(&mut self, merge: &MergeStmt) {
        self.group(ContainerKind::Statement);
        self.comments(&merge.comments.leading);
        if let Some(with) = &merge.with_clause {
            self.emit_with_clause(with);
            self.soft();
        }
        self.kw("merge");
        self.kw("into");
        self.qname(&merge.target);
        if let Some(alias) = &merge.target_alias {
            self.table_alias(alias);
        }
        self.soft();
        self.kw("using");
        self.emit_table_source(&merge.source);
        self.soft();
        self.group(ContainerKind::JoinCondition);
        self.kw("on");
        self.emit_value(&merge.on);
        self.end();

        self.group(ContainerKind::MergeClauseList);
        for clause in &merge.clauses {
            self.soft();
            match clause {
                MergeWhenClause::Matched { condition, action } => {
                    self.kw("when");
                    self.kw("matched");
                    if let Some(condition) = condition {
                        self.kw("and");
                        self.emit_value(condition);
                    }
                    self.kw("then");
                    match action {
                        MergeMatchedAction::Update(assignments) => {
                            self.kw("update");
                            self.kw("set");
                            for (i, assignment) in assignments.iter().enumerate() {
                                if i > 0 {
                                    self.punct(",");
                                }
                                self.emit_set_assignment(assignment);
                            }
                        }
                        MergeMatchedAction::Delete => self.kw("delete"),
                    }
                }
                MergeWhenClause::NotMatched { condition, action } => {
                    self.kw("when");
                    self.kw("not");
                    self.kw("matched");
                    if let Some(condition) = condition {
                        self.kw("and");
                        self.emit_value(condition);
                    }
                    self.kw("then");
                    self.emit_merge_insert(action);
                }
            }
        }
        self.end();

        if let Some(returning) = &merge.returning {
            self.soft();
            self.emit_returning(returning);
        }
        self.comments(&merge.comments.trailing);
        self.end();
    }

    fn emit_merge_insert(&mut self, action: &MergeInsertAction) {
        self.kw("insert");
        if let Some(columns) = &action.columns {
            self.group(ContainerKind::InsertColumnList);
            self.punct("(");
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    self.punct(",");
                }
                self.ident(column);
            }
            self.punct(")");
            self.end();
        }
        self.kw("values");
        self.group(ContainerKind::ValuesRow);
        self.punct("(");
        for (i, value) in action.values.iter().enumerate() {
            if i > 0 {
                self.punct(",");
            }
            self.emit_value(value);
        }
        self.punct(")");
        self.end();
    }

    // =========================================================================
    // DDL
    // =========================================================================

    fn emit_create_table(&mut self, create: &CreateTableStmt) {
        self.group(ContainerKind::Statement);
        self.comments(&create.comments.leading);
        self.kw("create");
        self.kw("table");
        if create.if_not_exists {
            self.kw("if");
            self.kw("not");
            self.kw("exists");
        }
        self.qname(&create.name);
        self.group(ContainerKind::ColumnDefList);
        self.punct("(");
        self.indent_open();
        self.soft();
        let mut first = true;
        for column in &create.columns {
            if !first {
                self.comma();
            }
            first = false;
            self.emit_column_def(column);
        }
        for constraint in &create.constraints {
            if !first {
                self.comma();
            }
            first = false;
            self.emit_table_constraint(constraint);
        }
        self.indent_close();
        self.soft();
        self.punct(")");
        self.end();
        self.comments(&create.comments.trailing);
        self.end();
    }

    fn emit_column_def(&mut self, column: &ColumnDef) {
        self.comments(&column.comments.leading);
        self.ident(&column.name);
        self.sql_type(&column.data_type);
        for constraint in &column.constraints {
            match constraint {
                ColumnConstraint::NotNull => {
                    self.kw("not");
                    self.kw("null");
                }
                ColumnConstraint::Null => self.kw("null"),
                ColumnConstraint::PrimaryKey => {
                    self.kw("primary");
                    self.kw("key");
                }
                ColumnConstraint::Unique => self.kw("unique"),
                ColumnConstraint::Default(value) => {
                    self.kw("default");
                    self.emit_value(value);
                }
                ColumnConstraint::Check(predicate) => {
                    self.kw("check");
                    self.group(ContainerKind::ParenBody);
                    self.punct("(");
                    self.emit_value(predicate);
                    self.punct(")");
                    self.end();
                }
                ColumnConstraint::References { table, columns } => {
                    self.kw("references");
                    self.qname(table);
                    if !columns.is_empty() {
                        self.group(ContainerKind::TupleBody);
                        self.punct("(");
                        for (i, column) in columns.iter().enumerate() {
                            if i > 0 {
                                self.punct(",");
                            }
                            self.ident(column);
                        }
                        self.punct(")");
                        self.end();
                    }
                }
            }
        }
        self.comments(&column.comments.trailing);
    }

    fn emit_table_constraint(&mut self, constraint: &TableConstraint) {
        if let Some(name) = constraint.name() {
            self.kw("constraint");
            self.ident(name);
        }
        match constraint {
            TableConstraint::PrimaryKey { columns, .. } => {
                self.kw("primary");
                self.kw("key");
                self.ident_tuple(columns);
            }
            TableConstraint::Unique { columns, .. } => {
                self.kw("unique");
                self.ident_tuple(columns);
            }
            TableConstraint::ForeignKey {
                columns,
                ref_table,
                ref_columns,
                ..
            } => {
                self.kw("foreign");
                self.kw("key");
                self.ident_tuple(columns);
                self.kw("references");
                self.qname(ref_table);
                if !ref_columns.is_empty() {
                    self.ident_tuple(ref_columns);
                }
            }
            TableConstraint::Check { predicate, .. } => {
                self.kw("check");
                self.group(ContainerKind::ParenBody);
                self.punct("(");
                self.emit_value(predicate);
                self.punct(")");
                self.end();
            }
        }
    }

    fn ident_tuple(&mut self, columns: &[Identifier]) {
        self.group(ContainerKind::TupleBody);
        self.punct("(");
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                self.punct(",");
            }
            self.ident(column);
        }
        self.punct(")");
        self.end();
    }

    fn emit_create_index(&mut self, create: &CreateIndexStmt) {
        self.group(ContainerKind::Statement);
        self.comments(&create.comments.leading);
        self.kw("create");
        if create.unique {
            self.kw("unique");
        }
        self.kw("index");
        if create.if_not_exists {
            self.kw("if");
            self.kw("not");
            self.kw("exists");
        }
        self.ident(&create.name);
        self.kw("on");
        self.qname(&create.table);
        if let Some(method) = &create.method {
            self.kw("using");
            self.ident(method);
        }
        self.group(ContainerKind::IndexColumnList);
        self.punct("(");
        for (i, column) in create.columns.iter().enumerate() {
            if i > 0 {
                self.punct(",");
            }
            self.emit_value(&column.value);
            match column.direction {
                Some(SortDirection::Asc) => self.kw("asc"),
                Some(SortDirection::Desc) => self.kw("desc"),
                None => {}
            }
            match column.nulls {
                Some(NullsOrder::First) => {
                    self.kw("nulls");
                    self.kw("first");
                }
                Some(NullsOrder::Last) => {
                    self.kw("nulls");
                    self.kw("last");
                }
                None => {}
            }
        }
        self.punct(")");
        self.end();
        self.comments(&create.comments.trailing);
        self.end();
    }

    fn emit_alter(&mut self, alter: &AlterTableStmt) {
        self.group(ContainerKind::Statement);
        self.comments(&alter.comments.leading);
        self.kw("alter");
        self.kw("table");
        self.qname(&alter.table);
        match &alter.action {
            AlterAction::AddColumn(column) => {
                self.kw("add");
                self.kw("column");
                self.emit_column_def(column);
            }
            AlterAction::DropColumn(column) => {
                self.kw("drop");
                self.kw("column");
                self.ident(column);
            }
            AlterAction::AddConstraint(constraint) => {
                self.kw("add");
                self.emit_table_constraint(constraint);
            }
            AlterAction::DropConstraint(name) => {
                self.kw("drop");
                self.kw("constraint");
                self.ident(name);
            }
            AlterAction::AlterColumnType { column, data_type } => {
                self.kw("alter");
                self.kw("column");
                self.ident(column);
                self.kw("type");
                self.sql_type(data_type);
            }
            AlterAction::SetNotNull(column) => {
                self.kw("alter");
                self.kw("column");
                self.ident(column);
                self.kw("set");
                self.kw("not");
                self.kw("null");
            }
            AlterAction::DropNotNull(column) => {
                self.kw("alter");
                self.kw("column");
                self.ident(column);
                self.kw("drop");
                self.kw("not");
                self.kw("null");
            }
            AlterAction::SetDefault { column, value } => {
                self.kw("alter");
                self.kw("column");
                self.ident(column);
                self.kw("set");
                self.kw("default");
                self.emit_value(value);
            }
            AlterAction::DropDefault(column) => {
                self.kw("alter");
                self.kw("column");
                self.ident(column);
                self.kw("drop");
                self.kw("default");
            }
            AlterAction::RenameColumn { from, to } => {
                self.kw("rename");
                self.kw("column");
                self.ident(from);
                self.kw("to");
                self.ident(to);
            }
        }
        self.comments(&alter.comments.trailing);
        self.end();
    }
}
