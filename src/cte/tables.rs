//! Table source collection
//!
//! Walks a query and returns every base-table reference, descending into
//! subqueries, joins, and value expressions. With `include_ctes = false`,
//! references that resolve to a CTE visible in an enclosing WITH scope are
//! filtered out.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::ast::{
    FunctionCall, InSet, InsertSource, IsTarget, OverClause, SelectQuery, SimpleSelect, Statement,
    TableSource, Value, ValueKind,
};

/// Collects the table sources a query reads
pub struct TableSourceCollector {
    include_ctes: bool,
}

impl TableSourceCollector {
    pub fn new(include_ctes: bool) -> Self {
        Self { include_ctes }
    }

    /// Every base-table reference in the query, in discovery order,
    /// deduplicated case-insensitively.
    pub fn collect(&self, query: &SelectQuery) -> Vec<SmolStr> {
        let mut found = Vec::new();
        let mut seen = FxHashSet::default();
        let mut scope = Vec::new();
        self.walk_query(query, &mut scope, &mut |name| {
            let folded = fold(&name);
            if seen.insert(folded) {
                found.push(name);
            }
        });
        found
    }

    /// Table references of a whole statement (DML targets excluded).
    pub fn collect_statement(&self, statement: &Statement) -> Vec<SmolStr> {
        match statement {
            Statement::Select(query) => self.collect(query),
            Statement::Insert(insert) => match &insert.source {
                InsertSource::Query(query) => self.collect(query),
                InsertSource::Values(_) | InsertSource::DefaultValues => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn walk_query(
        &self,
        query: &SelectQuery,
        scope: &mut Vec<SmolStr>,
        f: &mut impl FnMut(SmolStr),
    ) {
        match query {
            SelectQuery::Simple(select) => self.walk_simple(select, scope, f),
            SelectQuery::Binary(binary) => {
                self.walk_query(&binary.left, scope, f);
                self.walk_query(&binary.right, scope, f);
            }
            SelectQuery::Values(values) => {
                for row in &values.rows {
                    for value in &row.values {
                        self.walk_value(value, scope, f);
                    }
                }
            }
        }
    }

    fn walk_simple(
        &self,
        select: &SimpleSelect,
        scope: &mut Vec<SmolStr>,
        f: &mut impl FnMut(SmolStr),
    ) {
        let scope_base = scope.len();
        if let Some(with) = &select.with_clause {
            for table in &with.tables {
                // A CTE body sees previously defined siblings (and itself
                // when recursive)
                if with.recursive {
                    scope.push(fold(table.name()));
                    self.walk_query(&table.query, scope, f);
                } else {
                    self.walk_query(&table.query, scope, f);
                    scope.push(fold(table.name()));
                }
            }
        }

        for item in &select.select_clause.items {
            self.walk_value(&item.value, scope, f);
        }
        if let Some(from) = &select.from_clause {
            self.walk_source(&from.source, scope, f);
        }
        if let Some(where_clause) = &select.where_clause {
            self.walk_value(&where_clause.condition, scope, f);
        }
        if let Some(having) = &select.having_clause {
            self.walk_value(&having.condition, scope, f);
        }
        if let Some(qualify) = &select.qualify_clause {
            self.walk_value(&qualify.condition, scope, f);
        }

        scope.truncate(scope_base);
    }

    fn walk_source(
        &self,
        source: &TableSource,
        scope: &mut Vec<SmolStr>,
        f: &mut impl FnMut(SmolStr),
    ) {
        match source {
            TableSource::Base(base) => {
                let name = SmolStr::new(base.qname.to_string());
                let is_cte = base.qname.parts.len() == 1
                    && scope.contains(&fold(&base.qname.name().name));
                if self.include_ctes || !is_cte {
                    f(name);
                }
            }
            TableSource::Derived(derived) => self.walk_query(&derived.query, scope, f),
            TableSource::Function(function) => self.walk_call(&function.call, scope, f),
            TableSource::Join(join) => {
                self.walk_source(&join.left, scope, f);
                self.walk_source(&join.right, scope, f);
                if let Some(crate::ast::JoinCondition::On(condition)) = &join.condition {
                    self.walk_value(condition, scope, f);
                }
            }
            TableSource::Lateral(lateral) => self.walk_source(&lateral.source, scope, f),
        }
    }

    fn walk_value(&self, value: &Value, scope: &mut Vec<SmolStr>, f: &mut impl FnMut(SmolStr)) {
        match &value.kind {
            ValueKind::Subquery(query) => self.walk_query(query, scope, f),
            ValueKind::Exists(exists) => self.walk_query(&exists.query, scope, f),
            ValueKind::InList(in_expr) => {
                self.walk_value(&in_expr.value, scope, f);
                match &in_expr.set {
                    InSet::List(items) => {
                        for item in items {
                            self.walk_value(item, scope, f);
                        }
                    }
                    InSet::Subquery(query) => self.walk_query(query, scope, f),
                }
            }
            ValueKind::Binary(binary) => {
                self.walk_value(&binary.lhs, scope, f);
                self.walk_value(&binary.rhs, scope, f);
            }
            ValueKind::Unary(unary) => self.walk_value(&unary.operand, scope, f),
            ValueKind::Function(call) => self.walk_call(call, scope, f),
            ValueKind::Case(case) => {
                if let Some(operand) = &case.operand {
                    self.walk_value(operand, scope, f);
                }
                for branch in &case.branches {
                    self.walk_value(&branch.condition, scope, f);
                    self.walk_value(&branch.result, scope, f);
                }
                if let Some(else_value) = &case.else_value {
                    self.walk_value(else_value, scope, f);
                }
            }
            ValueKind::Cast(cast) => self.walk_value(&cast.value, scope, f),
            ValueKind::Between(between) => {
                self.walk_value(&between.value, scope, f);
                self.walk_value(&between.low, scope, f);
                self.walk_value(&between.high, scope, f);
            }
            ValueKind::PatternMatch(pattern) => {
                self.walk_value(&pattern.value, scope, f);
                self.walk_value(&pattern.pattern, scope, f);
                if let Some(escape) = &pattern.escape {
                    self.walk_value(escape, scope, f);
                }
            }
            ValueKind::Is(is_expr) => {
                self.walk_value(&is_expr.value, scope, f);
                if let IsTarget::DistinctFrom(target) = &is_expr.target {
                    self.walk_value(target, scope, f);
                }
            }
            ValueKind::ArrayAccess(access) => {
                self.walk_value(&access.base, scope, f);
                self.walk_value(&access.index, scope, f);
            }
            ValueKind::Tuple(tuple) => {
                for item in &tuple.items {
                    self.walk_value(item, scope, f);
                }
            }
            ValueKind::Paren(inner) => self.walk_value(inner, scope, f),
            ValueKind::Literal(_)
            | ValueKind::Identifier(_)
            | ValueKind::Qualified(_)
            | ValueKind::Parameter(_)
            | ValueKind::Star(_) => {}
        }
    }

    fn walk_call(&self, call: &FunctionCall, scope: &mut Vec<SmolStr>, f: &mut impl FnMut(SmolStr)) {
        for arg in &call.args {
            self.walk_value(arg, scope, f);
        }
        if let Some(filter) = &call.filter {
            self.walk_value(filter, scope, f);
        }
        if let Some(OverClause::Spec(spec)) = &call.over {
            for value in &spec.partition_by {
                self.walk_value(value, scope, f);
            }
        }
    }
}

/// Case-fold a name for scope comparison
pub(crate) fn fold(name: &str) -> SmolStr {
    SmolStr::new(name.to_ascii_lowercase())
}
