//! Uniform traversal over AST comment slots
//!
//! The comment editor and the counting/search operations all run off this
//! dispatch. A node kind gains comment support by being added here, in
//! exactly one place; the macro expands the traversal in shared (`&`) and
//! mutable (`&mut`) forms so the two walkers can never drift apart.
//!
//! Visit order is parent-first, then children in source order.

use super::comments::NodeComments;
use super::ddl::{AlterAction, ColumnConstraint, TableConstraint};
use super::dml::{InsertSource, MergeMatchedAction, MergeWhenClause, ReturningItems};
use super::select::{
    DistinctClause, JoinCondition, SelectQuery, TableSource,
};
use super::statement::Statement;
use super::value::{FrameBound, InSet, IsTarget, OverClause, ValueKind};

macro_rules! define_walkers {
    (
        $walk_statement:ident, $walk_query:ident, $walk_simple:ident, $walk_with:ident,
        $walk_source:ident, $walk_function:ident, $walk_order_by:ident, $walk_values:ident,
        $walk_returning:ident, $walk_assignments:ident, $walk_value:ident,
        $($mut_:tt)?
    ) => {
        /// Visit every comment slot reachable from the statement
        pub fn $walk_statement(
            stmt: & $($mut_)? Statement,
            f: &mut impl FnMut(&'static str, & $($mut_)? NodeComments),
        ) {
            match stmt {
                Statement::Select(query) => $walk_query(query, f),
                Statement::Insert(insert) => {
                    f("InsertStatement", & $($mut_)? insert.comments);
                    if let Some(with) = & $($mut_)? insert.with_clause {
                        $walk_with(with, f);
                    }
                    if let Some(columns) = & $($mut_)? insert.columns {
                        f("InsertColumns", & $($mut_)? columns.comments);
                    }
                    match & $($mut_)? insert.source {
                        InsertSource::Values(values) => $walk_values(values, f),
                        InsertSource::Query(query) => $walk_query(query, f),
                        InsertSource::DefaultValues => {}
                    }
                    if let Some(returning) = & $($mut_)? insert.returning {
                        $walk_returning(returning, f);
                    }
                }
                Statement::Update(update) => {
                    f("UpdateStatement", & $($mut_)? update.comments);
                    if let Some(with) = & $($mut_)? update.with_clause {
                        $walk_with(with, f);
                    }
                    $walk_assignments(& $($mut_)? update.assignments, f);
                    if let Some(from) = & $($mut_)? update.from_clause {
                        f("FromClause", & $($mut_)? from.comments);
                        $walk_source(& $($mut_)? from.source, f);
                    }
                    if let Some(where_clause) = & $($mut_)? update.where_clause {
                        f("WhereClause", & $($mut_)? where_clause.comments);
                        $walk_value(& $($mut_)? where_clause.condition, f);
                    }
                    if let Some(returning) = & $($mut_)? update.returning {
                        $walk_returning(returning, f);
                    }
                }
                Statement::Delete(delete) => {
                    f("DeleteStatement", & $($mut_)? delete.comments);
                    if let Some(with) = & $($mut_)? delete.with_clause {
                        $walk_with(with, f);
                    }
                    for source in & $($mut_)? delete.using {
                        $walk_source(source, f);
                    }
                    if let Some(where_clause) = & $($mut_)? delete.where_clause {
                        f("WhereClause", & $($mut_)? where_clause.comments);
                        $walk_value(& $($mut_)? where_clause.condition, f);
                    }
                    if let Some(returning) = & $($mut_)? delete.returning {
                        $walk_returning(returning, f);
                    }
                }
                Statement::Merge(merge) => {
                    f("MergeStatement", & $($mut_)? merge.comments);
                    if let Some(with) = & $($mut_)? merge.with_clause {
                        $walk_with(with, f);
                    }
                    $walk_source(& $($mut_)? merge.source, f);
                    $walk_value(& $($mut_)? merge.on, f);
                    for clause in & $($mut_)? merge.clauses {
                        match clause {
                            MergeWhenClause::Matched { condition, action } => {
                                if let Some(condition) = condition {
                                    $walk_value(condition, f);
                                }
                                match action {
                                    MergeMatchedAction::Update(assignments) => {
                                        $walk_assignments(assignments, f)
                                    }
                                    MergeMatchedAction::Delete => {}
                                }
                            }
                            MergeWhenClause::NotMatched { condition, action } => {
                                if let Some(condition) = condition {
                                    $walk_value(condition, f);
                                }
                                for value in & $($mut_)? action.values {
                                    $walk_value(value, f);
                                }
                            }
                        }
                    }
                    if let Some(returning) = & $($mut_)? merge.returning {
                        $walk_returning(returning, f);
                    }
                }
                Statement::CreateTable(create) => {
                    f("CreateTableStatement", & $($mut_)? create.comments);
                    for column in & $($mut_)? create.columns {
                        f("ColumnDef", & $($mut_)? column.comments);
                        for constraint in & $($mut_)? column.constraints {
                            match constraint {
                                ColumnConstraint::Default(value)
                                | ColumnConstraint::Check(value) => $walk_value(value, f),
                                _ => {}
                            }
                        }
                    }
                    for constraint in & $($mut_)? create.constraints {
                        if let TableConstraint::Check { predicate, .. } = constraint {
                            $walk_value(predicate, f);
                        }
                    }
                }
                Statement::CreateIndex(create) => {
                    f("CreateIndexStatement", & $($mut_)? create.comments);
                    for column in & $($mut_)? create.columns {
                        $walk_value(& $($mut_)? column.value, f);
                    }
                }
                Statement::Alter(alter) => {
                    f("AlterTableStatement", & $($mut_)? alter.comments);
                    match & $($mut_)? alter.action {
                        AlterAction::AddColumn(column) => {
                            f("ColumnDef", & $($mut_)? column.comments);
                            for constraint in & $($mut_)? column.constraints {
                                match constraint {
                                    ColumnConstraint::Default(value)
                                    | ColumnConstraint::Check(value) => $walk_value(value, f),
                                    _ => {}
                                }
                            }
                        }
                        AlterAction::AddConstraint(constraint) => {
                            if let TableConstraint::Check { predicate, .. } = constraint {
                                $walk_value(predicate, f);
                            }
                        }
                        AlterAction::SetDefault { value, .. } => $walk_value(value, f),
                        _ => {}
                    }
                }
            }
        }

        /// Visit every comment slot reachable from a query expression
        pub fn $walk_query(
            query: & $($mut_)? SelectQuery,
            f: &mut impl FnMut(&'static str, & $($mut_)? NodeComments),
        ) {
            match query {
                SelectQuery::Simple(select) => $walk_simple(select, f),
                SelectQuery::Binary(binary) => {
                    f("BinarySelect", & $($mut_)? binary.comments);
                    $walk_query(& $($mut_)? binary.left, f);
                    $walk_query(& $($mut_)? binary.right, f);
                }
                SelectQuery::Values(values) => $walk_values(values, f),
            }
        }

        fn $walk_simple(
            select: & $($mut_)? super::select::SimpleSelect,
            f: &mut impl FnMut(&'static str, & $($mut_)? NodeComments),
        ) {
            f("SimpleSelect", & $($mut_)? select.comments);
            if let Some(with) = & $($mut_)? select.with_clause {
                $walk_with(with, f);
            }
            f("SelectClause", & $($mut_)? select.select_clause.comments);
            if let Some(DistinctClause::DistinctOn(values)) =
                & $($mut_)? select.select_clause.distinct
            {
                for value in values {
                    $walk_value(value, f);
                }
            }
            for item in & $($mut_)? select.select_clause.items {
                f("SelectItem", & $($mut_)? item.comments);
                $walk_value(& $($mut_)? item.value, f);
            }
            if let Some(from) = & $($mut_)? select.from_clause {
                f("FromClause", & $($mut_)? from.comments);
                $walk_source(& $($mut_)? from.source, f);
            }
            if let Some(where_clause) = & $($mut_)? select.where_clause {
                f("WhereClause", & $($mut_)? where_clause.comments);
                $walk_value(& $($mut_)? where_clause.condition, f);
            }
            if let Some(group_by) = & $($mut_)? select.group_by_clause {
                f("GroupByClause", & $($mut_)? group_by.comments);
                for item in & $($mut_)? group_by.items {
                    $walk_value(item, f);
                }
            }
            if let Some(having) = & $($mut_)? select.having_clause {
                f("HavingClause", & $($mut_)? having.comments);
                $walk_value(& $($mut_)? having.condition, f);
            }
            if let Some(window) = & $($mut_)? select.window_clause {
                f("WindowClause", & $($mut_)? window.comments);
                for definition in & $($mut_)? window.definitions {
                    f("WindowDefinition", & $($mut_)? definition.comments);
                    for value in & $($mut_)? definition.spec.partition_by {
                        $walk_value(value, f);
                    }
                    if let Some(order_by) = & $($mut_)? definition.spec.order_by {
                        $walk_order_by(order_by, f);
                    }
                }
            }
            if let Some(qualify) = & $($mut_)? select.qualify_clause {
                f("QualifyClause", & $($mut_)? qualify.comments);
                $walk_value(& $($mut_)? qualify.condition, f);
            }
            if let Some(order_by) = & $($mut_)? select.order_by_clause {
                $walk_order_by(order_by, f);
            }
            if let Some(limit) = & $($mut_)? select.limit_clause {
                f("LimitClause", & $($mut_)? limit.comments);
                $walk_value(& $($mut_)? limit.value, f);
            }
            if let Some(offset) = & $($mut_)? select.offset_clause {
                f("OffsetClause", & $($mut_)? offset.comments);
                $walk_value(& $($mut_)? offset.value, f);
            }
            if let Some(for_clause) = & $($mut_)? select.for_clause {
                f("ForClause", & $($mut_)? for_clause.comments);
            }
        }

        fn $walk_with(
            with: & $($mut_)? super::select::WithClause,
            f: &mut impl FnMut(&'static str, & $($mut_)? NodeComments),
        ) {
            f("WithClause", & $($mut_)? with.comments);
            for table in & $($mut_)? with.tables {
                f("CommonTable", & $($mut_)? table.comments);
                $walk_query(& $($mut_)? table.query, f);
            }
        }

        fn $walk_source(
            source: & $($mut_)? TableSource,
            f: &mut impl FnMut(&'static str, & $($mut_)? NodeComments),
        ) {
            match source {
                TableSource::Base(_) => {}
                TableSource::Derived(derived) => $walk_query(& $($mut_)? derived.query, f),
                TableSource::Function(function) => $walk_function(& $($mut_)? function.call, f),
                TableSource::Join(join) => {
                    f("JoinSource", & $($mut_)? join.comments);
                    $walk_source(& $($mut_)? join.left, f);
                    $walk_source(& $($mut_)? join.right, f);
                    if let Some(JoinCondition::On(condition)) = & $($mut_)? join.condition {
                        $walk_value(condition, f);
                    }
                }
                TableSource::Lateral(lateral) => $walk_source(& $($mut_)? lateral.source, f),
            }
        }

        fn $walk_function(
            call: & $($mut_)? super::value::FunctionCall,
            f: &mut impl FnMut(&'static str, & $($mut_)? NodeComments),
        ) {
            f("FunctionCall", & $($mut_)? call.comments);
            for arg in & $($mut_)? call.args {
                $walk_value(arg, f);
            }
            if let Some(order_by) = & $($mut_)? call.order_by {
                $walk_order_by(order_by, f);
            }
            if let Some(within_group) = & $($mut_)? call.within_group {
                $walk_order_by(within_group, f);
            }
            if let Some(filter) = & $($mut_)? call.filter {
                $walk_value(filter, f);
            }
            match & $($mut_)? call.over {
                Some(OverClause::Spec(spec)) => {
                    for value in & $($mut_)? spec.partition_by {
                        $walk_value(value, f);
                    }
                    if let Some(order_by) = & $($mut_)? spec.order_by {
                        $walk_order_by(order_by, f);
                    }
                    if let Some(frame) = & $($mut_)? spec.frame {
                        for bound in [& $($mut_)? frame.start]
                            .into_iter()
                            .chain((& $($mut_)? frame.end).into_iter())
                        {
                            match bound {
                                FrameBound::Preceding(value)
                                | FrameBound::Following(value) => $walk_value(value, f),
                                _ => {}
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        fn $walk_order_by(
            order_by: & $($mut_)? super::select::OrderByClause,
            f: &mut impl FnMut(&'static str, & $($mut_)? NodeComments),
        ) {
            f("OrderByClause", & $($mut_)? order_by.comments);
            for item in & $($mut_)? order_by.items {
                f("OrderByItem", & $($mut_)? item.comments);
                $walk_value(& $($mut_)? item.value, f);
            }
        }

        fn $walk_values(
            values: & $($mut_)? super::select::ValuesQuery,
            f: &mut impl FnMut(&'static str, & $($mut_)? NodeComments),
        ) {
            f("ValuesQuery", & $($mut_)? values.comments);
            for row in & $($mut_)? values.rows {
                f("ValuesRow", & $($mut_)? row.comments);
                for value in & $($mut_)? row.values {
                    $walk_value(value, f);
                }
            }
        }

        fn $walk_returning(
            returning: & $($mut_)? super::dml::ReturningClause,
            f: &mut impl FnMut(&'static str, & $($mut_)? NodeComments),
        ) {
            f("ReturningClause", & $($mut_)? returning.comments);
            if let ReturningItems::Items(items) = & $($mut_)? returning.items {
                for item in items {
                    f("SelectItem", & $($mut_)? item.comments);
                    $walk_value(& $($mut_)? item.value, f);
                }
            }
        }

        fn $walk_assignments(
            assignments: & $($mut_)? Vec<super::dml::SetAssignment>,
            f: &mut impl FnMut(&'static str, & $($mut_)? NodeComments),
        ) {
            for assignment in assignments {
                f("SetAssignment", & $($mut_)? assignment.comments);
                $walk_value(& $($mut_)? assignment.value, f);
            }
        }

        /// Visit a value's own slot, then its children
        pub fn $walk_value(
            value: & $($mut_)? super::value::Value,
            f: &mut impl FnMut(&'static str, & $($mut_)? NodeComments),
        ) {
            f("Value", & $($mut_)? value.comments);
            match & $($mut_)? value.kind {
                ValueKind::Literal(_)
                | ValueKind::Identifier(_)
                | ValueKind::Qualified(_)
                | ValueKind::Parameter(_)
                | ValueKind::Star(_) => {}
                ValueKind::Binary(binary) => {
                    $walk_value(& $($mut_)? binary.lhs, f);
                    $walk_value(& $($mut_)? binary.rhs, f);
                }
                ValueKind::Unary(unary) => $walk_value(& $($mut_)? unary.operand, f),
                ValueKind::Function(call) => $walk_function(call, f),
                ValueKind::Case(case) => {
                    if let Some(operand) = & $($mut_)? case.operand {
                        $walk_value(operand, f);
                    }
                    for branch in & $($mut_)? case.branches {
                        f("CaseBranch", & $($mut_)? branch.comments);
                        $walk_value(& $($mut_)? branch.condition, f);
                        $walk_value(& $($mut_)? branch.result, f);
                    }
                    if let Some(else_value) = & $($mut_)? case.else_value {
                        $walk_value(else_value, f);
                    }
                }
                ValueKind::Cast(cast) => $walk_value(& $($mut_)? cast.value, f),
                ValueKind::Between(between) => {
                    $walk_value(& $($mut_)? between.value, f);
                    $walk_value(& $($mut_)? between.low, f);
                    $walk_value(& $($mut_)? between.high, f);
                }
                ValueKind::InList(in_expr) => {
                    $walk_value(& $($mut_)? in_expr.value, f);
                    match & $($mut_)? in_expr.set {
                        InSet::List(items) => {
                            for item in items {
                                $walk_value(item, f);
                            }
                        }
                        InSet::Subquery(query) => $walk_query(query, f),
                    }
                }
                ValueKind::PatternMatch(pattern) => {
                    $walk_value(& $($mut_)? pattern.value, f);
                    $walk_value(& $($mut_)? pattern.pattern, f);
                    if let Some(escape) = & $($mut_)? pattern.escape {
                        $walk_value(escape, f);
                    }
                }
                ValueKind::Is(is_expr) => {
                    $walk_value(& $($mut_)? is_expr.value, f);
                    if let IsTarget::DistinctFrom(target) = & $($mut_)? is_expr.target {
                        $walk_value(target, f);
                    }
                }
                ValueKind::Exists(exists) => $walk_query(& $($mut_)? exists.query, f),
                ValueKind::Subquery(query) => $walk_query(query, f),
                ValueKind::ArrayAccess(access) => {
                    $walk_value(& $($mut_)? access.base, f);
                    $walk_value(& $($mut_)? access.index, f);
                }
                ValueKind::Tuple(tuple) => {
                    for item in & $($mut_)? tuple.items {
                        $walk_value(item, f);
                    }
                }
                ValueKind::Paren(inner) => $walk_value(inner, f),
            }
        }
    };
}

define_walkers!(
    for_each_comments,
    for_each_query_comments,
    walk_simple_select,
    walk_with,
    walk_table_source,
    walk_function,
    walk_order_by,
    walk_values,
    walk_returning,
    walk_assignments,
    for_each_value_comments,
);

define_walkers!(
    for_each_comments_mut,
    for_each_query_comments_mut,
    walk_simple_select_mut,
    walk_with_mut,
    walk_table_source_mut,
    walk_function_mut,
    walk_order_by_mut,
    walk_values_mut,
    walk_returning_mut,
    walk_assignments_mut,
    for_each_value_comments_mut,
    mut
);

/// Total number of comments owned by nodes under the statement
pub fn count_comments(stmt: &Statement) -> usize {
    let mut count = 0;
    for_each_comments(stmt, &mut |_, comments| count += comments.len());
    count
}

/// Total number of comments owned by nodes under a query
pub fn count_query_comments(query: &SelectQuery) -> usize {
    let mut count = 0;
    for_each_query_comments(query, &mut |_, comments| count += comments.len());
    count
}
