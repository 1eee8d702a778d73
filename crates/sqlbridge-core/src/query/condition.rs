//! The WHERE / HAVING condition engine.
//!
//! Conditions accumulate as an ordered entry list — predicates plus
//! group boundary markers — and render to SQL text while registering
//! bound parameters in the parameter table of the outermost query.
//! Insertion order is rendering order.
//!
//! Grouping is explicit: `begin_and`/`begin_or` push a parenthesized
//! group whose boolean operator joins the entries inside it, and
//! `close_group` (or the `close_and`/`close_or` aliases) pops it. The
//! caller holds the query builder and the condition set as two separate
//! handles, so every method here simply returns `&mut Self`.
//!
//! Balanced groups are the caller's responsibility; an unterminated
//! group renders unbalanced SQL that the backend will reject at
//! prepare time.

use crate::dialect::Dialect;
use crate::params::{argument_name, ParamTable};
use crate::value::{ToValue, Value};

/// Parameter name prefix for condition arguments.
const ARG_PREFIX: &str = ":__";

/// Boolean operator joining the entries of a condition group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    /// AND conjunction (the default between ungrouped entries).
    And,
    /// OR disjunction.
    Or,
}

impl BoolOp {
    const fn as_sql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// The right-hand side of a condition.
///
/// Almost always a bound value; [`ColumnRef`](Self::ColumnRef) instead
/// renders an escaped identifier and bypasses parameter binding
/// entirely — the channel used by correlated sub-selects to compare an
/// inner column against one of the outer query.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    /// A value bound through the parameter table.
    Bound(Value),
    /// A possibly qualified column name, rendered as an escaped
    /// identifier instead of a parameter.
    ColumnRef(String),
}

impl<T: ToValue> From<T> for ConditionValue {
    fn from(value: T) -> Self {
        Self::Bound(value.to_value())
    }
}

/// Shorthand for [`ConditionValue::ColumnRef`].
#[must_use]
pub fn column_ref(name: impl Into<String>) -> ConditionValue {
    ConditionValue::ColumnRef(name.into())
}

/// Which clause a condition set renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConditionClause {
    Where,
    Having,
}

impl ConditionClause {
    const fn keyword(self) -> &'static str {
        match self {
            Self::Where => "WHERE",
            Self::Having => "HAVING",
        }
    }
}

#[derive(Debug, Clone)]
enum PredicateValue {
    None,
    Single(ConditionValue),
    List(Vec<Value>),
}

#[derive(Debug, Clone)]
enum Entry {
    GroupStart(BoolOp),
    GroupEnd,
    Predicate {
        /// Pre-rendered fragment prefix, e.g. `"age" >= `.
        sql: String,
        /// Column (or function tag) the parameter name derives from.
        column: String,
        value: PredicateValue,
    },
}

/// An ordered set of WHERE or HAVING conditions.
#[derive(Debug, Clone)]
pub struct Conditions {
    clause: ConditionClause,
    dialect: &'static dyn Dialect,
    entries: Vec<Entry>,
}

impl Conditions {
    pub(crate) fn new(clause: ConditionClause, dialect: &'static dyn Dialect) -> Self {
        Self {
            clause,
            dialect,
            entries: Vec::new(),
        }
    }

    fn predicate(&mut self, sql: String, column: &str, value: PredicateValue) -> &mut Self {
        self.entries.push(Entry::Predicate {
            sql,
            column: String::from(column),
            value,
        });
        self
    }

    fn comparison(
        &mut self,
        column: &str,
        operator: &str,
        value: ConditionValue,
    ) -> &mut Self {
        let sql = format!("{} {operator} ", self.dialect.escape(column));
        self.predicate(sql, column, PredicateValue::Single(value))
    }

    /// `column = value`.
    pub fn equal(&mut self, column: &str, value: impl Into<ConditionValue>) -> &mut Self {
        self.comparison(column, "=", value.into())
    }

    /// `column != value`.
    pub fn not_equal(&mut self, column: &str, value: impl Into<ConditionValue>) -> &mut Self {
        self.comparison(column, "!=", value.into())
    }

    /// `column > value`.
    pub fn greater(&mut self, column: &str, value: impl Into<ConditionValue>) -> &mut Self {
        self.comparison(column, ">", value.into())
    }

    /// `column >= value`.
    pub fn greater_equal(&mut self, column: &str, value: impl Into<ConditionValue>) -> &mut Self {
        self.comparison(column, ">=", value.into())
    }

    /// `column < value`.
    pub fn lower(&mut self, column: &str, value: impl Into<ConditionValue>) -> &mut Self {
        self.comparison(column, "<", value.into())
    }

    /// `column <= value`.
    pub fn lower_equal(&mut self, column: &str, value: impl Into<ConditionValue>) -> &mut Self {
        self.comparison(column, "<=", value.into())
    }

    /// `column LIKE pattern`.
    pub fn like(&mut self, column: &str, pattern: &str) -> &mut Self {
        self.comparison(column, "LIKE", ConditionValue::from(pattern))
    }

    /// `column NOT LIKE pattern`.
    pub fn not_like(&mut self, column: &str, pattern: &str) -> &mut Self {
        self.comparison(column, "NOT LIKE", ConditionValue::from(pattern))
    }

    /// `column IS NULL`.
    pub fn is_null(&mut self, column: &str) -> &mut Self {
        let sql = format!("{} IS NULL", self.dialect.escape(column));
        self.predicate(sql, column, PredicateValue::None)
    }

    /// `column IS NOT NULL`.
    pub fn not_null(&mut self, column: &str) -> &mut Self {
        let sql = format!("{} IS NOT NULL", self.dialect.escape(column));
        self.predicate(sql, column, PredicateValue::None)
    }

    /// `column IN (values...)`, one parameter per value.
    ///
    /// An empty list is skipped entirely: no condition is applied,
    /// rather than emitting invalid `IN ()` SQL.
    pub fn in_list<T: ToValue>(&mut self, column: &str, values: Vec<T>) -> &mut Self {
        if values.is_empty() {
            return self;
        }
        let sql = format!("{} IN ", self.dialect.escape(column));
        let values = values.into_iter().map(ToValue::to_value).collect();
        self.predicate(sql, column, PredicateValue::List(values))
    }

    /// `column NOT IN (values...)`; an empty list is skipped.
    pub fn not_in_list<T: ToValue>(&mut self, column: &str, values: Vec<T>) -> &mut Self {
        if values.is_empty() {
            return self;
        }
        let sql = format!("{} NOT IN ", self.dialect.escape(column));
        let values = values.into_iter().map(ToValue::to_value).collect();
        self.predicate(sql, column, PredicateValue::List(values))
    }

    /// Opens a parenthesized group joined with AND.
    pub fn begin_and(&mut self) -> &mut Self {
        self.entries.push(Entry::GroupStart(BoolOp::And));
        self
    }

    /// Opens a parenthesized group joined with OR.
    pub fn begin_or(&mut self) -> &mut Self {
        self.entries.push(Entry::GroupStart(BoolOp::Or));
        self
    }

    /// Closes the current group.
    pub fn close_group(&mut self) -> &mut Self {
        self.entries.push(Entry::GroupEnd);
        self
    }

    /// Alias for [`close_group`](Self::close_group).
    pub fn close_and(&mut self) -> &mut Self {
        self.close_group()
    }

    /// Alias for [`close_group`](Self::close_group).
    pub fn close_or(&mut self) -> &mut Self {
        self.close_group()
    }

    /// `function(column) operator value` — an aggregate filter for
    /// HAVING clauses, e.g. `aggregate("MIN", Some("age"), ">=", 18)`.
    pub fn aggregate(
        &mut self,
        function: &str,
        column: Option<&str>,
        operator: &str,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        let escaped = column.map(|c| self.dialect.escape(c)).unwrap_or_default();
        let sql = format!("{function}({escaped}) {operator} ");
        let name = column.unwrap_or(function);
        let name = String::from(name);
        self.predicate(sql, &name, PredicateValue::Single(value.into()))
    }

    /// `COUNT(*) operator value`.
    pub fn count(&mut self, operator: &str, value: impl Into<ConditionValue>) -> &mut Self {
        let sql = format!("COUNT(*) {operator} ");
        self.predicate(sql, "COUNT", PredicateValue::Single(value.into()))
    }

    /// `SUM(column) operator value`.
    pub fn sum(
        &mut self,
        column: &str,
        operator: &str,
        value: impl Into<ConditionValue>,
    ) -> &mut Self {
        self.aggregate("SUM", Some(column), operator, value)
    }

    /// Whether no conditions were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the clause, registering bound parameters in `params` —
    /// the table of the outermost query when rendering a sub-select.
    ///
    /// Tracks a current operator: AND by default, the group's operator
    /// after a group opens, AND again after it closes. The operator is
    /// emitted before every non-group entry except the first and except
    /// immediately after a group start.
    pub(crate) fn render(&self, params: &mut ParamTable) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        let mut sql = String::from(self.clause.keyword());
        sql.push(' ');
        let mut current_op = BoolOp::And;
        for (i, entry) in self.entries.iter().enumerate() {
            let after_group_start =
                i > 0 && matches!(self.entries[i - 1], Entry::GroupStart(_));
            let needs_operator = i > 0 && !after_group_start;
            match entry {
                Entry::GroupStart(op) => {
                    current_op = *op;
                    sql.push('(');
                }
                Entry::GroupEnd => {
                    current_op = BoolOp::And;
                    sql.push(')');
                }
                Entry::Predicate {
                    sql: fragment,
                    column,
                    value,
                } => {
                    if needs_operator {
                        sql.push(' ');
                        sql.push_str(current_op.as_sql());
                        sql.push(' ');
                    }
                    sql.push_str(fragment);
                    match value {
                        PredicateValue::None => {}
                        PredicateValue::Single(ConditionValue::Bound(v)) => {
                            let arg = params.unique_name(&argument_name(ARG_PREFIX, column));
                            params.insert(arg.clone(), v.clone());
                            sql.push_str(&arg);
                        }
                        PredicateValue::Single(ConditionValue::ColumnRef(name)) => {
                            sql.push_str(&self.dialect.escape(name));
                        }
                        PredicateValue::List(values) => {
                            let mut args = Vec::with_capacity(values.len());
                            for v in values {
                                let arg =
                                    params.unique_name(&argument_name(ARG_PREFIX, column));
                                params.insert(arg.clone(), v.clone());
                                args.push(arg);
                            }
                            sql.push('(');
                            sql.push_str(&args.join(", "));
                            sql.push(')');
                        }
                    }
                }
            }
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Driver;

    fn where_clause() -> Conditions {
        Conditions::new(ConditionClause::Where, Driver::Sqlite.dialect())
    }

    #[test]
    fn test_empty_renders_nothing() {
        let conditions = where_clause();
        let mut params = ParamTable::new();
        assert_eq!(conditions.render(&mut params), "");
        assert!(params.is_empty());
    }

    #[test]
    fn test_chained_conditions_join_with_and() {
        let mut conditions = where_clause();
        conditions.greater_equal("id", 2).greater_equal("age", 18);
        let mut params = ParamTable::new();
        assert_eq!(
            conditions.render(&mut params),
            "WHERE \"id\" >= :__id AND \"age\" >= :__age"
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_group_renders_parenthesized() {
        let mut conditions = where_clause();
        conditions
            .begin_and()
            .greater_equal("id", 2)
            .greater_equal("age", 18)
            .close_and();
        let mut params = ParamTable::new();
        assert_eq!(
            conditions.render(&mut params),
            "WHERE (\"id\" >= :__id AND \"age\" >= :__age)"
        );
    }

    #[test]
    fn test_or_group_sets_inner_operator() {
        let mut conditions = where_clause();
        conditions
            .begin_or()
            .equal("name", "Bryan")
            .equal("name", "Steve")
            .close_or();
        let mut params = ParamTable::new();
        assert_eq!(
            conditions.render(&mut params),
            "WHERE (\"name\" = :__name OR \"name\" = :__name_2)"
        );
        let names: Vec<&str> = params.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec![":__name", ":__name_2"]);
    }

    #[test]
    fn test_operator_resets_after_group_close() {
        let mut conditions = where_clause();
        conditions
            .begin_or()
            .equal("a", 1)
            .equal("b", 2)
            .close_or()
            .equal("c", 3);
        let mut params = ParamTable::new();
        assert_eq!(
            conditions.render(&mut params),
            "WHERE (\"a\" = :__a OR \"b\" = :__b) AND \"c\" = :__c"
        );
    }

    #[test]
    fn test_null_checks_bind_nothing() {
        let mut conditions = where_clause();
        conditions.is_null("deleted_at").not_null("name");
        let mut params = ParamTable::new();
        assert_eq!(
            conditions.render(&mut params),
            "WHERE \"deleted_at\" IS NULL AND \"name\" IS NOT NULL"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_in_list_expands_one_parameter_per_value() {
        let mut conditions = where_clause();
        conditions.in_list("id", vec![1, 2, 3]);
        let mut params = ParamTable::new();
        assert_eq!(
            conditions.render(&mut params),
            "WHERE \"id\" IN (:__id, :__id_2, :__id_3)"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_empty_in_list_is_skipped() {
        let mut conditions = where_clause();
        conditions.equal("a", 1).in_list("id", Vec::<i64>::new());
        let mut params = ParamTable::new();
        assert_eq!(conditions.render(&mut params), "WHERE \"a\" = :__a");
    }

    #[test]
    fn test_column_ref_bypasses_binding() {
        let mut conditions = where_clause();
        conditions.equal("order.customerId", column_ref("customer.customerId"));
        let mut params = ParamTable::new();
        assert_eq!(
            conditions.render(&mut params),
            "WHERE \"order\".\"customerId\" = \"customer\".\"customerId\""
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_having_aggregates() {
        let mut conditions =
            Conditions::new(ConditionClause::Having, Driver::Sqlite.dialect());
        conditions.count(">", 1).sum("amount", ">=", 100);
        let mut params = ParamTable::new();
        assert_eq!(
            conditions.render(&mut params),
            "HAVING COUNT(*) > :__COUNT AND SUM(\"amount\") >= :__amount"
        );
    }

    #[test]
    fn test_unterminated_group_renders_unbalanced_sql() {
        // Not defended: closing the group is the caller's job. The
        // backend rejects the statement at prepare time.
        let mut conditions = where_clause();
        conditions.begin_or().equal("a", 1);
        let mut params = ParamTable::new();
        assert_eq!(conditions.render(&mut params), "WHERE (\"a\" = :__a");
    }

    #[test]
    fn test_dotted_column_parameter_name() {
        let mut conditions = where_clause();
        conditions.equal("users.name", "Bob");
        let mut params = ParamTable::new();
        assert_eq!(
            conditions.render(&mut params),
            "WHERE \"users\".\"name\" = :__users_name"
        );
        assert!(params.contains(":__users_name"));
    }
}
