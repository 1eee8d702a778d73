//! The SELECT statement builder.
//!
//! Clauses render in fixed SQL order — columns, FROM, JOINs, WHERE,
//! GROUP BY, HAVING, ORDER BY, LIMIT, OFFSET — omitting any clause whose
//! backing collection is empty. LIMIT and OFFSET are bound as parameters
//! to preserve prepared-statement semantics.
//!
//! A select can embed further selects as output columns
//! ([`select_sub`](Select::select_sub)); the child renders as
//! `(<child sql>) AS alias` and registers its parameters in the
//! parameter table of the outermost query, which is the single table
//! bound at execution time.

use std::rc::Rc;

use crate::connection::ConnectionProvider;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::output::{OutputFormat, QueryOutput};
use crate::params::ParamTable;
use crate::query::condition::{ConditionClause, ConditionValue, Conditions};
use crate::query::{run_query, ErrorState};
use crate::value::Value;

enum ColumnSpec {
    /// A plain column, optionally aliased.
    Column { name: String, alias: Option<String> },
    /// `COUNT(*) AS alias`.
    Count { alias: String },
    /// `FUNC(column) [AS alias]` for SUM / MIN / MAX.
    Aggregate {
        function: &'static str,
        name: String,
        alias: Option<String>,
    },
    /// An embedded sub-select, rendered `(<sql>) AS alias`.
    SubQuery { query: Box<Select>, alias: String },
}

struct OrderSpec {
    /// Escaped and emitted when present; absent for raw expressions
    /// such as a random-function call.
    column: Option<String>,
    /// `ASC`, `DESC` or a raw order expression.
    expr: String,
}

/// A `SELECT` query builder.
pub struct Select {
    provider: Rc<ConnectionProvider>,
    dialect: &'static dyn Dialect,
    distinct: bool,
    columns: Vec<ColumnSpec>,
    from: String,
    joins: Vec<String>,
    where_: Option<Conditions>,
    group_by: Vec<String>,
    having: Option<Conditions>,
    order_by: Vec<OrderSpec>,
    limit: Option<u64>,
    offset: Option<u64>,
    prepared: Option<String>,
    row_count: Option<u64>,
    error: ErrorState,
}

impl Select {
    /// Creates a select bound to the given provider.
    #[must_use]
    pub fn new(provider: Rc<ConnectionProvider>) -> Self {
        let dialect = provider.dialect();
        Self {
            provider,
            dialect,
            distinct: false,
            columns: Vec::new(),
            from: String::new(),
            joins: Vec::new(),
            where_: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            prepared: None,
            row_count: None,
            error: ErrorState::default(),
        }
    }

    /// Selects DISTINCT rows.
    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    /// Adds an output column (`table.column` qualification allowed).
    pub fn column(&mut self, name: &str) -> &mut Self {
        self.columns.push(ColumnSpec::Column {
            name: String::from(name),
            alias: None,
        });
        self
    }

    /// Adds an aliased output column.
    pub fn column_as(&mut self, name: &str, alias: &str) -> &mut Self {
        self.columns.push(ColumnSpec::Column {
            name: String::from(name),
            alias: Some(String::from(alias)),
        });
        self
    }

    /// Adds several plain output columns.
    pub fn columns(&mut self, names: &[&str]) -> &mut Self {
        for name in names {
            self.column(name);
        }
        self
    }

    /// Adds a `COUNT(*)` column.
    pub fn count(&mut self, alias: &str) -> &mut Self {
        self.columns.push(ColumnSpec::Count {
            alias: String::from(alias),
        });
        self
    }

    /// Adds a `SUM(column)` column.
    pub fn sum(&mut self, column: &str, alias: &str) -> &mut Self {
        self.aggregate("SUM", column, alias)
    }

    /// Adds a `MIN(column)` column.
    pub fn min(&mut self, column: &str, alias: &str) -> &mut Self {
        self.aggregate("MIN", column, alias)
    }

    /// Adds a `MAX(column)` column.
    pub fn max(&mut self, column: &str, alias: &str) -> &mut Self {
        self.aggregate("MAX", column, alias)
    }

    fn aggregate(&mut self, function: &'static str, column: &str, alias: &str) -> &mut Self {
        self.columns.push(ColumnSpec::Aggregate {
            function,
            name: String::from(column),
            alias: Some(String::from(alias)),
        });
        self
    }

    /// Embeds a child select as an output column and returns it for
    /// configuration. The child's bound parameters land in this (or the
    /// outermost) query's parameter table at render time.
    pub fn select_sub(&mut self, alias: &str) -> &mut Select {
        let child = Select::new(Rc::clone(&self.provider));
        self.columns.push(ColumnSpec::SubQuery {
            query: Box::new(child),
            alias: String::from(alias),
        });
        match self.columns.last_mut() {
            Some(ColumnSpec::SubQuery { query, .. }) => query,
            _ => unreachable!("sub-query column was just pushed"),
        }
    }

    /// Sets the source table.
    pub fn from(&mut self, table: &str) -> &mut Self {
        self.from = String::from(table);
        self
    }

    fn push_join(
        &mut self,
        kind: &str,
        external_table: &str,
        external_column: &str,
        local_table: &str,
        local_column: &str,
    ) -> &mut Self {
        self.joins.push(format!(
            "{kind} JOIN {} ON {}.{}={}.{}",
            self.dialect.escape(external_table),
            self.dialect.escape(local_table),
            self.dialect.escape(local_column),
            self.dialect.escape(external_table),
            self.dialect.escape(external_column)
        ));
        self
    }

    /// INNER JOIN on an equality between two qualified columns.
    pub fn inner_join(
        &mut self,
        external_table: &str,
        external_column: &str,
        local_table: &str,
        local_column: &str,
    ) -> &mut Self {
        self.push_join(
            "INNER",
            external_table,
            external_column,
            local_table,
            local_column,
        )
    }

    /// Alias for [`inner_join`](Self::inner_join).
    pub fn join(
        &mut self,
        external_table: &str,
        external_column: &str,
        local_table: &str,
        local_column: &str,
    ) -> &mut Self {
        self.inner_join(external_table, external_column, local_table, local_column)
    }

    /// LEFT OUTER JOIN.
    pub fn left_join(
        &mut self,
        external_table: &str,
        external_column: &str,
        local_table: &str,
        local_column: &str,
    ) -> &mut Self {
        self.push_join(
            "LEFT OUTER",
            external_table,
            external_column,
            local_table,
            local_column,
        )
    }

    /// RIGHT OUTER JOIN.
    pub fn right_join(
        &mut self,
        external_table: &str,
        external_column: &str,
        local_table: &str,
        local_column: &str,
    ) -> &mut Self {
        self.push_join(
            "RIGHT OUTER",
            external_table,
            external_column,
            local_table,
            local_column,
        )
    }

    /// FULL OUTER JOIN.
    pub fn full_join(
        &mut self,
        external_table: &str,
        external_column: &str,
        local_table: &str,
        local_column: &str,
    ) -> &mut Self {
        self.push_join(
            "FULL OUTER",
            external_table,
            external_column,
            local_table,
            local_column,
        )
    }

    /// The WHERE condition set, created on first access.
    pub fn where_clause(&mut self) -> &mut Conditions {
        let dialect = self.dialect;
        self.where_
            .get_or_insert_with(|| Conditions::new(ConditionClause::Where, dialect))
    }

    /// Shorthand for `where_clause().equal(column, value)`.
    pub fn where_equal(&mut self, column: &str, value: impl Into<ConditionValue>) -> &mut Self {
        self.where_clause().equal(column, value);
        self
    }

    /// The HAVING condition set, created on first access.
    pub fn having(&mut self) -> &mut Conditions {
        let dialect = self.dialect;
        self.having
            .get_or_insert_with(|| Conditions::new(ConditionClause::Having, dialect))
    }

    /// Sets the GROUP BY column list.
    pub fn group_by(&mut self, columns: &[&str]) -> &mut Self {
        self.group_by = columns.iter().map(|c| String::from(*c)).collect();
        self
    }

    /// Adds an `ORDER BY column ASC` term.
    pub fn order_asc(&mut self, column: &str) -> &mut Self {
        self.order_by.push(OrderSpec {
            column: Some(String::from(column)),
            expr: String::from("ASC"),
        });
        self
    }

    /// Adds an `ORDER BY column DESC` term.
    pub fn order_desc(&mut self, column: &str) -> &mut Self {
        self.order_by.push(OrderSpec {
            column: Some(String::from(column)),
            expr: String::from("DESC"),
        });
        self
    }

    /// Orders rows by the backend's random function.
    pub fn order_rand(&mut self, seed: Option<i64>) -> &mut Self {
        self.order_by.push(OrderSpec {
            column: None,
            expr: self.dialect.sql_random(seed),
        });
        self
    }

    /// Sets the LIMIT (bound as a parameter; 0 disables).
    pub fn limit(&mut self, value: u64) -> &mut Self {
        self.limit = Some(value);
        self
    }

    /// Sets the OFFSET (bound as a parameter; 0 disables).
    pub fn offset(&mut self, value: u64) -> &mut Self {
        self.offset = Some(value);
        self
    }

    fn render_columns(&self, params: &mut ParamTable) -> String {
        if self.columns.is_empty() {
            return String::from("*");
        }
        let rendered: Vec<String> = self
            .columns
            .iter()
            .map(|spec| match spec {
                ColumnSpec::Column { name, alias } => match alias {
                    Some(a) => format!(
                        "{} AS {}",
                        self.dialect.escape(name),
                        self.dialect.escape(a)
                    ),
                    None => self.dialect.escape(name),
                },
                ColumnSpec::Count { alias } => {
                    format!("COUNT(*) AS {}", self.dialect.escape(alias))
                }
                ColumnSpec::Aggregate {
                    function,
                    name,
                    alias,
                } => {
                    let base = format!("{function}({})", self.dialect.escape(name));
                    match alias {
                        Some(a) => format!("{base} AS {}", self.dialect.escape(a)),
                        None => base,
                    }
                }
                ColumnSpec::SubQuery { query, alias } => {
                    format!("({}) AS {}", query.render(params), self.dialect.escape(alias))
                }
            })
            .collect();
        let distinct = if self.distinct { "DISTINCT " } else { "" };
        format!("{distinct}{}", rendered.join(", "))
    }

    /// Renders the statement, registering parameters in `params` — the
    /// table of the outermost query when this select is embedded.
    pub(crate) fn render(&self, params: &mut ParamTable) -> String {
        let mut parts: Vec<String> = vec![String::from("SELECT"), self.render_columns(params)];

        if !self.from.is_empty() {
            parts.push(format!("FROM {}", self.dialect.escape(&self.from)));
        }
        parts.extend(self.joins.iter().cloned());

        if let Some(where_) = &self.where_ {
            let sql = where_.render(params);
            if !sql.is_empty() {
                parts.push(sql);
            }
        }
        if !self.group_by.is_empty() {
            let columns: Vec<&str> = self.group_by.iter().map(String::as_str).collect();
            parts.push(format!(
                "GROUP BY {}",
                self.dialect.escape_list(&columns).join(", ")
            ));
        }
        if let Some(having) = &self.having {
            let sql = having.render(params);
            if !sql.is_empty() {
                parts.push(sql);
            }
        }
        if !self.order_by.is_empty() {
            let terms: Vec<String> = self
                .order_by
                .iter()
                .map(|spec| match &spec.column {
                    Some(column) => format!("{} {}", self.dialect.escape(column), spec.expr),
                    None => spec.expr.clone(),
                })
                .collect();
            parts.push(format!("ORDER BY {}", terms.join(", ")));
        }
        if let Some(limit) = self.limit.filter(|n| *n > 0) {
            let arg = params.unique_name(":_LIMIT");
            params.insert(arg.clone(), Value::Int(limit as i64));
            parts.push(format!("LIMIT {arg}"));
        }
        if let Some(offset) = self.offset.filter(|n| *n > 0) {
            let arg = params.unique_name(":_OFFSET");
            params.insert(arg.clone(), Value::Int(offset as i64));
            parts.push(format!("OFFSET {arg}"));
        }
        parts.join(" ")
    }

    /// Builds the statement and its parameter table.
    #[must_use]
    pub fn build(&self) -> (String, ParamTable) {
        let mut params = ParamTable::new();
        let sql = self.render(&mut params);
        (sql, params)
    }

    /// The SQL text for the builder's current state.
    #[must_use]
    pub fn sql(&self) -> String {
        self.build().0
    }

    /// Validates the statement against the connection.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) when preparation fails inside a transaction.
    pub fn prepare(&mut self) -> Result<bool> {
        let (sql, _params) = self.build();
        let ok = super::check_statement(&self.provider, &sql, &mut self.error)?;
        self.prepared = ok.then_some(sql);
        Ok(ok)
    }

    /// Executes the select, discarding rows. Auto-prepares when needed.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) when the statement fails inside a transaction.
    pub fn execute(&mut self) -> Result<bool> {
        if self.prepared.is_none() && !self.prepare()? {
            return Ok(false);
        }
        let (sql, params) = self.build();
        match run_query(&self.provider, &sql, &params, &mut self.error)? {
            Some(rows) => {
                self.row_count = Some(rows.len() as u64);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Executes and fetches all rows in the given format (the
    /// provider's default format when `None`).
    ///
    /// A failed execution outside a transaction yields the empty shape
    /// with the error inspectable through [`has_error`](Self::has_error).
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) when the statement fails inside a transaction.
    pub fn get_all(&mut self, format: Option<OutputFormat>) -> Result<QueryOutput> {
        let format = format.unwrap_or_else(|| self.provider.default_format());
        let (sql, params) = self.build();
        match run_query(&self.provider, &sql, &params, &mut self.error)? {
            Some(rows) => {
                self.row_count = Some(rows.len() as u64);
                Ok(QueryOutput::render(&rows, format))
            }
            None => Ok(QueryOutput::empty(format)),
        }
    }

    /// Fetches at most one row (forces `LIMIT 1`).
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) when the statement fails inside a transaction.
    pub fn get_one(&mut self, format: Option<OutputFormat>) -> Result<QueryOutput> {
        self.limit(1);
        self.get_all(format)
    }

    /// Fetches the first column of the first row (forces `LIMIT 1`).
    /// `None` means no row matched — distinct from any legitimate
    /// falsy column value.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) when the statement fails inside a transaction.
    pub fn get_column(&mut self) -> Result<Option<Value>> {
        self.limit(1);
        let (sql, params) = self.build();
        match run_query(&self.provider, &sql, &params, &mut self.error)? {
            Some(rows) => Ok(rows.first_value().cloned()),
            None => Ok(None),
        }
    }

    /// Rows fetched by the last execution, when one has run.
    #[must_use]
    pub fn row_count(&self) -> Option<u64> {
        self.row_count
    }

    /// Whether the most recent operation failed.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.has_error()
    }

    /// Code of the last recorded error.
    #[must_use]
    pub fn error_code(&self) -> Option<i64> {
        self.error.code()
    }

    /// Message of the last recorded error.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Driver;

    fn select() -> Select {
        Select::new(ConnectionProvider::detached(Driver::Sqlite))
    }

    #[test]
    fn test_select_star_when_no_columns() {
        let mut query = select();
        query.from("users");
        assert_eq!(query.sql(), "SELECT * FROM \"users\"");
    }

    #[test]
    fn test_columns_aliases_and_distinct() {
        let mut query = select();
        query
            .distinct()
            .column("name")
            .column_as("users.age", "years")
            .from("users");
        assert_eq!(
            query.sql(),
            "SELECT DISTINCT \"name\", \"users\".\"age\" AS \"years\" FROM \"users\""
        );
    }

    #[test]
    fn test_aggregate_columns() {
        let mut query = select();
        query
            .count("n")
            .sum("amount", "total")
            .min("age", "youngest")
            .max("age", "oldest")
            .from("orders");
        assert_eq!(
            query.sql(),
            "SELECT COUNT(*) AS \"n\", SUM(\"amount\") AS \"total\", \
             MIN(\"age\") AS \"youngest\", MAX(\"age\") AS \"oldest\" FROM \"orders\""
        );
    }

    #[test]
    fn test_clause_order() {
        let mut query = select();
        query
            .column("status")
            .count("n")
            .from("orders")
            .group_by(&["status"])
            .order_asc("status")
            .limit(10)
            .offset(20);
        query.having().count(">", 1);
        query.where_clause().not_null("status");
        let (sql, params) = query.build();
        assert_eq!(
            sql,
            "SELECT \"status\", COUNT(*) AS \"n\" FROM \"orders\" \
             WHERE \"status\" IS NOT NULL GROUP BY \"status\" HAVING COUNT(*) > :__COUNT \
             ORDER BY \"status\" ASC LIMIT :_LIMIT OFFSET :_OFFSET"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_joins_render_on_equality() {
        let mut query = select();
        query
            .column("customer.customerName")
            .column("order.orderId")
            .from("customer")
            .left_join("order", "customerId", "customer", "customerId");
        assert_eq!(
            query.sql(),
            "SELECT \"customer\".\"customerName\", \"order\".\"orderId\" FROM \"customer\" \
             LEFT OUTER JOIN \"order\" ON \"customer\".\"customerId\"=\"order\".\"customerId\""
        );
    }

    #[test]
    fn test_sub_select_params_land_in_top_table() {
        let mut query = select();
        query.column("customerName").from("customer");
        query
            .select_sub("orderNumber")
            .count("orderNumber")
            .from("order")
            .where_clause()
            .equal("order.customerId", crate::query::column_ref("customer.customerId"))
            .greater("order.orderId", 10000);
        let (sql, params) = query.build();
        assert_eq!(
            sql,
            "SELECT \"customerName\", (SELECT COUNT(*) AS \"orderNumber\" FROM \"order\" \
             WHERE \"order\".\"customerId\" = \"customer\".\"customerId\" AND \
             \"order\".\"orderId\" > :__order_orderId) AS \"orderNumber\" FROM \"customer\""
        );
        assert_eq!(params.len(), 1);
        assert!(params.contains(":__order_orderId"));
    }

    #[test]
    fn test_order_rand_uses_dialect_function() {
        let mut query = select();
        query.from("users").order_rand(None);
        assert_eq!(query.sql(), "SELECT * FROM \"users\" ORDER BY random()");
    }

    #[test]
    fn test_limit_zero_is_not_rendered() {
        let mut query = select();
        query.from("users").limit(0);
        assert_eq!(query.sql(), "SELECT * FROM \"users\"");
    }

    #[test]
    fn test_duplicate_limit_parameter_names_disambiguate() {
        let mut query = select();
        query.column("a").from("t").limit(5);
        query.select_sub("inner").from("u").limit(3);
        let (_sql, params) = query.build();
        assert!(params.contains(":_LIMIT"));
        assert!(params.contains(":_LIMIT_2"));
    }
}
