//! The UPDATE statement builder.

use std::rc::Rc;

use crate::connection::ConnectionProvider;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::params::{argument_name, ParamTable};
use crate::query::condition::{ConditionClause, ConditionValue, Conditions};
use crate::query::{run_statement, ErrorState};
use crate::value::{ToValue, Value};

/// An `UPDATE` query builder.
///
/// Besides ordinary SET assignments, columns can be incremented or
/// decremented in place; the amount is rendered as a literal
/// (`"count" = "count" + 1`) — it is caller-controlled numeric input,
/// not a user-value channel.
pub struct Update {
    provider: Rc<ConnectionProvider>,
    dialect: &'static dyn Dialect,
    table: String,
    parameters: Vec<(String, Value)>,
    increments: Vec<(String, i64)>,
    decrements: Vec<(String, i64)>,
    where_: Option<Conditions>,
    prepared: Option<String>,
    row_count: Option<u64>,
    error: ErrorState,
}

impl Update {
    /// Creates an update of the given table.
    #[must_use]
    pub fn new(provider: Rc<ConnectionProvider>, table: &str) -> Self {
        let dialect = provider.dialect();
        Self {
            provider,
            dialect,
            table: String::from(table),
            parameters: Vec::new(),
            increments: Vec::new(),
            decrements: Vec::new(),
            where_: None,
            prepared: None,
            row_count: None,
            error: ErrorState::default(),
        }
    }

    /// Sets one column value; a repeated column keeps its position.
    pub fn set_value(&mut self, column: &str, value: impl ToValue) -> &mut Self {
        let value = value.to_value();
        if let Some(entry) = self.parameters.iter_mut().find(|(c, _)| c == column) {
            entry.1 = value;
        } else {
            self.prepared = None;
            self.parameters.push((String::from(column), value));
        }
        self
    }

    /// Sets several column values.
    pub fn values(&mut self, pairs: Vec<(&str, Value)>) -> &mut Self {
        for (column, value) in pairs {
            self.set_value(column, value);
        }
        self
    }

    /// Increments a column by one.
    pub fn increment(&mut self, column: &str) -> &mut Self {
        self.increment_by(column, 1)
    }

    /// Increments a column by the given amount.
    pub fn increment_by(&mut self, column: &str, amount: i64) -> &mut Self {
        self.prepared = None;
        self.increments.push((String::from(column), amount));
        self
    }

    /// Decrements a column by one.
    pub fn decrement(&mut self, column: &str) -> &mut Self {
        self.decrement_by(column, 1)
    }

    /// Decrements a column by the given amount.
    pub fn decrement_by(&mut self, column: &str, amount: i64) -> &mut Self {
        self.prepared = None;
        self.decrements.push((String::from(column), amount));
        self
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

    /// Builds the statement and its parameter table.
    #[must_use]
    pub fn build(&self) -> (String, ParamTable) {
        let mut params = ParamTable::new();
        let mut assignments = Vec::new();
        for (column, value) in &self.parameters {
            let arg = params.unique_name(&argument_name(":_", column));
            params.insert(arg.clone(), value.clone());
            assignments.push(format!("{} = {arg}", self.dialect.escape(column)));
        }
        for (column, amount) in &self.increments {
            let escaped = self.dialect.escape(column);
            assignments.push(format!("{escaped} = {escaped} + {amount}"));
        }
        for (column, amount) in &self.decrements {
            let escaped = self.dialect.escape(column);
            assignments.push(format!("{escaped} = {escaped} - {amount}"));
        }
        let mut sql = format!(
            "UPDATE {} SET {}",
            self.dialect.escape(&self.table),
            assignments.join(", ")
        );
        if let Some(where_) = &self.where_ {
            let clause = where_.render(&mut params);
            if !clause.is_empty() {
                sql.push(' ');
                sql.push_str(&clause);
            }
        }
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
    /// [`Error::Sql`](crate::Error::Sql) when preparation fails inside
    /// a transaction.
    pub fn prepare(&mut self) -> Result<bool> {
        let (sql, _params) = self.build();
        let ok = super::check_statement(&self.provider, &sql, &mut self.error)?;
        self.prepared = ok.then_some(sql);
        Ok(ok)
    }

    /// Executes the update, auto-preparing when needed.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) when the statement fails inside
    /// a transaction.
    pub fn execute(&mut self) -> Result<bool> {
        if self.prepared.is_none() && !self.prepare()? {
            return Ok(false);
        }
        let (sql, params) = self.build();
        match run_statement(&self.provider, &sql, &params, &mut self.error)? {
            Some(affected) => {
                self.row_count = Some(affected);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Rows affected by the last execution.
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

    fn update() -> Update {
        Update::new(ConnectionProvider::detached(Driver::Sqlite), "customer")
    }

    #[test]
    fn test_update_sql() {
        let mut query = update();
        query.set_value("customerName", "Bob").where_equal("customerId", 1);
        let (sql, params) = query.build();
        assert_eq!(
            sql,
            "UPDATE \"customer\" SET \"customerName\" = :_customerName \
             WHERE \"customerId\" = :__customerId"
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_increment_and_decrement_render_literal_arithmetic() {
        let mut query = update();
        query
            .set_value("name", "x")
            .increment("visits")
            .decrement_by("credit", 5);
        let (sql, params) = query.build();
        assert_eq!(
            sql,
            "UPDATE \"customer\" SET \"name\" = :_name, \
             \"visits\" = \"visits\" + 1, \"credit\" = \"credit\" - 5"
        );
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_set_and_where_on_same_column_do_not_collide() {
        let mut query = update();
        query.set_value("age", 30).where_equal("age", 29);
        let (_sql, params) = query.build();
        assert!(params.contains(":_age"));
        assert!(params.contains(":__age"));
    }
}
