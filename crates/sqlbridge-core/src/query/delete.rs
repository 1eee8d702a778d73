//! The DELETE statement builder.

use std::rc::Rc;

use crate::connection::ConnectionProvider;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::params::ParamTable;
use crate::query::condition::{ConditionClause, ConditionValue, Conditions};
use crate::query::{run_statement, ErrorState};

/// A `DELETE FROM` query builder.
pub struct Delete {
    provider: Rc<ConnectionProvider>,
    dialect: &'static dyn Dialect,
    table: String,
    where_: Option<Conditions>,
    prepared: Option<String>,
    row_count: Option<u64>,
    error: ErrorState,
}

impl Delete {
    /// Creates a delete from the given table.
    #[must_use]
    pub fn new(provider: Rc<ConnectionProvider>, table: &str) -> Self {
        let dialect = provider.dialect();
        Self {
            provider,
            dialect,
            table: String::from(table),
            where_: None,
            prepared: None,
            row_count: None,
            error: ErrorState::default(),
        }
    }

    /// The WHERE condition set, created on first access. Without one
    /// the statement deletes every row.
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
        let mut sql = format!("DELETE FROM {}", self.dialect.escape(&self.table));
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

    /// Executes the delete, auto-preparing when needed.
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

    #[test]
    fn test_delete_without_where() {
        let query = Delete::new(ConnectionProvider::detached(Driver::Sqlite), "customer");
        assert_eq!(query.sql(), "DELETE FROM \"customer\"");
    }

    #[test]
    fn test_delete_with_conditions() {
        let mut query = Delete::new(ConnectionProvider::detached(Driver::Sqlite), "customer");
        query.where_clause().equal("name", "Bob").greater("age", 40);
        let (sql, params) = query.build();
        assert_eq!(
            sql,
            "DELETE FROM \"customer\" WHERE \"name\" = :__name AND \"age\" > :__age"
        );
        assert_eq!(params.len(), 2);
    }
}
