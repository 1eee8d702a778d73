//! The INSERT statement builder.

use std::rc::Rc;

use crate::connection::ConnectionProvider;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::params::{argument_name, ParamTable};
use crate::query::{run_statement, ErrorState};
use crate::value::{ToValue, Value};

/// An `INSERT INTO` query builder.
///
/// Columns accumulate in insertion order; re-preparing with a fixed
/// column list ([`prepare_columns`](Insert::prepare_columns)) supports
/// bulk-style reuse where only the bound values change between
/// executions.
pub struct Insert {
    provider: Rc<ConnectionProvider>,
    dialect: &'static dyn Dialect,
    table: String,
    parameters: Vec<(String, Value)>,
    prepared: Option<String>,
    row_count: Option<u64>,
    executed: bool,
    error: ErrorState,
}

impl Insert {
    /// Creates an insert into the given table.
    #[must_use]
    pub fn new(provider: Rc<ConnectionProvider>, table: &str) -> Self {
        let dialect = provider.dialect();
        Self {
            provider,
            dialect,
            table: String::from(table),
            parameters: Vec::new(),
            prepared: None,
            row_count: None,
            executed: false,
            error: ErrorState::default(),
        }
    }

    /// Sets one column value; a repeated column keeps its position.
    pub fn set_value(&mut self, column: &str, value: impl ToValue) -> &mut Self {
        let value = value.to_value();
        if let Some(entry) = self.parameters.iter_mut().find(|(c, _)| c == column) {
            entry.1 = value;
        } else {
            // a new column changes the statement shape
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

    /// Resets the bound-column set to the given list (values start as
    /// NULL) and prepares the statement, for reuse with varying
    /// [`values`](Insert::values) calls.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) when preparation fails inside
    /// a transaction.
    pub fn prepare_columns(&mut self, columns: &[&str]) -> Result<bool> {
        self.parameters = columns
            .iter()
            .map(|c| (String::from(*c), Value::Null))
            .collect();
        self.prepared = None;
        self.prepare()
    }

    /// Builds the statement and its parameter table.
    #[must_use]
    pub fn build(&self) -> (String, ParamTable) {
        let mut params = ParamTable::new();
        let mut names = Vec::with_capacity(self.parameters.len());
        let mut args = Vec::with_capacity(self.parameters.len());
        for (column, value) in &self.parameters {
            let arg = params.unique_name(&argument_name(":_", column));
            params.insert(arg.clone(), value.clone());
            names.push(self.dialect.escape(column));
            args.push(arg);
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.dialect.escape(&self.table),
            names.join(", "),
            args.join(", ")
        );
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

    /// Executes the insert, auto-preparing when needed.
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
                self.executed = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// The id assigned by the last executed insert (auto-increment
    /// sequence or row id). `None` until a statement has executed.
    #[must_use]
    pub fn last_id(&self) -> Option<i64> {
        if !self.executed {
            return None;
        }
        self.provider.raw_last_insert_id().ok()
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
