//! Parametrized query builders.
//!
//! One builder per statement kind, each composing the shared dialect,
//! the condition engine and the connection provider. `sql()` is pure —
//! it can be re-derived any number of times from the builder's current
//! state — and `execute()` auto-prepares, binds the parameter table and
//! applies the transaction-aware failure policy.

pub mod condition;
mod create_table;
mod delete;
mod insert;
mod select;
mod update;

pub use condition::{column_ref, BoolOp, ConditionValue, Conditions};
pub use create_table::{ColumnDef, CreateTable, DefaultValue};
pub use delete::Delete;
pub use insert::Insert;
pub use select::Select;
pub use update::Update;

use crate::connection::{ConnectionProvider, ResultSet};
use crate::error::{Error, Result, SqlError};
use crate::params::ParamTable;

/// Last-error record kept by every query builder, reflecting only the
/// most recent operation.
#[derive(Debug, Default)]
pub(crate) struct ErrorState(Option<SqlError>);

impl ErrorState {
    pub(crate) fn clear(&mut self) {
        self.0 = None;
    }

    pub(crate) fn record(&mut self, error: SqlError) {
        tracing::warn!(code = ?error.code, message = %error.message, "statement failed");
        self.0 = Some(error);
    }

    pub(crate) fn has_error(&self) -> bool {
        self.0.is_some()
    }

    pub(crate) fn code(&self) -> Option<i64> {
        self.0.as_ref().and_then(|e| e.code)
    }

    pub(crate) fn message(&self) -> Option<String> {
        self.0.as_ref().map(|e| e.message.clone())
    }
}

/// Runs a statement with the shared failure policy: success is
/// `Ok(Some(rows_affected))`, a failure outside a transaction is
/// recorded and reported as `Ok(None)`, and a failure inside a
/// transaction propagates as [`Error::Sql`].
pub(crate) fn run_statement(
    provider: &ConnectionProvider,
    sql: &str,
    params: &ParamTable,
    error: &mut ErrorState,
) -> Result<Option<u64>> {
    error.clear();
    match provider.raw_execute(sql, params) {
        Ok(affected) => Ok(Some(affected)),
        Err(e) => {
            if provider.in_transaction() {
                return Err(Error::Sql(e));
            }
            error.record(e);
            Ok(None)
        }
    }
}

/// Fetches rows with the shared failure policy (see [`run_statement`]).
pub(crate) fn run_query(
    provider: &ConnectionProvider,
    sql: &str,
    params: &ParamTable,
    error: &mut ErrorState,
) -> Result<Option<ResultSet>> {
    error.clear();
    match provider.raw_query(sql, params) {
        Ok(rows) => Ok(Some(rows)),
        Err(e) => {
            if provider.in_transaction() {
                return Err(Error::Sql(e));
            }
            error.record(e);
            Ok(None)
        }
    }
}

/// Prepare-time validation with the shared failure policy.
pub(crate) fn check_statement(
    provider: &ConnectionProvider,
    sql: &str,
    error: &mut ErrorState,
) -> Result<bool> {
    error.clear();
    match provider.raw_check(sql) {
        Ok(()) => Ok(true),
        Err(e) => {
            if provider.in_transaction() {
                return Err(Error::Sql(e));
            }
            error.record(e);
            Ok(false)
        }
    }
}
