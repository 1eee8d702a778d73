//! The rusqlite-backed connection.

use rusqlite::types::Null;
use rusqlite::Statement;
use tracing::trace;

use sqlbridge_core::{Connection, ParamTable, ResultSet, SqlError, Value};

/// Converts a rusqlite error to the uniform code/message record.
pub(crate) fn to_sql_error(err: &rusqlite::Error) -> SqlError {
    match err {
        rusqlite::Error::SqliteFailure(e, message) => SqlError::new(
            Some(i64::from(e.extended_code)),
            message.clone().unwrap_or_else(|| e.to_string()),
        ),
        other => SqlError::message(other.to_string()),
    }
}

fn value_from_ref(value: rusqlite::types::ValueRef<'_>) -> Value {
    match value {
        rusqlite::types::ValueRef::Null => Value::Null,
        rusqlite::types::ValueRef::Integer(i) => Value::Int(i),
        rusqlite::types::ValueRef::Real(f) => Value::Float(f),
        rusqlite::types::ValueRef::Text(bytes) | rusqlite::types::ValueRef::Blob(bytes) => {
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn bind_params(stmt: &mut Statement<'_>, params: &ParamTable) -> rusqlite::Result<()> {
    for (name, value) in params.iter() {
        let Some(index) = stmt.parameter_index(name)? else {
            // a parameter rendered for a clause the statement no longer
            // carries; skip rather than fail the whole bind
            trace!(name, "parameter not present in statement");
            continue;
        };
        match value {
            Value::Null => stmt.raw_bind_parameter(index, Null)?,
            Value::Bool(b) => stmt.raw_bind_parameter(index, b)?,
            Value::Int(i) => stmt.raw_bind_parameter(index, i)?,
            Value::Float(f) => stmt.raw_bind_parameter(index, f)?,
            Value::Text(s) => stmt.raw_bind_parameter(index, s)?,
        }
    }
    Ok(())
}

/// A [`Connection`] over one rusqlite handle.
///
/// Statements go through rusqlite's prepared-statement cache, so
/// re-executing a builder reuses the compiled statement as long as its
/// SQL text is unchanged.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Wraps an open rusqlite connection.
    #[must_use]
    pub fn new(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// Gives the wrapped connection back.
    #[must_use]
    pub fn into_inner(self) -> rusqlite::Connection {
        self.conn
    }
}

impl Connection for SqliteConnection {
    fn check(&mut self, sql: &str) -> Result<(), SqlError> {
        self.conn
            .prepare_cached(sql)
            .map(|_| ())
            .map_err(|e| to_sql_error(&e))
    }

    fn execute(&mut self, sql: &str, params: &ParamTable) -> Result<u64, SqlError> {
        let run = || -> rusqlite::Result<u64> {
            let mut stmt = self.conn.prepare_cached(sql)?;
            bind_params(&mut stmt, params)?;
            let affected = stmt.raw_execute()?;
            Ok(affected as u64)
        };
        run().map_err(|e| to_sql_error(&e))
    }

    fn query(&mut self, sql: &str, params: &ParamTable) -> Result<ResultSet, SqlError> {
        let run = || -> rusqlite::Result<ResultSet> {
            let mut stmt = self.conn.prepare_cached(sql)?;
            bind_params(&mut stmt, params)?;
            let columns: Vec<String> = stmt
                .column_names()
                .iter()
                .map(|name| String::from(*name))
                .collect();
            let mut rows = Vec::new();
            let mut raw_rows = stmt.raw_query();
            while let Some(row) = raw_rows.next()? {
                let mut values = Vec::with_capacity(columns.len());
                for i in 0..columns.len() {
                    values.push(value_from_ref(row.get_ref(i)?));
                }
                rows.push(values);
            }
            Ok(ResultSet { columns, rows })
        };
        run().map_err(|e| to_sql_error(&e))
    }

    fn last_insert_id(&mut self) -> Result<i64, SqlError> {
        Ok(self.conn.last_insert_rowid())
    }

    fn begin(&mut self) -> Result<(), SqlError> {
        self.conn
            .execute_batch("BEGIN")
            .map_err(|e| to_sql_error(&e))
    }

    fn commit(&mut self) -> Result<(), SqlError> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| to_sql_error(&e))
    }

    fn rollback(&mut self) -> Result<(), SqlError> {
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| to_sql_error(&e))
    }

    fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> SqliteConnection {
        SqliteConnection::new(rusqlite::Connection::open_in_memory().expect("in-memory sqlite"))
    }

    #[test]
    fn test_execute_and_query_round_trip() {
        let mut conn = open();
        conn.execute("CREATE TABLE t (id INTEGER, name TEXT)", &ParamTable::new())
            .unwrap();
        let mut params = ParamTable::new();
        params.insert(":_id", Value::Int(1));
        params.insert(":_name", Value::Text(String::from("a")));
        let affected = conn
            .execute("INSERT INTO t (id, name) VALUES (:_id, :_name)", &params)
            .unwrap();
        assert_eq!(affected, 1);

        let rows = conn
            .query("SELECT id, name FROM t", &ParamTable::new())
            .unwrap();
        assert_eq!(rows.columns, vec!["id", "name"]);
        assert_eq!(
            rows.rows,
            vec![vec![Value::Int(1), Value::Text(String::from("a"))]]
        );
    }

    #[test]
    fn test_check_rejects_bad_sql() {
        let mut conn = open();
        let err = conn.check("SELECT FROM WHERE").unwrap_err();
        assert!(err.message.contains("syntax error"));
    }

    #[test]
    fn test_transaction_state_tracks_autocommit() {
        let mut conn = open();
        assert!(!conn.in_transaction());
        conn.begin().unwrap();
        assert!(conn.in_transaction());
        conn.rollback().unwrap();
        assert!(!conn.in_transaction());
    }
}
