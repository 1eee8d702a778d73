//! The database-level facade.

use std::rc::Rc;

use crate::connection::{Connection, ConnectionProvider};
use crate::error::Result;
use crate::params::ParamTable;
use crate::query::{CreateTable, Delete, Insert, Select, Update};
use crate::settings::Settings;
use crate::value::Value;

use super::Table;

/// A connection to one SQL database.
///
/// Hands out pre-wired query builders and schema helpers. All builders
/// created from one `Database` share its connection provider; the whole
/// object graph is single-threaded by design.
pub struct Database {
    provider: Rc<ConnectionProvider>,
}

impl Database {
    /// Validates the settings and wraps the backend connection.
    ///
    /// # Errors
    ///
    /// Configuration errors per
    /// [`ConnectionProvider::connect`].
    pub fn connect(settings: &Settings, connection: Box<dyn Connection>) -> Result<Self> {
        Ok(Self {
            provider: ConnectionProvider::connect(settings, connection)?,
        })
    }

    /// The shared connection provider, for building standalone queries.
    #[must_use]
    pub fn provider(&self) -> &Rc<ConnectionProvider> {
        &self.provider
    }

    /// The backend name (`sqlite`, `mysql`, `pgsql`).
    #[must_use]
    pub fn driver_name(&self) -> &'static str {
        self.provider.driver().name()
    }

    /// Releases the connection; safe to call more than once.
    pub fn close(&self) {
        self.provider.close();
    }

    /// Scopes operations to one table.
    #[must_use]
    pub fn table(&self, name: &str) -> Table {
        Table::new(Rc::clone(&self.provider), name)
    }

    /// A new SELECT builder (set the source with `from`).
    #[must_use]
    pub fn select(&self) -> Select {
        Select::new(Rc::clone(&self.provider))
    }

    /// A new INSERT builder for the given table.
    #[must_use]
    pub fn insert(&self, table: &str) -> Insert {
        Insert::new(Rc::clone(&self.provider), table)
    }

    /// A new UPDATE builder for the given table.
    #[must_use]
    pub fn update(&self, table: &str) -> Update {
        Update::new(Rc::clone(&self.provider), table)
    }

    /// A new DELETE builder for the given table.
    #[must_use]
    pub fn delete(&self, table: &str) -> Delete {
        Delete::new(Rc::clone(&self.provider), table)
    }

    /// A new CREATE TABLE builder for the given table.
    #[must_use]
    pub fn create_table(&self, table: &str) -> CreateTable {
        CreateTable::new(Rc::clone(&self.provider), table)
    }

    /// Whether a table exists in the current database.
    #[must_use]
    pub fn table_exists(&self, name: &str) -> bool {
        super::table_exists(&self.provider, name)
    }

    /// Drops a table.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) inside a transaction.
    pub fn drop_table(&self, name: &str) -> Result<bool> {
        super::drop_table(&self.provider, name)
    }

    /// Renames a table.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) inside a transaction.
    pub fn rename_table(&self, current: &str, new_name: &str) -> Result<bool> {
        super::rename_table(&self.provider, current, new_name)
    }

    /// Lists the tables of the current database.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) inside a transaction.
    pub fn get_tables(&self) -> Result<Vec<String>> {
        let sql = self.provider.dialect().sql_show_tables();
        let rows = self.provider.fetch(sql, &ParamTable::new())?;
        Ok(rows
            .map(|r| {
                r.first_column()
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::Text(name) => Some(name),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Enables foreign-key enforcement; a no-op on backends where it is
    /// always on.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) inside a transaction.
    pub fn enable_foreign_keys(&self) -> Result<bool> {
        match self.provider.dialect().sql_enable_foreign_keys() {
            Some(sql) => self.provider.run(sql, &ParamTable::new()),
            None => Ok(true),
        }
    }

    /// Disables foreign-key enforcement; a no-op on backends where it
    /// cannot be turned off.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) inside a transaction.
    pub fn disable_foreign_keys(&self) -> Result<bool> {
        match self.provider.dialect().sql_disable_foreign_keys() {
            Some(sql) => self.provider.run(sql, &ParamTable::new()),
            None => Ok(true),
        }
    }

    /// Whether foreign-key enforcement is active. Only SQLite can
    /// answer; other backends report `false` and enforce globally.
    #[must_use]
    pub fn is_foreign_key_enabled(&self) -> bool {
        let Some(sql) = self.provider.dialect().sql_foreign_key_check() else {
            return false;
        };
        self.provider
            .raw_query(sql, &ParamTable::new())
            .ok()
            .and_then(|rows| rows.first_value().cloned())
            .is_some_and(|v| v == Value::Int(1))
    }

    /// Adds a named foreign key to an existing table. Reports `false`
    /// on backends that cannot alter constraints (SQLite).
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) inside a transaction.
    pub fn add_foreign_key(
        &self,
        fk_name: &str,
        src_table: &str,
        src_column: &str,
        ref_table: &str,
        ref_column: &str,
    ) -> Result<bool> {
        let sql = self.provider.dialect().sql_add_foreign_key(
            fk_name, src_table, src_column, ref_table, ref_column,
        );
        match sql {
            Some(sql) => self.provider.run(&sql, &ParamTable::new()),
            None => Ok(false),
        }
    }

    /// Drops a named foreign key. Reports `false` on backends that
    /// cannot alter constraints (SQLite).
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) inside a transaction.
    pub fn drop_foreign_key(&self, fk_name: &str, table: &str) -> Result<bool> {
        match self.provider.dialect().sql_drop_foreign_key(fk_name, table) {
            Some(sql) => self.provider.run(&sql, &ParamTable::new()),
            None => Ok(false),
        }
    }

    /// Whether a transaction is currently open.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.provider.in_transaction()
    }

    /// Opens a transaction; a no-op guard when one is already open.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) when the backend rejects it.
    pub fn begin_transaction(&self) -> Result<()> {
        self.provider.begin()
    }

    /// Commits the open transaction; a no-op when none is open.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) when the backend rejects it.
    pub fn commit(&self) -> Result<()> {
        self.provider.commit()
    }

    /// Rolls the open transaction back.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) when the backend rejects it.
    pub fn rollback(&self) -> Result<()> {
        self.provider.rollback()
    }

    /// Whether the most recent provider-level operation failed.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.provider.has_error()
    }

    /// Code of the last recorded error.
    #[must_use]
    pub fn error_code(&self) -> Option<i64> {
        self.provider.error_code()
    }

    /// Message of the last recorded error.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.provider.error_message()
    }
}
