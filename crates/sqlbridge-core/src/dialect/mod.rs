//! Per-backend SQL generation rules.
//!
//! Different databases disagree on identifier quoting, auto-increment
//! column syntax, random functions, foreign-key control and catalog
//! queries. This module defines the [`Dialect`] contract and one
//! implementation per backend, selected through [`Driver`].
//!
//! Dialects only *generate* SQL; execution and error policy live in the
//! connection provider.

mod mssql;
mod mysql;
mod postgres;
mod sqlite;

pub use mssql::MssqlDialect;
pub use mysql::MysqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::error::{Error, Result};

/// The supported backends.
///
/// `Mssql` is recognized for SQL generation but rejected by the
/// connection factory (partial support, matching the reference behavior).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// SQLite 3.
    Sqlite,
    /// MySQL / MariaDB.
    Mysql,
    /// PostgreSQL.
    Postgres,
    /// Microsoft SQL Server (SQL generation only).
    Mssql,
}

static SQLITE: SqliteDialect = SqliteDialect::new();
static MYSQL: MysqlDialect = MysqlDialect::new();
static POSTGRES: PostgresDialect = PostgresDialect::new();
static MSSQL: MssqlDialect = MssqlDialect::new();

impl Driver {
    /// Parses a `driver` setting value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDriver`] for unrecognized names.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "sqlite" => Ok(Self::Sqlite),
            "mysql" => Ok(Self::Mysql),
            "pgsql" => Ok(Self::Postgres),
            "mssql" => Ok(Self::Mssql),
            other => Err(Error::UnsupportedDriver(String::from(other))),
        }
    }

    /// Returns the canonical driver name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Mysql => "mysql",
            Self::Postgres => "pgsql",
            Self::Mssql => "mssql",
        }
    }

    /// Returns the dialect implementation for this backend.
    #[must_use]
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            Self::Sqlite => &SQLITE,
            Self::Mysql => &MYSQL,
            Self::Postgres => &POSTGRES,
            Self::Mssql => &MSSQL,
        }
    }

    /// Whether the connection factory can open this backend.
    #[must_use]
    pub const fn connectable(self) -> bool {
        !matches!(self, Self::Mssql)
    }
}

/// Referential action for foreign-key rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKeyAction {
    /// No action.
    NoAction,
    /// Restrict deletion/update.
    Restrict,
    /// Cascade the operation.
    Cascade,
    /// Set to NULL.
    SetNull,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of the action.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
        }
    }
}

/// Per-backend SQL generation contract.
///
/// Catalog and server-lifecycle methods return `None` on backends that
/// have no equivalent statement (e.g. SQLite has no user catalog).
pub trait Dialect: std::fmt::Debug + Sync {
    /// The backend this dialect generates SQL for.
    fn driver(&self) -> Driver;

    /// Wraps a single identifier in the backend's quote characters.
    fn escape_identifier(&self, identifier: &str) -> String;

    /// Quotes a literal for contexts where parameter binding is not
    /// available (DDL default values).
    fn escape_value(&self, value: &str) -> String;

    /// Escapes a possibly dot-qualified name, quoting each segment
    /// independently (`a.b` becomes `"a"."b"`).
    fn escape(&self, name: &str) -> String {
        name.split('.')
            .map(|part| self.escape_identifier(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Escapes a list of possibly qualified names.
    fn escape_list(&self, names: &[&str]) -> Vec<String> {
        names.iter().map(|n| self.escape(n)).collect()
    }

    /// Returns the column type expression for an auto-increment column,
    /// derived from the requested base type.
    fn sql_column_auto_increment(&self, base_type: &str) -> String;

    /// Returns the backend's random-ordering function call.
    fn sql_random(&self, seed: Option<i64>) -> String;

    /// Catalog query listing the tables of the current database.
    fn sql_show_tables(&self) -> &'static str;

    /// Catalog query listing databases (server dialects only).
    fn sql_show_databases(&self) -> Option<&'static str> {
        None
    }

    /// Catalog query listing users (server dialects only).
    fn sql_show_users(&self) -> Option<&'static str> {
        None
    }

    /// Trailing options appended to CREATE TABLE statements.
    fn sql_create_table_options(&self) -> &'static str {
        ""
    }

    /// Statement enabling foreign-key enforcement, when the backend
    /// controls it per connection or per session.
    fn sql_enable_foreign_keys(&self) -> Option<&'static str> {
        None
    }

    /// Statement disabling foreign-key enforcement.
    fn sql_disable_foreign_keys(&self) -> Option<&'static str> {
        None
    }

    /// Query reporting whether foreign-key enforcement is active.
    ///
    /// Only meaningful on SQLite, which disables enforcement per
    /// connection; other backends report `None` and enforcement is
    /// assumed global.
    fn sql_foreign_key_check(&self) -> Option<&'static str> {
        None
    }

    /// ALTER TABLE statement adding a named foreign key, or `None` when
    /// the backend cannot alter constraints (SQLite).
    fn sql_add_foreign_key(
        &self,
        fk_name: &str,
        src_table: &str,
        src_column: &str,
        ref_table: &str,
        ref_column: &str,
    ) -> Option<String> {
        let _ = (fk_name, src_table, src_column, ref_table, ref_column);
        None
    }

    /// ALTER TABLE statement dropping a named foreign key.
    fn sql_drop_foreign_key(&self, fk_name: &str, table: &str) -> Option<String> {
        let _ = (fk_name, table);
        None
    }

    /// Parametrized existence query for a database name; binds `:_database`.
    fn sql_database_exists(&self) -> Option<&'static str> {
        None
    }

    /// CREATE DATABASE statement (server dialects only).
    fn sql_create_database(&self, name: &str, owner: Option<&str>) -> Option<String> {
        let _ = (name, owner);
        None
    }

    /// DROP DATABASE statement.
    fn sql_drop_database(&self, name: &str, if_exists: bool) -> Option<String> {
        if self.sql_show_databases().is_none() {
            return None;
        }
        Some(format!(
            "DROP DATABASE {}{}",
            if if_exists { "IF EXISTS " } else { "" },
            self.escape(name)
        ))
    }

    /// CREATE USER statement (server dialects only).
    fn sql_create_user(
        &self,
        name: &str,
        password: &str,
        hostname: Option<&str>,
    ) -> Option<String> {
        let _ = (name, password, hostname);
        None
    }

    /// DROP USER statement (server dialects only).
    fn sql_drop_user(&self, name: &str, if_exists: bool, hostname: Option<&str>) -> Option<String> {
        let _ = (name, if_exists, hostname);
        None
    }

    /// GRANT statement giving a user access to a database.
    fn sql_grant_user(
        &self,
        database: &str,
        user: &str,
        hostname: Option<&str>,
    ) -> Option<String> {
        let _ = (database, user, hostname);
        None
    }

    /// Settings keys this backend requires to open a connection.
    fn required_settings(&self) -> &'static [&'static str];

    /// Whether server-level commands (databases, users) are available.
    fn supports_server_commands(&self) -> bool {
        false
    }
}
