//! SQLite dialect implementation.
//!
//! # How SQLite differs from the server backends
//!
//! - **Identifier quoting**: double quotes are the standard style (SQLite
//!   also accepts backticks and brackets).
//! - **Auto-increment**: `INTEGER PRIMARY KEY` aliases the rowid, so the
//!   auto-increment type rewrite returns a fixed `INTEGER` regardless of
//!   the requested base type.
//! - **Foreign keys**: enforcement is disabled by default and must be
//!   re-enabled with `PRAGMA foreign_keys = ON` on every connection open.
//! - **No server catalog**: there are no databases or users to list, and
//!   constraints cannot be added or dropped after table creation.

use super::{Dialect, Driver};

/// SQLite dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn driver(&self) -> Driver {
        Driver::Sqlite
    }

    fn escape_identifier(&self, identifier: &str) -> String {
        format!("\"{identifier}\"")
    }

    fn escape_value(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn sql_column_auto_increment(&self, _base_type: &str) -> String {
        // Only INTEGER PRIMARY KEY (not INT) aliases the rowid and
        // auto-assigns on insert.
        String::from("INTEGER")
    }

    fn sql_random(&self, seed: Option<i64>) -> String {
        match seed {
            Some(s) => format!("random({s})"),
            None => String::from("random()"),
        }
    }

    fn sql_show_tables(&self) -> &'static str {
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name"
    }

    fn sql_enable_foreign_keys(&self) -> Option<&'static str> {
        Some("PRAGMA foreign_keys = ON")
    }

    fn sql_disable_foreign_keys(&self) -> Option<&'static str> {
        Some("PRAGMA foreign_keys = OFF")
    }

    fn sql_foreign_key_check(&self) -> Option<&'static str> {
        Some("PRAGMA foreign_keys")
    }

    fn required_settings(&self) -> &'static [&'static str] {
        // `database` is the full path, or `:memory:` for a throwaway one.
        &["database"]
    }
}
