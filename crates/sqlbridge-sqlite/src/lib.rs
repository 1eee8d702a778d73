//! # sqlbridge-sqlite
//!
//! The SQLite connection provider for `sqlbridge-core`, backed by
//! [`rusqlite`] with the bundled SQLite library.
//!
//! # How SQLite differs from the server backends
//!
//! - **`database` is a path**: the setting holds the database file
//!   path, or `:memory:` for a throwaway in-memory database.
//! - **Foreign keys start disabled**: enforcement is off for every
//!   fresh connection; opening through this crate re-enables it with
//!   `PRAGMA foreign_keys = ON`, matching careful-application advice
//!   from the SQLite documentation.
//! - **No server catalog**: there are no databases or users to manage,
//!   so only database-level connections exist here.
//! - **Rowid aliasing**: an `INTEGER PRIMARY KEY` column aliases the
//!   rowid, which is what the dialect's auto-increment rewrite relies
//!   on for `last_id()`.
//!
//! ## Example
//!
//! ```rust
//! use sqlbridge_core::ColumnDef;
//!
//! let db = sqlbridge_sqlite::open_in_memory().unwrap();
//!
//! let mut create = db.create_table("users");
//! create
//!     .column(ColumnDef::new("id", "int").primary_key().auto_increment())
//!     .column(ColumnDef::new("name", "varchar(50)").not_null());
//! assert!(create.execute().unwrap());
//!
//! let mut insert = db.insert("users");
//! insert.set_value("name", "Alice");
//! assert!(insert.execute().unwrap());
//! assert_eq!(insert.last_id(), Some(1));
//! ```

mod connection;

pub use connection::SqliteConnection;

use sqlbridge_core::{Database, Error, Result, Settings};

/// Opens a database connection described by the settings.
///
/// # Errors
///
/// [`Error::UnsupportedDriver`] when the settings name another backend,
/// [`Error::MissingSetting`] without a `database` path, and
/// [`Error::Sql`] when SQLite cannot open the file.
pub fn open(settings: &Settings) -> Result<Database> {
    if settings.driver != "sqlite" {
        return Err(Error::UnsupportedDriver(settings.driver.clone()));
    }
    let path = settings
        .database
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or(Error::MissingSetting("database"))?;
    let conn = rusqlite::Connection::open(path)
        .map_err(|e| Error::Sql(connection::to_sql_error(&e)))?;
    Database::connect(settings, Box::new(SqliteConnection::new(conn)))
}

/// Opens a throwaway in-memory database.
///
/// # Errors
///
/// [`Error::Sql`] when SQLite cannot allocate the database.
pub fn open_in_memory() -> Result<Database> {
    open(&Settings::new("sqlite").database(":memory:"))
}
