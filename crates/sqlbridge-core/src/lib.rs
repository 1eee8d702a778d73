//! # sqlbridge-core
//!
//! A database-agnostic SQL abstraction layer: fluent builders for
//! parametrized CREATE/SELECT/INSERT/UPDATE/DELETE statements, a
//! per-backend [`Dialect`] for escaping and DDL quirks, and a
//! prepared-statement execution pathway with parameter binding and
//! basic transactions.
//!
//! This crate contains no database driver; backends implement the
//! [`Connection`] capability (the SQLite binding lives in
//! `sqlbridge-sqlite`). Builders can also run standalone against a
//! detached provider to generate SQL without a database.
//!
//! ## SQL injection prevention
//!
//! Every condition value and every INSERT/UPDATE column value is bound
//! through a named parameter; identifiers go through the dialect's
//! quoting. Parameter names derive from column names and are
//! disambiguated on collision, so filtering the same column twice — or
//! expanding an IN list — always binds cleanly:
//!
//! ```rust
//! use sqlbridge_core::{ConnectionProvider, Driver, Select};
//!
//! let provider = ConnectionProvider::detached(Driver::Sqlite);
//! let mut query = Select::new(provider);
//! query.columns(&["id", "name"]).from("users");
//! query.where_clause().greater_equal("age", 18).in_list("id", vec![1, 2]);
//!
//! let (sql, params) = query.build();
//! assert_eq!(
//!     sql,
//!     "SELECT \"id\", \"name\" FROM \"users\" \
//!      WHERE \"age\" >= :__age AND \"id\" IN (:__id, :__id_2)"
//! );
//! assert_eq!(params.len(), 3);
//! ```
//!
//! ## Concurrency model
//!
//! Single-threaded and synchronous by design: one native connection per
//! datasource, shared through `Rc`, no internal locking or async
//! scheduling. Builders mutate accumulated state and are not meant to
//! be shared across threads. Transactions are explicit and non-nested;
//! a statement failure inside an open transaction raises instead of
//! being recorded, so a half-applied transaction is never silent.

pub mod connection;
pub mod datasource;
pub mod dialect;
pub mod error;
pub mod output;
pub mod params;
pub mod query;
pub mod settings;
pub mod value;

pub use connection::{Connection, ConnectionProvider, ResultSet};
pub use datasource::{Database, Server, Table};
pub use dialect::{Dialect, Driver, ForeignKeyAction};
pub use error::{Error, Result, SqlError};
pub use output::{OutputFormat, QueryOutput};
pub use params::ParamTable;
pub use query::{
    column_ref, ColumnDef, ConditionValue, Conditions, CreateTable, DefaultValue, Delete, Insert,
    Select, Update,
};
pub use settings::Settings;
pub use value::{ToValue, Value};
