//! The connection contract and the shared connection provider.
//!
//! The query builders never talk to a database library directly: they go
//! through the [`Connection`] capability, which a backend crate
//! implements over its native prepared-statement API (the SQLite backend
//! lives in `sqlbridge-sqlite`). The [`ConnectionProvider`] wraps one
//! connection, carries the selected dialect and the last-error record,
//! and applies the transaction-aware failure policy.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::dialect::{Dialect, Driver};
use crate::error::{Error, Result, SqlError};
use crate::output::OutputFormat;
use crate::params::ParamTable;
use crate::settings::Settings;
use crate::value::Value;

/// Rows fetched by a statement: ordered column names plus value rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Column names, in select order.
    pub columns: Vec<String>,
    /// One `Vec<Value>` per row, aligned with `columns`.
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// First column of the first row, if any.
    #[must_use]
    pub fn first_value(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }

    /// All first-column values.
    #[must_use]
    pub fn first_column(&self) -> Vec<Value> {
        self.rows
            .iter()
            .filter_map(|row| row.first().cloned())
            .collect()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows were fetched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The opaque prepared-statement capability a backend supplies.
///
/// All methods report failures as [`SqlError`]; native driver errors must
/// be converted at this boundary and never escape raw.
pub trait Connection {
    /// Prepares the statement without executing it, validating syntax
    /// and referenced objects as far as the backend allows.
    fn check(&mut self, sql: &str) -> std::result::Result<(), SqlError>;

    /// Prepares, binds and executes a statement; returns rows affected.
    fn execute(&mut self, sql: &str, params: &ParamTable)
        -> std::result::Result<u64, SqlError>;

    /// Prepares, binds and executes a statement; fetches all rows.
    fn query(
        &mut self,
        sql: &str,
        params: &ParamTable,
    ) -> std::result::Result<ResultSet, SqlError>;

    /// The row id / sequence value assigned by the last insert.
    fn last_insert_id(&mut self) -> std::result::Result<i64, SqlError>;

    /// Opens a transaction.
    fn begin(&mut self) -> std::result::Result<(), SqlError>;

    /// Commits the open transaction.
    fn commit(&mut self) -> std::result::Result<(), SqlError>;

    /// Rolls the open transaction back.
    fn rollback(&mut self) -> std::result::Result<(), SqlError>;

    /// Whether a transaction is currently open.
    fn in_transaction(&self) -> bool;
}

/// Owns one [`Connection`] plus the state every query object shares: the
/// dialect, the default output format and the last-error record.
///
/// Shared by the datasource facades and all query builders through
/// `Rc` — the whole stack is single-threaded by design (see the
/// concurrency notes in the crate docs). The connection slot becomes
/// `None` on [`close`](Self::close); releasing twice is safe.
pub struct ConnectionProvider {
    driver: Driver,
    dialect: &'static dyn Dialect,
    default_format: OutputFormat,
    hostname: Option<String>,
    conn: RefCell<Option<Box<dyn Connection>>>,
    error: RefCell<Option<SqlError>>,
}

impl std::fmt::Debug for ConnectionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionProvider")
            .field("driver", &self.driver)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl ConnectionProvider {
    /// Validates settings and wires a database-level provider.
    ///
    /// For SQLite this re-enables foreign-key enforcement, which the
    /// engine turns off on every fresh connection.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedDriver`] for unknown or non-connectable
    /// backends, [`Error::MissingSetting`] when a backend-required key is
    /// absent, [`Error::InvalidArgument`] for an unknown
    /// `default_output_format`.
    pub fn connect(settings: &Settings, connection: Box<dyn Connection>) -> Result<Rc<Self>> {
        Self::open(settings, connection, false)
    }

    /// Validates settings and wires a server-level provider (no
    /// `database` required, server commands must be supported).
    ///
    /// # Errors
    ///
    /// As [`connect`](Self::connect), plus [`Error::Unsupported`] when
    /// the backend has no server commands.
    pub fn connect_server(
        settings: &Settings,
        connection: Box<dyn Connection>,
    ) -> Result<Rc<Self>> {
        Self::open(settings, connection, true)
    }

    fn open(settings: &Settings, connection: Box<dyn Connection>, server: bool) -> Result<Rc<Self>> {
        let driver = Driver::from_name(&settings.driver)?;
        if !driver.connectable() {
            return Err(Error::UnsupportedDriver(settings.driver.clone()));
        }
        let dialect = driver.dialect();
        if server && !dialect.supports_server_commands() {
            return Err(Error::Unsupported {
                backend: driver.name(),
                operation: "server connection",
            });
        }
        for &key in dialect.required_settings() {
            if server && key == "database" {
                continue;
            }
            if settings.get(key).map_or(true, str::is_empty) {
                return Err(Error::MissingSetting(key));
            }
        }
        let default_format = match settings.default_output_format.as_deref() {
            Some(tag) => OutputFormat::parse(tag)?,
            None => OutputFormat::default(),
        };

        let provider = Rc::new(Self {
            driver,
            dialect,
            default_format,
            hostname: settings.hostname.clone(),
            conn: RefCell::new(Some(connection)),
            error: RefCell::new(None),
        });

        if let Some(sql) = dialect.sql_enable_foreign_keys() {
            if driver == Driver::Sqlite {
                provider
                    .raw_execute(sql, &ParamTable::new())
                    .map_err(Error::Sql)?;
            }
        }
        Ok(provider)
    }

    /// Creates a provider with no connection attached, for SQL
    /// generation without a database. Executing through it reports a
    /// closed-connection error.
    #[must_use]
    pub fn detached(driver: Driver) -> Rc<Self> {
        Rc::new(Self {
            driver,
            dialect: driver.dialect(),
            default_format: OutputFormat::default(),
            hostname: None,
            conn: RefCell::new(None),
            error: RefCell::new(None),
        })
    }

    /// The backend this provider is connected to.
    #[must_use]
    pub fn driver(&self) -> Driver {
        self.driver
    }

    /// The dialect selected for this backend.
    #[must_use]
    pub fn dialect(&self) -> &'static dyn Dialect {
        self.dialect
    }

    /// The output format used when a fetch does not name one.
    #[must_use]
    pub fn default_format(&self) -> OutputFormat {
        self.default_format
    }

    /// The configured hostname, if any.
    #[must_use]
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// Releases the connection. Safe to call more than once.
    pub fn close(&self) {
        self.conn.borrow_mut().take();
    }

    /// Whether the connection has been released.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.conn.borrow().is_none()
    }

    // -- error record ----------------------------------------------------

    /// Whether the most recent provider-level operation failed.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.borrow().is_some()
    }

    /// Code of the last recorded error.
    #[must_use]
    pub fn error_code(&self) -> Option<i64> {
        self.error.borrow().as_ref().and_then(|e| e.code)
    }

    /// Message of the last recorded error.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.borrow().as_ref().map(|e| e.message.clone())
    }

    pub(crate) fn clear_error(&self) {
        self.error.borrow_mut().take();
    }

    pub(crate) fn record_error(&self, error: &SqlError) {
        warn!(code = ?error.code, message = %error.message, "statement failed");
        *self.error.borrow_mut() = Some(error.clone());
    }

    // -- raw statement access (no error policy) --------------------------

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut dyn Connection) -> std::result::Result<T, SqlError>,
    ) -> std::result::Result<T, SqlError> {
        let mut slot = self.conn.borrow_mut();
        match slot.as_mut() {
            Some(conn) => f(conn.as_mut()),
            None => Err(SqlError::closed()),
        }
    }

    pub(crate) fn raw_check(&self, sql: &str) -> std::result::Result<(), SqlError> {
        debug!(sql = %sql, "preparing statement");
        self.with_conn(|conn| conn.check(sql))
    }

    pub(crate) fn raw_execute(
        &self,
        sql: &str,
        params: &ParamTable,
    ) -> std::result::Result<u64, SqlError> {
        debug!(sql = %sql, params = params.len(), "executing statement");
        self.with_conn(|conn| conn.execute(sql, params))
    }

    pub(crate) fn raw_query(
        &self,
        sql: &str,
        params: &ParamTable,
    ) -> std::result::Result<ResultSet, SqlError> {
        debug!(sql = %sql, params = params.len(), "querying statement");
        self.with_conn(|conn| conn.query(sql, params))
    }

    pub(crate) fn raw_last_insert_id(&self) -> std::result::Result<i64, SqlError> {
        self.with_conn(|conn| conn.last_insert_id())
    }

    // -- transaction-aware helpers ---------------------------------------

    /// Executes a standalone statement with the shared failure policy:
    /// success is `Ok(true)`; a failure is recorded and reported as
    /// `Ok(false)` — unless a transaction is open, in which case it
    /// propagates as [`Error::Sql`].
    ///
    /// # Errors
    ///
    /// [`Error::Sql`] when the statement fails inside a transaction.
    pub fn run(&self, sql: &str, params: &ParamTable) -> Result<bool> {
        self.clear_error();
        match self.raw_execute(sql, params) {
            Ok(_) => Ok(true),
            Err(e) => {
                if self.in_transaction() {
                    return Err(Error::Sql(e));
                }
                self.record_error(&e);
                Ok(false)
            }
        }
    }

    /// Fetches rows for a standalone statement with the shared failure
    /// policy; a recorded failure yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`] when the statement fails inside a transaction.
    pub fn fetch(&self, sql: &str, params: &ParamTable) -> Result<Option<ResultSet>> {
        self.clear_error();
        match self.raw_query(sql, params) {
            Ok(rows) => Ok(Some(rows)),
            Err(e) => {
                if self.in_transaction() {
                    return Err(Error::Sql(e));
                }
                self.record_error(&e);
                Ok(None)
            }
        }
    }

    /// Whether a transaction is currently open.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.conn
            .borrow()
            .as_ref()
            .is_some_and(|conn| conn.in_transaction())
    }

    /// Opens a transaction. A no-op guard when one is already open —
    /// nesting is not supported.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`] when the backend rejects the begin.
    pub fn begin(&self) -> Result<()> {
        if self.in_transaction() {
            return Ok(());
        }
        self.with_conn(|conn| conn.begin()).map_err(Error::Sql)
    }

    /// Commits the open transaction; a no-op when none is open.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`] when the backend rejects the commit.
    pub fn commit(&self) -> Result<()> {
        if !self.in_transaction() {
            return Ok(());
        }
        self.with_conn(|conn| conn.commit()).map_err(Error::Sql)
    }

    /// Rolls the open transaction back.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`] when the backend rejects the rollback.
    pub fn rollback(&self) -> Result<()> {
        self.with_conn(|conn| conn.rollback()).map_err(Error::Sql)
    }
}
