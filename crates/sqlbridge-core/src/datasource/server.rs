//! The server-level facade (databases and users).

use std::rc::Rc;

use crate::connection::{Connection, ConnectionProvider};
use crate::error::{Error, Result};
use crate::params::ParamTable;
use crate::settings::Settings;
use crate::value::Value;

/// A server-scoped connection for database and user lifecycle commands.
///
/// Only backends with server commands (MySQL, Postgres) accept a server
/// connection; the `database` setting is not required for one.
#[derive(Debug)]
pub struct Server {
    provider: Rc<ConnectionProvider>,
}

impl Server {
    /// Validates the settings and wraps the backend connection.
    ///
    /// # Errors
    ///
    /// Configuration errors per
    /// [`ConnectionProvider::connect_server`].
    pub fn connect(settings: &Settings, connection: Box<dyn Connection>) -> Result<Self> {
        Ok(Self {
            provider: ConnectionProvider::connect_server(settings, connection)?,
        })
    }

    /// The backend name.
    #[must_use]
    pub fn driver_name(&self) -> &'static str {
        self.provider.driver().name()
    }

    /// Releases the connection; safe to call more than once.
    pub fn close(&self) {
        self.provider.close();
    }

    fn require(&self, operation: &'static str, sql: Option<String>) -> Result<String> {
        sql.ok_or(Error::Unsupported {
            backend: self.provider.driver().name(),
            operation,
        })
    }

    fn fetch_names(&self, sql: &str) -> Result<Vec<String>> {
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

    /// Lists the databases on the server.
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] on backends without a database catalog;
    /// [`Error::Sql`] inside a transaction.
    pub fn get_databases(&self) -> Result<Vec<String>> {
        let sql = self.require(
            "list databases",
            self.provider.dialect().sql_show_databases().map(String::from),
        )?;
        self.fetch_names(&sql)
    }

    /// Lists the user accounts on the server.
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] on backends without a user catalog;
    /// [`Error::Sql`] inside a transaction.
    pub fn get_users(&self) -> Result<Vec<String>> {
        let sql = self.require(
            "list users",
            self.provider.dialect().sql_show_users().map(String::from),
        )?;
        self.fetch_names(&sql)
    }

    /// Whether a database with the given name exists.
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] / [`Error::Sql`] as for
    /// [`get_databases`](Self::get_databases).
    pub fn database_exists(&self, name: &str) -> Result<bool> {
        let sql = self.require(
            "database existence check",
            self.provider.dialect().sql_database_exists().map(String::from),
        )?;
        let mut params = ParamTable::new();
        params.insert(":_database", Value::Text(String::from(name)));
        let rows = self.provider.fetch(&sql, &params)?;
        Ok(rows.is_some_and(|r| match r.first_value() {
            Some(Value::Int(n)) => *n > 0,
            Some(Value::Text(s)) => !s.is_empty(),
            Some(Value::Bool(b)) => *b,
            _ => false,
        }))
    }

    /// Whether a user with the given name exists.
    ///
    /// # Errors
    ///
    /// As for [`get_users`](Self::get_users).
    pub fn user_exists(&self, name: &str) -> Result<bool> {
        Ok(self.get_users()?.iter().any(|u| u == name))
    }

    /// Creates a database, optionally owned by the given user.
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] / [`Error::Sql`] per the shared policy.
    pub fn create_database(&self, name: &str, owner: Option<&str>) -> Result<bool> {
        let sql = self.require(
            "create database",
            self.provider.dialect().sql_create_database(name, owner),
        )?;
        self.provider.run(&sql, &ParamTable::new())
    }

    /// Drops a database.
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] / [`Error::Sql`] per the shared policy.
    pub fn drop_database(&self, name: &str, if_exists: bool) -> Result<bool> {
        let sql = self.require(
            "drop database",
            self.provider.dialect().sql_drop_database(name, if_exists),
        )?;
        self.provider.run(&sql, &ParamTable::new())
    }

    /// Creates a user account.
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] / [`Error::Sql`] per the shared policy.
    pub fn create_user(&self, name: &str, password: &str) -> Result<bool> {
        let sql = self.require(
            "create user",
            self.provider
                .dialect()
                .sql_create_user(name, password, self.provider.hostname()),
        )?;
        self.provider.run(&sql, &ParamTable::new())
    }

    /// Drops a user account.
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] / [`Error::Sql`] per the shared policy.
    pub fn drop_user(&self, name: &str, if_exists: bool) -> Result<bool> {
        let sql = self.require(
            "drop user",
            self.provider
                .dialect()
                .sql_drop_user(name, if_exists, self.provider.hostname()),
        )?;
        self.provider.run(&sql, &ParamTable::new())
    }

    /// Grants a user access to a database.
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] / [`Error::Sql`] per the shared policy.
    pub fn grant_user(&self, database: &str, user: &str) -> Result<bool> {
        let sql = self.require(
            "grant user",
            self.provider
                .dialect()
                .sql_grant_user(database, user, self.provider.hostname()),
        )?;
        self.provider.run(&sql, &ParamTable::new())
    }

    /// Creates a user, creates a database and grants the user access,
    /// reporting whether all three steps succeeded.
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] / [`Error::Sql`] per the shared policy.
    pub fn create_database_and_user(
        &self,
        database: &str,
        user: &str,
        password: &str,
    ) -> Result<bool> {
        Ok(self.create_user(user, password)?
            && self.create_database(database, None)?
            && self.grant_user(database, user)?)
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

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use std::result::Result;

    use super::*;
    use crate::connection::ResultSet;
    use crate::error::SqlError;

    /// Records executed SQL and answers queries with canned rows.
    #[derive(Default)]
    struct MockConnection {
        log: Rc<RefCell<Vec<String>>>,
        rows: ResultSet,
        tx: bool,
    }

    impl Connection for MockConnection {
        fn check(&mut self, sql: &str) -> Result<(), SqlError> {
            self.log.borrow_mut().push(String::from(sql));
            Ok(())
        }

        fn execute(&mut self, sql: &str, _params: &ParamTable) -> Result<u64, SqlError> {
            self.log.borrow_mut().push(String::from(sql));
            Ok(1)
        }

        fn query(&mut self, sql: &str, _params: &ParamTable) -> Result<ResultSet, SqlError> {
            self.log.borrow_mut().push(String::from(sql));
            Ok(self.rows.clone())
        }

        fn last_insert_id(&mut self) -> Result<i64, SqlError> {
            Ok(0)
        }

        fn begin(&mut self) -> Result<(), SqlError> {
            self.tx = true;
            Ok(())
        }

        fn commit(&mut self) -> Result<(), SqlError> {
            self.tx = false;
            Ok(())
        }

        fn rollback(&mut self) -> Result<(), SqlError> {
            self.tx = false;
            Ok(())
        }

        fn in_transaction(&self) -> bool {
            self.tx
        }
    }

    fn mysql_settings() -> Settings {
        Settings::new("mysql")
            .hostname("db.example")
            .credentials("root", "secret")
    }

    fn server_with_rows(rows: ResultSet) -> (Server, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mock = MockConnection {
            log: Rc::clone(&log),
            rows,
            tx: false,
        };
        let server = Server::connect(&mysql_settings(), Box::new(mock)).unwrap();
        (server, log)
    }

    #[test]
    fn test_server_connection_rejected_for_sqlite() {
        let settings = Settings::new("sqlite").database(":memory:");
        let err = Server::connect(&settings, Box::<MockConnection>::default()).unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }));
    }

    #[test]
    fn test_server_connection_requires_credentials() {
        let settings = Settings::new("mysql").hostname("db.example");
        let err = Server::connect(&settings, Box::<MockConnection>::default()).unwrap_err();
        assert!(matches!(err, Error::MissingSetting("username")));
    }

    #[test]
    fn test_database_setting_waived_for_server_connection() {
        // a database-level mysql connection would require `database`
        let (server, _log) = server_with_rows(ResultSet::default());
        assert_eq!(server.driver_name(), "mysql");
    }

    #[test]
    fn test_create_database_and_user_runs_all_statements() {
        let (server, log) = server_with_rows(ResultSet::default());
        assert!(server.create_database_and_user("app", "bob", "pw").unwrap());
        let log = log.borrow();
        assert_eq!(
            *log,
            vec![
                String::from("CREATE USER `bob`@`db.example` IDENTIFIED BY 'pw'"),
                String::from("CREATE DATABASE `app`"),
                String::from("GRANT ALL ON `app`.* TO `bob`@`db.example`"),
            ]
        );
    }

    #[test]
    fn test_get_databases_reads_first_column() {
        let rows = ResultSet {
            columns: vec![String::from("Database")],
            rows: vec![
                vec![Value::Text(String::from("app"))],
                vec![Value::Text(String::from("test"))],
            ],
        };
        let (server, log) = server_with_rows(rows);
        assert_eq!(server.get_databases().unwrap(), vec!["app", "test"]);
        assert_eq!(log.borrow().last().unwrap(), "SHOW DATABASES");
    }

    #[test]
    fn test_database_exists_is_truthy_on_named_row() {
        let rows = ResultSet {
            columns: vec![String::from("SCHEMA_NAME")],
            rows: vec![vec![Value::Text(String::from("app"))]],
        };
        let (server, _log) = server_with_rows(rows);
        assert!(server.database_exists("app").unwrap());

        let (server, _log) = server_with_rows(ResultSet::default());
        assert!(!server.database_exists("missing").unwrap());
    }

    #[test]
    fn test_user_exists_scans_user_list() {
        let rows = ResultSet {
            columns: vec![String::from("user")],
            rows: vec![vec![Value::Text(String::from("bob"))]],
        };
        let (server, _log) = server_with_rows(rows);
        assert!(server.user_exists("bob").unwrap());
        assert!(!server.user_exists("alice").unwrap());
    }

    #[test]
    fn test_drop_statements_honor_if_exists() {
        let (server, log) = server_with_rows(ResultSet::default());
        assert!(server.drop_user("bob", true).unwrap());
        assert!(server.drop_database("app", true).unwrap());
        let log = log.borrow();
        assert_eq!(log[0], "DROP USER IF EXISTS `bob`@`db.example`");
        assert_eq!(log[1], "DROP DATABASE IF EXISTS `app`");
    }
}
