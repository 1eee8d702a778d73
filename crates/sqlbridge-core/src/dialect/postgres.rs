//! PostgreSQL dialect implementation.

use super::{Dialect, Driver};

/// Postgres dialect.
///
/// Auto-increment columns map to the `serial`/`bigserial` pseudo-types;
/// foreign-key enforcement is always on, so the enable/disable hooks are
/// absent. The random function ignores its seed.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new Postgres dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn driver(&self) -> Driver {
        Driver::Postgres
    }

    fn escape_identifier(&self, identifier: &str) -> String {
        format!("\"{identifier}\"")
    }

    fn escape_value(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn sql_column_auto_increment(&self, base_type: &str) -> String {
        if base_type.eq_ignore_ascii_case("bigint") {
            String::from("bigserial")
        } else {
            String::from("serial")
        }
    }

    fn sql_random(&self, _seed: Option<i64>) -> String {
        String::from("random()")
    }

    fn sql_show_tables(&self) -> &'static str {
        "SELECT table_name FROM information_schema.tables \
         WHERE table_schema='public' AND table_type = 'BASE TABLE' ORDER BY table_name"
    }

    fn sql_show_databases(&self) -> Option<&'static str> {
        Some("SELECT datname FROM pg_database WHERE datistemplate = false")
    }

    fn sql_show_users(&self) -> Option<&'static str> {
        Some("SELECT usename FROM pg_user")
    }

    fn sql_add_foreign_key(
        &self,
        fk_name: &str,
        src_table: &str,
        src_column: &str,
        ref_table: &str,
        ref_column: &str,
    ) -> Option<String> {
        Some(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}({})",
            self.escape(src_table),
            fk_name,
            self.escape(src_column),
            self.escape(ref_table),
            self.escape(ref_column)
        ))
    }

    fn sql_drop_foreign_key(&self, fk_name: &str, table: &str) -> Option<String> {
        Some(format!(
            "ALTER TABLE {} DROP CONSTRAINT {fk_name}",
            self.escape(table)
        ))
    }

    fn sql_database_exists(&self) -> Option<&'static str> {
        Some("SELECT COUNT(*) FROM pg_database WHERE datname = :_database")
    }

    fn sql_create_database(&self, name: &str, owner: Option<&str>) -> Option<String> {
        let owner_sql = match owner {
            Some(o) => format!("OWNER {} ", self.escape(o)),
            None => String::new(),
        };
        Some(format!(
            "CREATE DATABASE {} {}TEMPLATE template0",
            self.escape(name),
            owner_sql
        ))
    }

    fn sql_create_user(
        &self,
        name: &str,
        password: &str,
        _hostname: Option<&str>,
    ) -> Option<String> {
        Some(format!(
            "CREATE USER {} PASSWORD {}",
            self.escape(name),
            self.escape_value(password)
        ))
    }

    fn sql_drop_user(
        &self,
        name: &str,
        if_exists: bool,
        _hostname: Option<&str>,
    ) -> Option<String> {
        Some(format!(
            "DROP USER {}{}",
            if if_exists { "IF EXISTS " } else { "" },
            self.escape(name)
        ))
    }

    fn sql_grant_user(
        &self,
        database: &str,
        user: &str,
        _hostname: Option<&str>,
    ) -> Option<String> {
        Some(format!(
            "GRANT CONNECT ON DATABASE {} TO {}",
            self.escape(database),
            self.escape(user)
        ))
    }

    fn required_settings(&self) -> &'static [&'static str] {
        &["hostname", "username", "password", "database"]
    }

    fn supports_server_commands(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escaping() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.escape("a.b"), "\"a\".\"b\"");
        assert_eq!(dialect.escape_value("x"), "'x'");
    }

    #[test]
    fn test_auto_increment_maps_to_serial() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.sql_column_auto_increment("bigint"), "bigserial");
        assert_eq!(dialect.sql_column_auto_increment("BIGINT"), "bigserial");
        assert_eq!(dialect.sql_column_auto_increment("int"), "serial");
    }

    #[test]
    fn test_random_ignores_seed() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.sql_random(Some(42)), "random()");
    }

    #[test]
    fn test_create_database_with_owner() {
        let dialect = PostgresDialect::new();
        assert_eq!(
            dialect.sql_create_database("app", Some("bob")).unwrap(),
            "CREATE DATABASE \"app\" OWNER \"bob\" TEMPLATE template0"
        );
        assert_eq!(
            dialect.sql_create_database("app", None).unwrap(),
            "CREATE DATABASE \"app\" TEMPLATE template0"
        );
    }
}
