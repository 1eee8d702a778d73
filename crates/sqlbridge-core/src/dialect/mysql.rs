//! MySQL / MariaDB dialect implementation.

use super::{Dialect, Driver};

/// MySQL dialect.
///
/// Identifiers are backtick-quoted; users are qualified by hostname in
/// the account-management statements.
#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn user_host(&self, hostname: Option<&str>) -> String {
        self.escape_identifier(hostname.unwrap_or("localhost"))
    }
}

impl Dialect for MysqlDialect {
    fn driver(&self) -> Driver {
        Driver::Mysql
    }

    fn escape_identifier(&self, identifier: &str) -> String {
        format!("`{identifier}`")
    }

    fn escape_value(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn sql_column_auto_increment(&self, base_type: &str) -> String {
        format!("{base_type} AUTO_INCREMENT")
    }

    fn sql_random(&self, seed: Option<i64>) -> String {
        match seed {
            Some(s) => format!("rand({s})"),
            None => String::from("rand()"),
        }
    }

    fn sql_show_tables(&self) -> &'static str {
        "SHOW TABLES"
    }

    fn sql_show_databases(&self) -> Option<&'static str> {
        Some("SHOW DATABASES")
    }

    fn sql_show_users(&self) -> Option<&'static str> {
        Some("SELECT DISTINCT user FROM mysql.user")
    }

    fn sql_create_table_options(&self) -> &'static str {
        "ENGINE=InnoDB DEFAULT CHARSET=utf8 COLLATE=utf8_unicode_ci"
    }

    fn sql_enable_foreign_keys(&self) -> Option<&'static str> {
        Some("SET FOREIGN_KEY_CHECKS=1")
    }

    fn sql_disable_foreign_keys(&self) -> Option<&'static str> {
        Some("SET FOREIGN_KEY_CHECKS=0")
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
            "ALTER TABLE {} DROP FOREIGN KEY {fk_name}",
            self.escape(table)
        ))
    }

    fn sql_database_exists(&self) -> Option<&'static str> {
        Some(
            "SELECT SCHEMA_NAME FROM INFORMATION_SCHEMA.SCHEMATA \
             WHERE SCHEMA_NAME = :_database",
        )
    }

    fn sql_create_database(&self, name: &str, _owner: Option<&str>) -> Option<String> {
        Some(format!("CREATE DATABASE {}", self.escape(name)))
    }

    fn sql_create_user(
        &self,
        name: &str,
        password: &str,
        hostname: Option<&str>,
    ) -> Option<String> {
        Some(format!(
            "CREATE USER {}@{} IDENTIFIED BY {}",
            self.escape(name),
            self.user_host(hostname),
            self.escape_value(password)
        ))
    }

    fn sql_drop_user(&self, name: &str, if_exists: bool, hostname: Option<&str>) -> Option<String> {
        Some(format!(
            "DROP USER {}{}@{}",
            if if_exists { "IF EXISTS " } else { "" },
            self.escape(name),
            self.user_host(hostname)
        ))
    }

    fn sql_grant_user(
        &self,
        database: &str,
        user: &str,
        hostname: Option<&str>,
    ) -> Option<String> {
        Some(format!(
            "GRANT ALL ON {}.* TO {}@{}",
            self.escape(database),
            self.escape(user),
            self.user_host(hostname)
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
        let dialect = MysqlDialect::new();
        assert_eq!(dialect.escape_identifier("users"), "`users`");
        assert_eq!(dialect.escape("users.name"), "`users`.`name`");
        assert_eq!(dialect.escape_value("it's"), "'it''s'");
    }

    #[test]
    fn test_auto_increment_appends_keyword() {
        let dialect = MysqlDialect::new();
        assert_eq!(dialect.sql_column_auto_increment("int"), "int AUTO_INCREMENT");
    }

    #[test]
    fn test_user_statements_qualified_by_host() {
        let dialect = MysqlDialect::new();
        assert_eq!(
            dialect.sql_create_user("bob", "pw", Some("db.example")).unwrap(),
            "CREATE USER `bob`@`db.example` IDENTIFIED BY 'pw'"
        );
        assert_eq!(
            dialect.sql_drop_user("bob", true, None).unwrap(),
            "DROP USER IF EXISTS `bob`@`localhost`"
        );
    }

    #[test]
    fn test_add_foreign_key() {
        let dialect = MysqlDialect::new();
        assert_eq!(
            dialect
                .sql_add_foreign_key("fk_o_c", "order", "customerId", "customer", "customerId")
                .unwrap(),
            "ALTER TABLE `order` ADD CONSTRAINT fk_o_c FOREIGN KEY (`customerId`) \
             REFERENCES `customer`(`customerId`)"
        );
    }
}
