//! Partial Microsoft SQL Server dialect.
//!
//! SQL generation only; the connection factory rejects this backend.

use super::{Dialect, Driver};

/// SQL Server dialect (partial).
#[derive(Debug, Default, Clone, Copy)]
pub struct MssqlDialect;

impl MssqlDialect {
    /// Creates a new SQL Server dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MssqlDialect {
    fn driver(&self) -> Driver {
        Driver::Mssql
    }

    fn escape_identifier(&self, identifier: &str) -> String {
        format!("[{identifier}]")
    }

    fn escape_value(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn sql_column_auto_increment(&self, base_type: &str) -> String {
        format!("{base_type} IDENTITY(1,1)")
    }

    fn sql_random(&self, _seed: Option<i64>) -> String {
        String::from("NEWID()")
    }

    fn sql_show_tables(&self) -> &'static str {
        "SELECT table_name FROM information_schema.tables WHERE table_type = 'BASE TABLE'"
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

    fn required_settings(&self) -> &'static [&'static str] {
        &["hostname", "username", "password", "database"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_escaping() {
        let dialect = MssqlDialect::new();
        assert_eq!(dialect.escape_identifier("users"), "[users]");
        assert_eq!(dialect.escape("users.name"), "[users].[name]");
    }

    #[test]
    fn test_identity_column() {
        let dialect = MssqlDialect::new();
        assert_eq!(dialect.sql_column_auto_increment("int"), "int IDENTITY(1,1)");
    }
}
