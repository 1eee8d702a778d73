//! The CREATE TABLE statement builder.
//!
//! Columns are described by an explicit [`ColumnDef`] builder instead
//! of a positional keyword list: name and SQL type up front, then
//! chained constraint setters. `PRIMARY KEY` implies `NOT NULL`;
//! `AUTO INCREMENT` delegates the column type rewrite to the dialect
//! (SQLite collapses to `INTEGER`, Postgres to `serial`/`bigserial`,
//! MySQL appends `AUTO_INCREMENT`).

use std::rc::Rc;

use crate::connection::ConnectionProvider;
use crate::dialect::{Dialect, ForeignKeyAction};
use crate::error::Result;
use crate::params::ParamTable;
use crate::query::{run_statement, ErrorState};

/// Default value for a column definition.
///
/// The `NULL` and `CURRENT_TIMESTAMP` keywords are emitted unescaped;
/// text goes through the dialect's value escaping; numerics and
/// booleans are emitted as literals.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// `DEFAULT NULL`.
    Null,
    /// `DEFAULT CURRENT_TIMESTAMP`.
    CurrentTimestamp,
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// Escaped text literal.
    Text(String),
}

impl DefaultValue {
    fn render(&self, dialect: &dyn Dialect) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::CurrentTimestamp => String::from("CURRENT_TIMESTAMP"),
            Self::Bool(b) => String::from(if *b { "TRUE" } else { "FALSE" }),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => dialect.escape_value(s),
        }
    }
}

/// One column definition for a CREATE TABLE statement.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    name: String,
    sql_type: String,
    nullable: bool,
    unique: bool,
    primary_key: bool,
    auto_increment: bool,
    default: Option<DefaultValue>,
}

impl ColumnDef {
    /// Creates a column with its SQL type (`int`, `varchar(50)`, ...).
    #[must_use]
    pub fn new(name: &str, sql_type: &str) -> Self {
        Self {
            name: String::from(name),
            sql_type: String::from(sql_type),
            nullable: true,
            unique: false,
            primary_key: false,
            auto_increment: false,
            default: None,
        }
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the column nullable (the default).
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the column UNIQUE.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks the column PRIMARY KEY (implies NOT NULL).
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the column auto-increment; the dialect rewrites the type.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets the column default.
    #[must_use]
    pub fn default_value(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    fn render(&self, dialect: &dyn Dialect) -> String {
        let sql_type = if self.auto_increment {
            dialect.sql_column_auto_increment(&self.sql_type)
        } else {
            self.sql_type.clone()
        };
        let mut parts = vec![dialect.escape(&self.name), sql_type];
        // PRIMARY KEY implies NOT NULL and suppresses the nullable flag
        if self.primary_key {
            parts.push(String::from("NOT NULL"));
            parts.push(String::from("PRIMARY KEY"));
        } else {
            parts.push(String::from(if self.nullable { "NULL" } else { "NOT NULL" }));
        }
        if self.unique {
            parts.push(String::from("UNIQUE"));
        }
        if let Some(default) = &self.default {
            parts.push(format!("DEFAULT {}", default.render(dialect)));
        }
        parts.join(" ")
    }
}

struct ForeignKey {
    name: String,
    src_column: String,
    ref_table: String,
    ref_column: String,
    on_update: ForeignKeyAction,
    on_delete: ForeignKeyAction,
}

/// A `CREATE TABLE` query builder.
pub struct CreateTable {
    provider: Rc<ConnectionProvider>,
    dialect: &'static dyn Dialect,
    table: String,
    columns: Vec<ColumnDef>,
    foreign_keys: Vec<ForeignKey>,
    if_not_exists: bool,
    prepared: Option<String>,
    error: ErrorState,
}

impl CreateTable {
    /// Creates a CREATE TABLE statement for the given table.
    #[must_use]
    pub fn new(provider: Rc<ConnectionProvider>, table: &str) -> Self {
        let dialect = provider.dialect();
        Self {
            provider,
            dialect,
            table: String::from(table),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            if_not_exists: false,
            prepared: None,
            error: ErrorState::default(),
        }
    }

    /// Toggles `IF NOT EXISTS`.
    pub fn if_not_exists(&mut self) -> &mut Self {
        self.if_not_exists = true;
        self
    }

    /// Adds a column definition.
    pub fn column(&mut self, definition: ColumnDef) -> &mut Self {
        self.prepared = None;
        self.columns.push(definition);
        self
    }

    /// Adds an inline foreign-key constraint with the default rules
    /// (`ON UPDATE CASCADE`, `ON DELETE RESTRICT`).
    pub fn fk(
        &mut self,
        fk_name: &str,
        src_column: &str,
        ref_table: &str,
        ref_column: &str,
    ) -> &mut Self {
        self.fk_with_actions(
            fk_name,
            src_column,
            ref_table,
            ref_column,
            ForeignKeyAction::Cascade,
            ForeignKeyAction::Restrict,
        )
    }

    /// Adds an inline foreign-key constraint with explicit rules.
    pub fn fk_with_actions(
        &mut self,
        fk_name: &str,
        src_column: &str,
        ref_table: &str,
        ref_column: &str,
        on_update: ForeignKeyAction,
        on_delete: ForeignKeyAction,
    ) -> &mut Self {
        self.prepared = None;
        self.foreign_keys.push(ForeignKey {
            name: String::from(fk_name),
            src_column: String::from(src_column),
            ref_table: String::from(ref_table),
            ref_column: String::from(ref_column),
            on_update,
            on_delete,
        });
        self
    }

    /// The SQL text for the builder's current state.
    #[must_use]
    pub fn sql(&self) -> String {
        let mut defs: Vec<String> = self
            .columns
            .iter()
            .map(|c| c.render(self.dialect))
            .collect();
        for fk in &self.foreign_keys {
            defs.push(format!(
                "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}({}) ON UPDATE {} ON DELETE {}",
                fk.name,
                self.dialect.escape_identifier(&fk.src_column),
                self.dialect.escape_identifier(&fk.ref_table),
                self.dialect.escape_identifier(&fk.ref_column),
                fk.on_update.as_sql(),
                fk.on_delete.as_sql()
            ));
        }
        let mut sql = format!(
            "CREATE TABLE {}{} ({})",
            if self.if_not_exists { "IF NOT EXISTS " } else { "" },
            self.dialect.escape(&self.table),
            defs.join(", ")
        );
        let options = self.dialect.sql_create_table_options();
        if !options.is_empty() {
            sql.push(' ');
            sql.push_str(options);
        }
        sql
    }

    /// Validates the statement against the connection.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) when preparation fails inside
    /// a transaction.
    pub fn prepare(&mut self) -> Result<bool> {
        let sql = self.sql();
        let ok = super::check_statement(&self.provider, &sql, &mut self.error)?;
        self.prepared = ok.then_some(sql);
        Ok(ok)
    }

    /// Executes the DDL statement.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) when the statement fails inside
    /// a transaction.
    pub fn execute(&mut self) -> Result<bool> {
        if self.prepared.is_none() && !self.prepare()? {
            return Ok(false);
        }
        let sql = self.sql();
        Ok(run_statement(&self.provider, &sql, &ParamTable::new(), &mut self.error)?.is_some())
    }

    /// Whether the most recent operation failed.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.has_error()
    }

    /// Code of the last recorded error.
    #[must_use]
    pub fn error_code(&self) -> Option<i64> {
        self.error.code()
    }

    /// Message of the last recorded error.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.message()
    }
}
