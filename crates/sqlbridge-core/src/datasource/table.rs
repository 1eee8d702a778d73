//! The table-scoped facade.

use std::rc::Rc;

use crate::connection::ConnectionProvider;
use crate::error::Result;
use crate::query::{CreateTable, Delete, Insert, Select, Update};

/// Convenience handle scoping query builders to one table.
pub struct Table {
    provider: Rc<ConnectionProvider>,
    name: String,
}

impl Table {
    pub(crate) fn new(provider: Rc<ConnectionProvider>, name: &str) -> Self {
        Self {
            provider,
            name: String::from(name),
        }
    }

    /// The table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A SELECT builder with the source pre-wired to this table.
    #[must_use]
    pub fn select(&self) -> Select {
        let mut query = Select::new(Rc::clone(&self.provider));
        query.from(&self.name);
        query
    }

    /// An INSERT builder for this table.
    #[must_use]
    pub fn insert(&self) -> Insert {
        Insert::new(Rc::clone(&self.provider), &self.name)
    }

    /// An UPDATE builder for this table.
    #[must_use]
    pub fn update(&self) -> Update {
        Update::new(Rc::clone(&self.provider), &self.name)
    }

    /// A DELETE builder for this table.
    #[must_use]
    pub fn delete(&self) -> Delete {
        Delete::new(Rc::clone(&self.provider), &self.name)
    }

    /// A CREATE TABLE builder for this table.
    #[must_use]
    pub fn create(&self) -> CreateTable {
        CreateTable::new(Rc::clone(&self.provider), &self.name)
    }

    /// Whether the table exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        super::table_exists(&self.provider, &self.name)
    }

    /// Drops the table.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) inside a transaction.
    pub fn drop(&self) -> Result<bool> {
        super::drop_table(&self.provider, &self.name)
    }

    /// Renames the table; on success the handle tracks the new name.
    ///
    /// # Errors
    ///
    /// [`Error::Sql`](crate::Error::Sql) inside a transaction.
    pub fn rename(&mut self, new_name: &str) -> Result<bool> {
        let renamed = super::rename_table(&self.provider, &self.name, new_name)?;
        if renamed {
            self.name = String::from(new_name);
        }
        Ok(renamed)
    }
}
