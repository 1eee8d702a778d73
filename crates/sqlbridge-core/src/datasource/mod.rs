//! Datasource facades.
//!
//! [`Database`] and [`Server`] are the convenience entry points: they
//! validate the settings, select the dialect through the driver
//! factory, wrap the backend connection in a shared provider and hand
//! out pre-wired query-builder instances. [`Table`] scopes the same
//! operations to a single table.

mod database;
mod server;
mod table;

pub use database::Database;
pub use server::Server;
pub use table::Table;

use crate::connection::ConnectionProvider;
use crate::error::Result;
use crate::params::ParamTable;

/// Probes a table with `SELECT 1 FROM t LIMIT 1`; any failure means
/// "does not exist" and is not recorded.
pub(crate) fn table_exists(provider: &ConnectionProvider, table: &str) -> bool {
    let sql = format!("SELECT 1 FROM {} LIMIT 1", provider.dialect().escape(table));
    provider.raw_query(&sql, &ParamTable::new()).is_ok()
}

pub(crate) fn drop_table(provider: &ConnectionProvider, table: &str) -> Result<bool> {
    let sql = format!("DROP TABLE {}", provider.dialect().escape(table));
    provider.run(&sql, &ParamTable::new())
}

pub(crate) fn rename_table(
    provider: &ConnectionProvider,
    current: &str,
    new_name: &str,
) -> Result<bool> {
    let dialect = provider.dialect();
    let sql = format!(
        "ALTER TABLE {} RENAME TO {}",
        dialect.escape(current),
        dialect.escape(new_name)
    );
    provider.run(&sql, &ParamTable::new())
}
