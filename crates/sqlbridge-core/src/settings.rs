//! Connection settings.

use serde::{Deserialize, Serialize};

/// Settings consumed by the connection factory and the dialect selection.
///
/// Only `driver` is always required; the selected backend declares which
/// of the remaining keys it needs (`Dialect::required_settings`). For a
/// server-level connection the `database` requirement is waived.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Backend name: `sqlite`, `mysql` or `pgsql`.
    pub driver: String,
    /// Database server host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Account name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Account password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Database name, or the file path / `:memory:` for SQLite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Server port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Connection charset (MySQL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    /// Default output format tag (`ASSOC`, `OBJ`, `COLUMN`, `JSON`,
    /// `JSONPP`), matched case-insensitively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_output_format: Option<String>,
}

impl Settings {
    /// Creates settings for the given backend name.
    #[must_use]
    pub fn new(driver: &str) -> Self {
        Self {
            driver: String::from(driver),
            ..Self::default()
        }
    }

    /// Sets the database name / path.
    #[must_use]
    pub fn database(mut self, database: &str) -> Self {
        self.database = Some(String::from(database));
        self
    }

    /// Sets the server host.
    #[must_use]
    pub fn hostname(mut self, hostname: &str) -> Self {
        self.hostname = Some(String::from(hostname));
        self
    }

    /// Sets the account credentials.
    #[must_use]
    pub fn credentials(mut self, username: &str, password: &str) -> Self {
        self.username = Some(String::from(username));
        self.password = Some(String::from(password));
        self
    }

    /// Sets the default output format tag.
    #[must_use]
    pub fn default_output_format(mut self, tag: &str) -> Self {
        self.default_output_format = Some(String::from(tag));
        self
    }

    /// Looks a key up by its settings name.
    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        match key {
            "hostname" => self.hostname.as_deref(),
            "username" => self.username.as_deref(),
            "password" => self.password.as_deref(),
            "database" => self.database.as_deref(),
            "charset" => self.charset.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_style() {
        let settings = Settings::new("sqlite")
            .database(":memory:")
            .default_output_format("json");
        assert_eq!(settings.driver, "sqlite");
        assert_eq!(settings.database.as_deref(), Some(":memory:"));
        assert_eq!(settings.get("database"), Some(":memory:"));
        assert_eq!(settings.get("hostname"), None);
    }

    #[test]
    fn test_deserializes_from_json() {
        let settings: Settings = serde_json::from_str(
            r#"{"driver":"pgsql","hostname":"db","username":"u","password":"p","database":"app"}"#,
        )
        .unwrap();
        assert_eq!(settings.driver, "pgsql");
        assert_eq!(settings.get("hostname"), Some("db"));
    }
}
