//! Connection settings: server address, database, credentials and timeout.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::query::path_segment;

/// Where and as whom to connect.
///
/// The database is part of the transport's base address, so talking to a
/// different database means building a new transport.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectionConfig {
    /// Server root, e.g. `http://localhost:8529`.
    pub url: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_database() -> String {
    "_system".to_string()
}

fn default_username() -> String {
    "root".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ConnectionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: default_database(),
            username: default_username(),
            password: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Reads `ARANGO_URL` (required), `ARANGO_DB`, `ARANGO_USER`,
    /// `ARANGO_PASSWORD` and `ARANGO_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = lookup("ARANGO_URL").ok_or_else(|| ClientError::Config("ARANGO_URL is not set".to_string()))?;
        let mut config = Self::new(url);
        if let Some(database) = lookup("ARANGO_DB") {
            config.database = database;
        }
        if let Some(username) = lookup("ARANGO_USER") {
            config.username = username;
        }
        if let Some(password) = lookup("ARANGO_PASSWORD") {
            config.password = password;
        }
        if let Some(timeout) = lookup("ARANGO_TIMEOUT_SECS") {
            config.timeout_secs = timeout
                .parse()
                .map_err(|_| ClientError::Config(format!("ARANGO_TIMEOUT_SECS is not a number: {timeout}")))?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(ClientError::Config("url must not be empty".to_string()));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ClientError::Config(format!("url must use http or https: {}", self.url)));
        }
        if self.database.is_empty() {
            return Err(ClientError::Config("database must not be empty".to_string()));
        }
        Ok(())
    }

    /// `{url}/_db/{database}/`, the prefix every request path is joined to.
    pub fn base_url(&self) -> String {
        format!("{}/_db/{}/", self.url.trim_end_matches('/'), path_segment(&self.database))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_deserializing() {
        let config: ConnectionConfig = serde_json::from_str(r#"{"url":"http://localhost:8529"}"#).unwrap();
        assert_eq!(config, ConnectionConfig::new("http://localhost:8529"));
        assert_eq!(config.database, "_system");
        assert_eq!(config.username, "root");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn base_url_binds_database() {
        let config = ConnectionConfig::new("http://localhost:8529/").database("shop");
        assert_eq!(config.base_url(), "http://localhost:8529/_db/shop/");
    }

    #[test]
    fn env_lookup() {
        let config = ConnectionConfig::from_lookup(lookup(&[
            ("ARANGO_URL", "https://db.example:8529"),
            ("ARANGO_DB", "inventory"),
            ("ARANGO_USER", "app"),
            ("ARANGO_PASSWORD", "secret"),
            ("ARANGO_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.database, "inventory");
        assert_eq!(config.username, "app");
        assert_eq!(config.password, "secret");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn env_lookup_requires_url() {
        let err = ConnectionConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn env_lookup_rejects_bad_timeout() {
        let err = ConnectionConfig::from_lookup(lookup(&[
            ("ARANGO_URL", "http://localhost:8529"),
            ("ARANGO_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn debug_output_hides_the_password() {
        let config = ConnectionConfig::new("http://localhost:8529").credentials("app", "hunter2");
        let printed = format!("{config:?}");
        assert!(printed.contains("app"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn validate_rejects_bad_urls() {
        assert!(ConnectionConfig::new("").validate().is_err());
        assert!(ConnectionConfig::new("localhost:8529").validate().is_err());
        assert!(ConnectionConfig::new("http://localhost:8529").database("").validate().is_err());
        assert!(ConnectionConfig::new("https://localhost:8529").validate().is_ok());
    }
}
