//! Runtime settings read from the environment.

use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/bookshelf";
pub const DEFAULT_SCHEMA: &str = "bookshelf";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_LOGIN_URL: &str = "/accounts/login/";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    /// PostgreSQL schema holding the shelf, review and favorite tables.
    pub schema: String,
    pub bind_addr: String,
    /// Where anonymous requests to authenticated routes are redirected.
    pub login_url: String,
    pub max_connections: u32,
    pub body_limit_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: DEFAULT_DATABASE_URL.into(),
            schema: DEFAULT_SCHEMA.into(),
            bind_addr: DEFAULT_BIND_ADDR.into(),
            login_url: DEFAULT_LOGIN_URL.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl Settings {
    /// Read settings from process env: DATABASE_URL, BOOKSHELF_SCHEMA, BIND_ADDR, LOGIN_URL,
    /// MAX_CONNECTIONS, BODY_LIMIT_BYTES. Unset values fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_map(&vars)
    }

    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |k: &str| vars.get(k).map(|s| s.trim()).filter(|s| !s.is_empty());
        let defaults = Settings::default();

        let schema = get("BOOKSHELF_SCHEMA").map(str::to_string).unwrap_or(defaults.schema);
        if !is_identifier(&schema) {
            return Err(ConfigError::Invalid {
                name: "BOOKSHELF_SCHEMA",
                reason: format!("'{}' is not a valid PostgreSQL identifier", schema),
            });
        }

        let max_connections = match get("MAX_CONNECTIONS") {
            Some(s) => s.parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| ConfigError::Invalid {
                name: "MAX_CONNECTIONS",
                reason: format!("expected a positive integer, got '{}'", s),
            })?,
            None => defaults.max_connections,
        };
        let body_limit_bytes = match get("BODY_LIMIT_BYTES") {
            Some(s) => s.parse::<usize>().map_err(|_| ConfigError::Invalid {
                name: "BODY_LIMIT_BYTES",
                reason: format!("expected a byte count, got '{}'", s),
            })?,
            None => defaults.body_limit_bytes,
        };

        Ok(Settings {
            database_url: get("DATABASE_URL").map(str::to_string).unwrap_or(defaults.database_url),
            schema,
            bind_addr: get("BIND_ADDR").map(str::to_string).unwrap_or(defaults.bind_addr),
            login_url: get("LOGIN_URL").map(str::to_string).unwrap_or(defaults.login_url),
            max_connections,
            body_limit_bytes,
        })
    }
}

fn is_identifier(s: &str) -> bool {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    let re = IDENT.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("static regex"));
    re.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn empty_env_uses_defaults() {
        let s = Settings::from_map(&HashMap::new()).unwrap();
        assert_eq!(s.schema, DEFAULT_SCHEMA);
        assert_eq!(s.login_url, DEFAULT_LOGIN_URL);
        assert_eq!(s.max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn overrides_are_read() {
        let s = Settings::from_map(&vars(&[
            ("DATABASE_URL", "postgres://db/books"),
            ("BOOKSHELF_SCHEMA", "library"),
            ("LOGIN_URL", "/login"),
            ("MAX_CONNECTIONS", "12"),
        ]))
        .unwrap();
        assert_eq!(s.database_url, "postgres://db/books");
        assert_eq!(s.schema, "library");
        assert_eq!(s.login_url, "/login");
        assert_eq!(s.max_connections, 12);
    }

    #[test]
    fn rejects_bad_schema_name() {
        let err = Settings::from_map(&vars(&[("BOOKSHELF_SCHEMA", "drop table;")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BOOKSHELF_SCHEMA", .. }));
    }

    #[test]
    fn rejects_zero_connections() {
        assert!(Settings::from_map(&vars(&[("MAX_CONNECTIONS", "0")])).is_err());
    }
}
