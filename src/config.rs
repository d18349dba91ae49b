//! Configuration loading and constants.
//!
//! HTTP and logging settings come from an optional TOML file. Database
//! credentials come only from the environment and are read once at startup.
//! `AppConfig` is the root configuration struct; it is immutable after load.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "vitals_ingest=debug,tower_http=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Default HTTP bind host
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Default HTTP bind port
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Cache-Control for every response; nothing here is cacheable
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

// =============================================================================
// Database Environment
// =============================================================================

pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_PASS: &str = "DB_PASS";
pub const ENV_DB_NAME: &str = "DB_NAME";
pub const ENV_INSTANCE_CONNECTION_NAME: &str = "INSTANCE_CONNECTION_NAME";

/// Directory the Cloud SQL proxy mounts instance sockets under
pub const CLOUDSQL_SOCKET_ROOT: &str = "/cloudsql";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP server configuration
    pub http: HttpServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Database credentials and socket location
    pub database: DatabaseConfig,
}

/// Settings that may be provided by the TOML file. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub http: HttpServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HTTP_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_HTTP_PORT
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Database connection settings, taken from the process environment.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub name: String,
    /// Cloud SQL instance connection name (`project:region:instance`)
    pub instance_connection_name: String,
}

impl DatabaseConfig {
    /// Read the four required variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. A key that resolves to `None` is a
    /// fatal configuration error; an empty value is accepted as-is.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &'static str| lookup(key).ok_or(ConfigError::MissingEnv(key));

        Ok(Self {
            user: require(ENV_DB_USER)?,
            password: require(ENV_DB_PASS)?,
            name: require(ENV_DB_NAME)?,
            instance_connection_name: require(ENV_INSTANCE_CONNECTION_NAME)?,
        })
    }

    /// Directory holding the instance's Unix socket, e.g. `/cloudsql/p:r:i`
    pub fn socket_dir(&self) -> PathBuf {
        Path::new(CLOUDSQL_SOCKET_ROOT).join(&self.instance_connection_name)
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"****")
            .field("name", &self.name)
            .field("instance_connection_name", &self.instance_connection_name)
            .finish()
    }
}

impl FileSettings {
    /// Parse the settings file. A file that does not exist yields defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Ok(toml::from_str(&contents)?)
    }
}

impl AppConfig {
    pub fn from_parts(file: FileSettings, database: DatabaseConfig) -> Self {
        Self {
            http: file.http,
            logging: file.logging,
            database,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Missing required environment variable {0}")]
    MissingEnv(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn full_env() -> HashMap<&'static str, String> {
        HashMap::from([
            (ENV_DB_USER, "ingest".to_string()),
            (ENV_DB_PASS, "hunter2".to_string()),
            (ENV_DB_NAME, "vitals".to_string()),
            (ENV_INSTANCE_CONNECTION_NAME, "proj:us-central1:db".to_string()),
        ])
    }

    #[test]
    fn test_database_config_from_complete_env() {
        let env = full_env();
        let db = DatabaseConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(db.user, "ingest");
        assert_eq!(db.password, "hunter2");
        assert_eq!(db.name, "vitals");
        assert_eq!(db.socket_dir(), PathBuf::from("/cloudsql/proj:us-central1:db"));
    }

    #[test]
    fn test_each_missing_variable_is_reported() {
        for missing in [
            ENV_DB_USER,
            ENV_DB_PASS,
            ENV_DB_NAME,
            ENV_INSTANCE_CONNECTION_NAME,
        ] {
            let mut env = full_env();
            env.remove(missing);
            let err = DatabaseConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
            match err {
                ConfigError::MissingEnv(name) => assert_eq!(name, missing),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_password_is_accepted() {
        let mut env = full_env();
        env.insert(ENV_DB_PASS, String::new());
        let db = DatabaseConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert!(db.password.is_empty());
    }

    #[test]
    fn test_debug_redacts_password() {
        let env = full_env();
        let db = DatabaseConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        let rendered = format!("{db:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("****"));
    }

    #[test]
    fn test_missing_settings_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = FileSettings::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.http.host, DEFAULT_HTTP_HOST);
        assert_eq!(settings.http.port, DEFAULT_HTTP_PORT);
        assert_eq!(settings.logging.format, DEFAULT_LOG_FORMAT);
    }

    #[test]
    fn test_partial_settings_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nport = 9090\n\n[logging]\nformat = \"json\"").unwrap();

        let settings = FileSettings::load(file.path()).unwrap();
        assert_eq!(settings.http.host, DEFAULT_HTTP_HOST);
        assert_eq!(settings.http.port, 9090);
        assert!(settings.logging.is_json());
    }

    #[test]
    fn test_malformed_settings_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nport = \"not a number\"").unwrap();

        let err = FileSettings::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
