//! # Kasir Configuration
//!
//! Configuration shared by the API server, the terminal menus and the seed
//! binary.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command line flags (applied by each binary after load)             │
//! │     --db data/toko.db  --port 9000                                     │
//! │                                                                         │
//! │  2. Environment Variables (.env is read first, real env wins)          │
//! │     KASIR_DB_PATH=data/toko.db                                         │
//! │     KASIR_UTC_OFFSET=+07:00                                            │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     --config path, else $KASIR_CONFIG, else                            │
//! │     ~/.config/kasir/config.toml (Linux)                                │
//! │     ~/Library/Application Support/com.kasir.kasir/config.toml (macOS)  │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "data/kasir.db"
//! max_connections = 5
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [business]
//! utc_offset = "+07:00"       # omit to use this machine's offset
//! receipts_dir = "exports/receipts"
//! exports_dir = "exports"
//!
//! [bootstrap]
//! admin_username = "admin"    # used only while the users table is empty
//! admin_password = "admin123"
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Local, Offset};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use kasir_db::DbConfig;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConfigError {
    fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/kasir.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessSettings {
    /// `+07:00` style offset for report days and receipt times.
    #[serde(default)]
    pub utc_offset: Option<String>,

    #[serde(default = "default_receipts_dir")]
    pub receipts_dir: PathBuf,

    #[serde(default = "default_exports_dir")]
    pub exports_dir: PathBuf,
}

fn default_receipts_dir() -> PathBuf {
    PathBuf::from("exports/receipts")
}

fn default_exports_dir() -> PathBuf {
    PathBuf::from("exports")
}

impl Default for BusinessSettings {
    fn default() -> Self {
        BusinessSettings {
            utc_offset: None,
            receipts_dir: default_receipts_dir(),
            exports_dir: default_exports_dir(),
        }
    }
}

/// Credentials for the first admin. Ignored once any user exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootstrapSettings {
    #[serde(default)]
    pub admin_username: Option<String>,

    #[serde(default)]
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: default_log_level(),
        }
    }
}

// =============================================================================
// KasirConfig
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KasirConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub business: BusinessSettings,

    #[serde(default)]
    pub bootstrap: BootstrapSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl KasirConfig {
    /// Loads configuration from file and environment.
    ///
    /// A missing file is not an error; defaults are used.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var_os("KASIR_CONFIG").map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        dotenvy::dotenv().ok();
        config.apply_overrides(|key| std::env::var(key).ok())?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies `KASIR_*` overrides read through `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<()> {
        if let Some(path) = lookup("KASIR_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("KASIR_DB_MAX_CONNECTIONS") {
            self.database.max_connections = max
                .parse()
                .map_err(|_| ConfigError::invalid("KASIR_DB_MAX_CONNECTIONS", "not a number"))?;
        }

        if let Some(host) = lookup("KASIR_HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("KASIR_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::invalid("KASIR_PORT", "not a port number"))?;
        }

        if let Some(offset) = lookup("KASIR_UTC_OFFSET") {
            self.business.utc_offset = Some(offset);
        }

        if let Some(dir) = lookup("KASIR_RECEIPTS_DIR") {
            self.business.receipts_dir = PathBuf::from(dir);
        }

        if let Some(dir) = lookup("KASIR_EXPORTS_DIR") {
            self.business.exports_dir = PathBuf::from(dir);
        }

        if let Some(username) = lookup("KASIR_ADMIN_USERNAME") {
            self.bootstrap.admin_username = Some(username);
        }

        if let Some(password) = lookup("KASIR_ADMIN_PASSWORD") {
            self.bootstrap.admin_password = Some(password);
        }

        if let Some(level) = lookup("KASIR_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("database.path", "must not be empty"));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::invalid(
                "database.max_connections",
                "must be greater than 0",
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port", "must be greater than 0"));
        }

        if let Some(ref offset) = self.business.utc_offset {
            parse_utc_offset(offset)?;
        }

        match (
            &self.bootstrap.admin_username,
            &self.bootstrap.admin_password,
        ) {
            (Some(_), None) | (None, Some(_)) => Err(ConfigError::invalid(
                "bootstrap",
                "admin_username and admin_password must be set together",
            )),
            _ => Ok(()),
        }
    }

    /// Business time zone. Falls back to this machine's current offset.
    pub fn offset(&self) -> ConfigResult<FixedOffset> {
        match self.business.utc_offset {
            Some(ref offset) => parse_utc_offset(offset),
            None => Ok(Local::now().offset().fix()),
        }
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database.path.clone()).max_connections(self.database.max_connections)
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "kasir", "kasir")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Parses `+07:00`, `-03:30`, `+0700` or `Z`.
pub fn parse_utc_offset(input: &str) -> ConfigResult<FixedOffset> {
    let invalid = || ConfigError::invalid("business.utc_offset", format!("'{}' is not +HH:MM", input));

    let s = input.trim();
    if s.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if hours > 14 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

// =============================================================================
// Logging
// =============================================================================

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_level`. Output goes to stderr so it never
/// mixes with menu text on stdout.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
