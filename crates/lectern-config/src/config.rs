// crates/lectern-config/src/config.rs
// ============================================================================
// Module: Lectern Configuration
// Description: Configuration loading and validation for Lectern.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: lectern-core, lectern-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed; every bound is validated
//! before a value reaches the runtime or a store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use lectern_core::InMemoryEnrollmentStore;
use lectern_core::RetryPolicy;
use lectern_store_sqlite::SqliteStoreConfig;
use lectern_store_sqlite::SqliteStoreMode;
use lectern_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "lectern.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "LECTERN_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default total retry attempts, first try included.
pub(crate) const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
/// Maximum allowed retry attempts.
pub(crate) const MAX_RETRY_MAX_ATTEMPTS: u32 = 10;
/// Default fixed retry backoff in milliseconds.
pub(crate) const DEFAULT_RETRY_BACKOFF_MS: u64 = 200;
/// Maximum allowed retry backoff in milliseconds.
pub(crate) const MAX_RETRY_BACKOFF_MS: u64 = 60_000;
/// Default lock/busy wait bound in milliseconds.
pub(crate) const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;
/// Minimum allowed lock/busy wait bound in milliseconds.
pub(crate) const MIN_LOCK_TIMEOUT_MS: u64 = 1;
/// Maximum allowed lock/busy wait bound in milliseconds.
pub(crate) const MAX_LOCK_TIMEOUT_MS: u64 = 600_000;
/// Default SQLite database filename.
const DEFAULT_SQLITE_PATH: &str = "lectern.db";

// ============================================================================
// SECTION: Retry Config
// ============================================================================

/// Contention retry policy configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per enrollment request, first try included.
    #[serde(default = "default_retry_max_attempts")]
    pub max_attempts: u32,
    /// Fixed delay between attempts in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

impl RetryConfig {
    /// Validates the retry bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a bound is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 || self.max_attempts > MAX_RETRY_MAX_ATTEMPTS {
            return Err(ConfigError::Invalid(format!(
                "retry.max_attempts must be in 1..={MAX_RETRY_MAX_ATTEMPTS}"
            )));
        }
        if self.backoff_ms > MAX_RETRY_BACKOFF_MS {
            return Err(ConfigError::Invalid(format!(
                "retry.backoff_ms must be at most {MAX_RETRY_BACKOFF_MS}"
            )));
        }
        Ok(())
    }

    /// Builds the runtime retry policy from validated config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the bounds are out of range.
    pub fn to_policy(&self) -> Result<RetryPolicy, ConfigError> {
        self.validate()?;
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.backoff_ms))
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }
}

/// Returns the default retry attempt bound.
const fn default_retry_max_attempts() -> u32 {
    DEFAULT_RETRY_MAX_ATTEMPTS
}

/// Returns the default retry backoff in milliseconds.
const fn default_retry_backoff_ms() -> u64 {
    DEFAULT_RETRY_BACKOFF_MS
}

// ============================================================================
// SECTION: Store Config
// ============================================================================

/// Enrollment store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Durable SQLite store (recommended).
    #[default]
    Sqlite,
    /// In-memory store for tests and local demos.
    Memory,
}

/// In-memory store configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MemoryStoreConfig {
    /// Bound on the exclusive row lock wait in milliseconds.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }
}

impl MemoryStoreConfig {
    /// Validates the lock wait bound.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the bound is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_wait_bound("store.memory.lock_timeout_ms", self.lock_timeout_ms)
    }

    /// Builds the in-memory store from validated config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the bound is out of range.
    pub fn build_store(&self) -> Result<InMemoryEnrollmentStore, ConfigError> {
        self.validate()?;
        Ok(InMemoryEnrollmentStore::with_lock_timeout(Duration::from_millis(
            self.lock_timeout_ms,
        )))
    }
}

/// Returns the default lock wait bound in milliseconds.
const fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

/// SQLite store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteBackendConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_sqlite_path")]
    pub path: PathBuf,
    /// Busy timeout in milliseconds; the bound on the writer-lock wait.
    #[serde(default = "default_lock_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// SQLite journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// SQLite sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for SqliteBackendConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_SQLITE_PATH),
            busy_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl SqliteBackendConfig {
    /// Validates the path and wait bound.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a bound or the path is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_wait_bound("store.sqlite.busy_timeout_ms", self.busy_timeout_ms)?;
        validate_path(&self.path)
    }

    /// Converts to the store crate's configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when validation fails.
    pub fn to_store_config(&self) -> Result<SqliteStoreConfig, ConfigError> {
        self.validate()?;
        Ok(SqliteStoreConfig {
            path: self.path.clone(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
        })
    }
}

/// Returns the default SQLite database path.
fn default_sqlite_path() -> PathBuf {
    PathBuf::from(DEFAULT_SQLITE_PATH)
}

/// Enrollment store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct StoreConfig {
    /// Selected store backend.
    #[serde(default)]
    pub backend: StoreBackend,
    /// In-memory backend settings.
    #[serde(default)]
    pub memory: MemoryStoreConfig,
    /// SQLite backend settings.
    #[serde(default)]
    pub sqlite: SqliteBackendConfig,
}

impl StoreConfig {
    /// Validates the selected backend's settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the selected backend is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            StoreBackend::Memory => self.memory.validate(),
            StoreBackend::Sqlite => self.sqlite.validate(),
        }
    }
}

// ============================================================================
// SECTION: Top-Level Config
// ============================================================================

/// Canonical Lectern configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct LecternConfig {
    /// Contention retry policy settings.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Enrollment store settings.
    #[serde(default)]
    pub store: StoreConfig,
}

impl LecternConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retry.validate()?;
        self.store.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the argument or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates a path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.is_empty() {
        return Err(ConfigError::Invalid("path must not be empty".to_string()));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a lock/busy wait bound in milliseconds.
fn validate_wait_bound(field: &str, value: u64) -> Result<(), ConfigError> {
    if !(MIN_LOCK_TIMEOUT_MS..=MAX_LOCK_TIMEOUT_MS).contains(&value) {
        return Err(ConfigError::Invalid(format!(
            "{field} must be in {MIN_LOCK_TIMEOUT_MS}..={MAX_LOCK_TIMEOUT_MS}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::LecternConfig;
    use super::RetryConfig;
    use super::StoreBackend;

    #[test]
    fn defaults_validate() {
        let config = LecternConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.backoff_ms, 200);
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
    }

    #[test]
    fn zero_attempts_fail_closed() {
        let retry = RetryConfig {
            max_attempts: 0,
            backoff_ms: 200,
        };
        assert!(retry.validate().is_err());
        assert!(retry.to_policy().is_err());
    }

    #[test]
    fn oversized_backoff_fails_closed() {
        let retry = RetryConfig {
            max_attempts: 3,
            backoff_ms: 600_000,
        };
        assert!(retry.validate().is_err());
    }
}
