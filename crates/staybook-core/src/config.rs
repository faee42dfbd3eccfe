//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON. Every section
//! defaults sensibly so a completely empty `{}` file is valid.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub carts: CartConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Read and parse a config file, failing on any error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None`, the file does not exist, or it fails to parse.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.database.path.as_os_str().is_empty() {
            warnings.push("database.path is empty".into());
        }
        if self.database.pool_size == 0 {
            warnings.push("database.pool_size is 0; no connections can be opened".into());
        }
        if self.carts.ttl_minutes <= 0 {
            warnings.push(format!(
                "carts.ttl_minutes is {}; new carts will already be expired",
                self.carts.ttl_minutes
            ));
        } else if self.carts.ttl_minutes > MAX_CART_TTL_MINUTES {
            warnings.push(format!(
                "carts.ttl_minutes is {}; the maximum is {MAX_CART_TTL_MINUTES}",
                self.carts.ttl_minutes
            ));
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// SQLite storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_pool_size() -> u32 {
    4
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("staybook.db"),
            pool_size: default_pool_size(),
        }
    }
}

/// Upper bound for `carts.ttl_minutes` (30 days).
pub const MAX_CART_TTL_MINUTES: i64 = 30 * 24 * 60;

/// Shopping-cart settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Minutes a booking may stay in `cart` before it counts as abandoned.
    #[serde(default = "default_cart_ttl")]
    pub ttl_minutes: i64,
}

fn default_cart_ttl() -> i64 {
    30
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_cart_ttl(),
        }
    }
}

impl CartConfig {
    /// Expiry timestamp for a cart created at `now`.
    ///
    /// Fails when `ttl_minutes` is outside `1..=MAX_CART_TTL_MINUTES`.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        if !(1..=MAX_CART_TTL_MINUTES).contains(&self.ttl_minutes) {
            return Err(Error::validation(format!(
                "carts.ttl_minutes must be between 1 and {MAX_CART_TTL_MINUTES}, got {}",
                self.ttl_minutes
            )));
        }
        Duration::try_minutes(self.ttl_minutes)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| Error::validation("cart expiry is out of range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let cfg = Config::default();
        assert_eq!(cfg.database.path, PathBuf::from("staybook.db"));
        assert_eq!(cfg.database.pool_size, 4);
        assert_eq!(cfg.carts.ttl_minutes, 30);
    }

    #[test]
    fn default_config_no_warnings() {
        let warnings = Config::default().validate();
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    }

    #[test]
    fn zero_pool_and_ttl_warn() {
        let mut cfg = Config::default();
        cfg.database.pool_size = 0;
        cfg.carts.ttl_minutes = 0;
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.contains("pool_size")));
        assert!(warnings.iter().any(|w| w.contains("ttl_minutes")));
    }

    #[test]
    fn parse_json_config() {
        let json = r#"{"database": {"path": "/data/bookings.db"}, "carts": {"ttl_minutes": 15}}"#;
        let cfg = Config::from_json(json).unwrap();
        assert_eq!(cfg.database.path, PathBuf::from("/data/bookings.db"));
        assert_eq!(cfg.database.pool_size, 4);
        assert_eq!(cfg.carts.ttl_minutes, 15);
    }

    #[test]
    fn parse_empty_json_uses_defaults() {
        let cfg = Config::from_json("{}").unwrap();
        assert_eq!(cfg.carts.ttl_minutes, 30);
    }

    #[test]
    fn parse_invalid_json_is_validation_error() {
        let err = Config::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"database": {{"pool_size": 8}}}}"#).unwrap();
        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.database.pool_size, 8);
    }

    #[test]
    fn load_or_default_with_missing_file() {
        let cfg = Config::load_or_default(Some(Path::new("/nonexistent/staybook.json")));
        assert_eq!(cfg.database.pool_size, 4);
    }

    #[test]
    fn cart_expiry_uses_ttl() {
        let now = Utc::now();
        let carts = CartConfig { ttl_minutes: 30 };
        assert_eq!(carts.expires_at(now).unwrap() - now, Duration::minutes(30));
    }

    #[test]
    fn cart_expiry_rejects_out_of_range_ttl() {
        let now = Utc::now();
        for ttl_minutes in [0, -5, MAX_CART_TTL_MINUTES + 1, i64::MAX, i64::MIN] {
            let carts = CartConfig { ttl_minutes };
            assert!(
                matches!(carts.expires_at(now), Err(Error::Validation(_))),
                "ttl {ttl_minutes}"
            );
        }
        let longest = CartConfig {
            ttl_minutes: MAX_CART_TTL_MINUTES,
        };
        assert_eq!(longest.expires_at(now).unwrap() - now, Duration::days(30));
    }

    #[test]
    fn huge_ttl_from_json_warns() {
        let cfg = Config::from_json(r#"{"carts": {"ttl_minutes": 9223372036854775807}}"#).unwrap();
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.contains("maximum")), "{warnings:?}");
    }
}
