// ============================
// accountd-backend/src/config.rs
// ============================
//! Configuration management.
//!
//! Sources are merged in order, later ones winning: built-in defaults, the
//! config file, `ACCOUNTD_`-prefixed environment variables (nested keys split
//! on `__`), and finally a bare `JWT_SECRET`.
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Config file looked up in the working directory by [`Settings::load`]
pub const DEFAULT_CONFIG_FILE: &str = "accountd.toml";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "ACCOUNTD_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Output length of the scrypt hash in bytes
pub const HASH_LEN: usize = 32;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Directory holding the account documents
    pub data_dir: PathBuf,
    /// Default log level, overridden by `RUST_LOG`
    pub log_level: String,
    /// Secret used to sign session tokens
    #[serde(default)]
    pub jwt_secret: Option<String>,
    /// scrypt cost parameters
    #[serde(default)]
    pub password_hash: PasswordHashSettings,
}

/// scrypt cost parameters for new hashes. Existing hashes carry their own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasswordHashSettings {
    /// log2 of the CPU/memory cost
    pub log_n: u8,
    /// Block size
    pub r: u32,
    /// Parallelism
    pub p: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            jwt_secret: None,
            password_hash: PasswordHashSettings::default(),
        }
    }
}

impl Default for PasswordHashSettings {
    fn default() -> Self {
        Self { log_n: 15, r: 8, p: 1 }
    }
}

impl PasswordHashSettings {
    /// Cheap parameters for tests. Never use these in production.
    pub const fn insecure_fast() -> Self {
        Self { log_n: 4, r: 8, p: 1 }
    }

    /// Build the scrypt parameter set
    pub fn params(&self) -> Result<scrypt::Params> {
        scrypt::Params::new(self.log_n, self.r, self.p, HASH_LEN)
            .map_err(|e| anyhow::anyhow!("invalid scrypt parameters: {e}"))
    }
}

impl Settings {
    /// Load settings from `accountd.toml` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::figment(Path::new(DEFAULT_CONFIG_FILE))
            .extract()
            .context("failed to load settings")
    }

    /// Load settings from an explicit config file and the environment
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            bail!("config file {} does not exist", path.display());
        }
        Self::figment(path)
            .extract()
            .with_context(|| format!("failed to load settings from {}", path.display()))
    }

    fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Env::raw().only(&["JWT_SECRET"]).map(|_| "jwt_secret".into()))
    }

    /// Check that the settings are usable
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            bail!(
                "invalid log level {:?}, expected one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            );
        }

        if let Some(secret) = &self.jwt_secret {
            if secret.trim().is_empty() {
                bail!("jwt_secret must not be empty when set");
            }
        }

        self.password_hash.params()?;
        Ok(())
    }
}
