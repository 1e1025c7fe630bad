// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use scrypt::Params;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroize;

use crate::auth::{CredentialVerifier, PasswordRequirements, TokenLifetimes, MIN_PASSWORD_LENGTH};

/// Environment variable prefix, e.g. `KEYWARD_SIGNING_SECRET`
pub const ENV_PREFIX: &str = "KEYWARD_";

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Shortest accepted HMAC signing secret, in bytes
pub const MIN_SECRET_LEN: usize = 32;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}

/// Token signing secret. Redacted in `Debug`, wiped on drop.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SigningSecret(String);

impl SigningSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret([redacted])")
    }
}

impl Drop for SigningSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// scrypt cost parameters for newly hashed passwords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingSettings {
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

impl Default for HashingSettings {
    fn default() -> Self {
        Self {
            log_n: Params::RECOMMENDED_LOG_N,
            r: Params::RECOMMENDED_R,
            p: Params::RECOMMENDED_P,
        }
    }
}

impl HashingSettings {
    pub fn verifier(&self) -> Result<CredentialVerifier, ConfigError> {
        let params = Params::new(self.log_n, self.r, self.p, Params::RECOMMENDED_LEN)
            .map_err(|e| ConfigError::Invalid(format!("scrypt parameters: {e}")))?;
        Ok(CredentialVerifier::new(params))
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Data directory path
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// HMAC secret used to sign and verify every token
    pub signing_secret: SigningSecret,
    /// Session token TTL in seconds
    pub session_ttl_secs: u64,
    /// Reset token TTL in seconds
    pub reset_ttl_secs: u64,
    /// Password requirements
    pub password_requirements: PasswordRequirements,
    /// Password hashing cost
    pub hashing: HashingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            signing_secret: SigningSecret::default(),
            session_ttl_secs: 60 * 60 * 24, // 24 hours
            reset_ttl_secs: 15 * 60,        // 15 minutes
            password_requirements: PasswordRequirements::default(),
            hashing: HashingSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from `config.toml` in the working directory and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(Path::new(DEFAULT_CONFIG_FILE)))
    }

    /// Load settings from an explicit TOML file and the environment
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(path.as_ref()))
    }

    /// Defaults, then the TOML file, then `KEYWARD_*` variables
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let settings: Settings = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the service must not start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown log level '{}'",
                self.log_level
            )));
        }

        if self.session_ttl_secs == 0 || self.reset_ttl_secs == 0 {
            return Err(ConfigError::Invalid("token TTLs must be positive".to_string()));
        }

        if self.reset_ttl_secs >= self.session_ttl_secs {
            return Err(ConfigError::Invalid(
                "reset TTL must be shorter than the session TTL".to_string(),
            ));
        }

        if self.signing_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "signing secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        if self.password_requirements.min_length < MIN_PASSWORD_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "password min_length must be at least {MIN_PASSWORD_LENGTH}"
            )));
        }

        self.hashing.verifier()?;
        Ok(())
    }

    pub fn token_lifetimes(&self) -> TokenLifetimes {
        TokenLifetimes {
            session: Duration::from_secs(self.session_ttl_secs),
            reset: Duration::from_secs(self.reset_ttl_secs),
        }
    }
}
