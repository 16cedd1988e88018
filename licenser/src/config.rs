//! Manager configuration.
//!
//! Can be built in code or read from a TOML document:
//!
//! ```toml
//! mode = "generator"
//! private_key_path = "keys/private.pem"
//! public_key_path = "keys/public.pem"
//! key_size = 2048
//! ```

use crate::error::{LicenseError, LicenseResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default RSA modulus size in bits for freshly generated keys.
pub const DEFAULT_KEY_SIZE: usize = 2048;

/// Operating mode, fixed for a manager's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    /// Holds a private key and can issue licenses.
    Generator,
    #[default]
    /// Holds only a public key and can only verify.
    Validator,
}

impl OperatingMode {
    #[must_use]
    pub fn is_generator(&self) -> bool {
        matches!(self, Self::Generator)
    }
}

fn default_key_size() -> usize {
    DEFAULT_KEY_SIZE
}

/// Key sources and mode for a [`crate::Manager`].
///
/// Inline PEM takes precedence over a path for the same key.
#[derive(Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    #[serde(default)]
    pub mode: OperatingMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_pem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_pem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_path: Option<PathBuf>,
    /// Modulus size used when a fresh key pair is generated.
    #[serde(default = "default_key_size")]
    pub key_size: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            mode: OperatingMode::default(),
            private_key_pem: None,
            private_key_path: None,
            public_key_pem: None,
            public_key_path: None,
            key_size: DEFAULT_KEY_SIZE,
        }
    }
}

impl fmt::Debug for ManagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerConfig")
            .field("mode", &self.mode)
            .field(
                "private_key_pem",
                &self.private_key_pem.as_ref().map(|_| "[REDACTED]"),
            )
            .field("private_key_path", &self.private_key_path)
            .field("public_key_pem", &self.public_key_pem.is_some())
            .field("public_key_path", &self.public_key_path)
            .field("key_size", &self.key_size)
            .finish()
    }
}

impl ManagerConfig {
    /// Generator-mode config; generates a fresh key unless one is supplied.
    #[must_use]
    pub fn generator() -> Self {
        Self {
            mode: OperatingMode::Generator,
            ..Self::default()
        }
    }

    /// Validator-mode config; a public key must be supplied.
    #[must_use]
    pub fn validator() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_private_key_pem(mut self, pem: impl Into<String>) -> Self {
        self.private_key_pem = Some(pem.into());
        self
    }

    #[must_use]
    pub fn with_private_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.private_key_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_public_key_pem(mut self, pem: impl Into<String>) -> Self {
        self.public_key_pem = Some(pem.into());
        self
    }

    #[must_use]
    pub fn with_public_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.public_key_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_key_size(mut self, bits: usize) -> Self {
        self.key_size = bits;
        self
    }

    /// Parses a config from TOML text.
    pub fn from_toml_str(contents: &str) -> LicenseResult<Self> {
        toml::from_str(contents).map_err(|e| LicenseError::Config(e.to_string()))
    }

    /// Reads and parses a TOML config file.
    ///
    /// Relative key paths are resolved against the config file's directory.
    pub fn from_toml_file(path: impl AsRef<Path>) -> LicenseResult<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| LicenseError::io(path, e))?;
        let mut config = Self::from_toml_str(&contents)?;

        if let Some(base) = path.parent() {
            for key_path in [&mut config.private_key_path, &mut config.public_key_path]
                .into_iter()
                .flatten()
            {
                if key_path.is_relative() {
                    *key_path = base.join(&*key_path);
                }
            }
        }
        Ok(config)
    }
}
