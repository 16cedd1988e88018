//! Error types for license issuing and verification.

use std::path::PathBuf;
use thiserror::Error;

/// Licensing-specific errors.
///
/// A failed validation is not an error: [`crate::ValidationResult`] carries
/// the itemized reasons instead.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Private key PEM is malformed or is not an RSA private key.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Public key PEM is malformed or is not an RSA public key.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// No public key could be resolved from the configuration.
    #[error("no public key provided")]
    NoPublicKey,

    /// Fresh key pair generation failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// A private-key operation was requested on a validator-only manager.
    #[error("generator mode is required")]
    GeneratorModeRequired,

    /// License content has no customer.
    #[error("customer name is required")]
    CustomerRequired,

    /// License content has no application ID.
    #[error("application ID is required")]
    AppIdRequired,

    /// License content lists no services.
    #[error("at least one service must be allowed")]
    NoServices,

    /// License expired at the given Unix timestamp.
    #[error("license has expired (expires_at {0})")]
    Expired(i64),

    /// Signature did not verify against the public key.
    #[error("signature verification failed")]
    InvalidSignature,

    /// The signing primitive itself failed.
    #[error("failed to sign license: {0}")]
    Signing(String),

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A license file does not decode as a signed license.
    #[error("invalid license file {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LicenseError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
