//! RSA key material: loading, generation, PEM encoding and fingerprints.
//!
//! Private keys are PKCS#1 PEM (`RSA PRIVATE KEY`), with PKCS#8
//! (`PRIVATE KEY`) accepted on input. Public keys are SPKI PEM
//! (`PUBLIC KEY`).

use crate::config::ManagerConfig;
use crate::error::{LicenseError, LicenseResult};
use crate::storage;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey, LineEnding};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};
use zeroize::Zeroizing;

/// Where the private key of a generator came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Inline PEM text.
    Pem,
    /// PEM file on disk.
    File,
    /// Generated at construction.
    Generated,
}

/// Resolved key material for one manager.
///
/// `private` is present only in generator mode. `public` is the key used
/// for verification, which may differ from the private key's own public
/// half when a public key was configured explicitly.
pub struct KeyPair {
    private: Option<RsaPrivateKey>,
    source: Option<KeySource>,
    public: RsaPublicKey,
    fingerprint: String,
}

impl KeyPair {
    /// Resolves key material for the given configuration.
    ///
    /// In generator mode the private key comes from inline PEM, then a file,
    /// then fresh generation. A configured public key always overrides the
    /// verification key. Fails if no public key is available at the end.
    pub fn resolve(config: &ManagerConfig) -> LicenseResult<Self> {
        let (private, source) = if config.mode.is_generator() {
            let (key, source) = resolve_private_key(config)?;
            info!(?source, bits = key_bits(&key), "Resolved signing key");
            (Some(key), Some(source))
        } else {
            if config.private_key_pem.is_some() || config.private_key_path.is_some() {
                warn!("Private key configured for a validator; ignoring it");
            }
            (None, None)
        };

        let own_public = private.as_ref().map(RsaPrivateKey::to_public_key);

        let configured_public = if let Some(pem) = &config.public_key_pem {
            Some(parse_public_key_pem(pem)?)
        } else if let Some(path) = &config.public_key_path {
            Some(load_public_key(path)?)
        } else {
            None
        };

        if let (Some(own), Some(configured)) = (&own_public, &configured_public) {
            if own != configured {
                warn!("Configured public key does not match the signing key");
            }
        }

        // The fingerprint names the key that produces signatures.
        let fingerprint_source = own_public.as_ref().or(configured_public.as_ref());
        let fingerprint = match fingerprint_source {
            Some(key) => fingerprint(key)?,
            None => return Err(LicenseError::NoPublicKey),
        };

        let public = configured_public
            .or(own_public)
            .ok_or(LicenseError::NoPublicKey)?;

        Ok(Self {
            private,
            source,
            public,
            fingerprint,
        })
    }

    /// Generates a fresh key pair of `bits` bits.
    pub fn generate(bits: usize) -> LicenseResult<Self> {
        let private = generate_private_key(bits)?;
        let public = private.to_public_key();
        let fingerprint = fingerprint(&public)?;
        Ok(Self {
            private: Some(private),
            source: Some(KeySource::Generated),
            public,
            fingerprint,
        })
    }

    /// Returns the signing key, if this pair has one.
    #[must_use]
    pub fn private_key(&self) -> Option<&RsaPrivateKey> {
        self.private.as_ref()
    }

    /// Where the signing key came from, or `None` for a validator.
    #[must_use]
    pub fn source(&self) -> Option<KeySource> {
        self.source
    }

    /// Returns the verification key.
    #[must_use]
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// Returns true if a signing key is held.
    #[must_use]
    pub fn can_sign(&self) -> bool {
        self.private.is_some()
    }

    /// Lowercase hex SHA-256 of the signing key's public half (or of the
    /// verification key when no signing key is held).
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Exports the private key as PKCS#1 PEM.
    pub fn private_key_pem(&self) -> LicenseResult<Zeroizing<String>> {
        let key = self
            .private
            .as_ref()
            .ok_or(LicenseError::GeneratorModeRequired)?;
        key.to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| LicenseError::InvalidPrivateKey(e.to_string()))
    }

    /// Exports the verification key as SPKI PEM.
    pub fn public_key_pem(&self) -> LicenseResult<String> {
        public_key_pem(&self.public)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("private", &self.private.as_ref().map(|_| "[REDACTED]"))
            .field("source", &self.source)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

fn resolve_private_key(config: &ManagerConfig) -> LicenseResult<(RsaPrivateKey, KeySource)> {
    if let Some(pem) = &config.private_key_pem {
        Ok((parse_private_key_pem(pem)?, KeySource::Pem))
    } else if let Some(path) = &config.private_key_path {
        Ok((load_private_key(path)?, KeySource::File))
    } else {
        Ok((generate_private_key(config.key_size)?, KeySource::Generated))
    }
}

fn key_bits(key: &RsaPrivateKey) -> usize {
    use rsa::traits::PublicKeyParts;
    key.size() * 8
}

/// Smallest modulus accepted for freshly generated keys.
pub const MIN_KEY_SIZE: usize = 1024;

/// Generates a new RSA private key.
pub fn generate_private_key(bits: usize) -> LicenseResult<RsaPrivateKey> {
    if bits < MIN_KEY_SIZE {
        return Err(LicenseError::KeyGeneration(format!(
            "{bits}-bit keys are too small (minimum {MIN_KEY_SIZE})"
        )));
    }
    let mut rng = rand::thread_rng();
    RsaPrivateKey::new(&mut rng, bits).map_err(|e| LicenseError::KeyGeneration(e.to_string()))
}

/// Parses an RSA private key from PKCS#1 or PKCS#8 PEM.
pub fn parse_private_key_pem(pem: &str) -> LicenseResult<RsaPrivateKey> {
    let pem = pem.trim_start();
    match RsaPrivateKey::from_pkcs1_pem(pem) {
        Ok(key) => Ok(key),
        Err(pkcs1_err) => RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|_| LicenseError::InvalidPrivateKey(pkcs1_err.to_string())),
    }
}

/// Parses an RSA public key from SPKI PEM.
pub fn parse_public_key_pem(pem: &str) -> LicenseResult<RsaPublicKey> {
    RsaPublicKey::from_public_key_pem(pem.trim_start())
        .map_err(|e| LicenseError::InvalidPublicKey(e.to_string()))
}

/// Reads and parses a private key PEM file.
pub fn load_private_key(path: impl AsRef<Path>) -> LicenseResult<RsaPrivateKey> {
    let bytes = Zeroizing::new(storage::read_file(path)?);
    let pem = std::str::from_utf8(&bytes)
        .map_err(|_| LicenseError::InvalidPrivateKey("file is not valid UTF-8".to_string()))?;
    parse_private_key_pem(pem)
}

/// Reads and parses a public key PEM file.
pub fn load_public_key(path: impl AsRef<Path>) -> LicenseResult<RsaPublicKey> {
    let bytes = storage::read_file(path)?;
    let pem = std::str::from_utf8(&bytes)
        .map_err(|_| LicenseError::InvalidPublicKey("file is not valid UTF-8".to_string()))?;
    parse_public_key_pem(pem)
}

/// Encodes a public key as SPKI PEM.
pub fn public_key_pem(key: &RsaPublicKey) -> LicenseResult<String> {
    key.to_public_key_pem(LineEnding::LF)
        .map_err(|e| LicenseError::InvalidPublicKey(e.to_string()))
}

/// Lowercase hex SHA-256 of the DER-encoded public key.
pub fn fingerprint(key: &RsaPublicKey) -> LicenseResult<String> {
    let der = key
        .to_public_key_der()
        .map_err(|e| LicenseError::InvalidPublicKey(e.to_string()))?;
    Ok(hex::encode(Sha256::digest(der.as_bytes())))
}
