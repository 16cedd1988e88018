//! The license manager: issues, persists and validates licenses.

use crate::config::{ManagerConfig, OperatingMode};
use crate::error::{LicenseError, LicenseResult};
use crate::keys::KeyPair;
use crate::license::{ALGORITHM, License, LicenseInfo, SignedLicense};
use crate::validation::{self, ValidationResult};
use crate::{signer, storage};
use rsa::RsaPublicKey;
use std::path::Path;
use tracing::{debug, info};
use zeroize::Zeroizing;

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Issues and validates licenses with one resolved key pair.
///
/// Keys are resolved once in [`Manager::new`] and never change, so a manager
/// can be shared between threads.
#[derive(Debug)]
pub struct Manager {
    keys: KeyPair,
    mode: OperatingMode,
}

impl Manager {
    /// Creates a manager, resolving key material from `config`.
    ///
    /// # Errors
    ///
    /// Fails if a configured key is malformed or unreadable, if key
    /// generation fails, or if no public key can be resolved.
    pub fn new(config: ManagerConfig) -> LicenseResult<Self> {
        let keys = KeyPair::resolve(&config)?;
        info!(mode = ?config.mode, key_id = %keys.fingerprint(), "License manager ready");
        Ok(Self {
            keys,
            mode: config.mode,
        })
    }

    /// Creates a validator from a public key PEM.
    pub fn validator(public_key_pem: &str) -> LicenseResult<Self> {
        Self::new(ManagerConfig::validator().with_public_key_pem(public_key_pem))
    }

    #[must_use]
    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// Returns the key used for verification.
    #[must_use]
    pub fn public_key(&self) -> &RsaPublicKey {
        self.keys.public_key()
    }

    /// Fingerprint stamped into the `key_id` of generated licenses.
    #[must_use]
    pub fn key_id(&self) -> &str {
        self.keys.fingerprint()
    }

    /// Signs license content.
    ///
    /// `license` is not modified. If its `issued_at` is unset, the returned
    /// copy is stamped with the current time before signing.
    ///
    /// # Errors
    ///
    /// [`LicenseError::GeneratorModeRequired`] on a validator, or the error
    /// for the first missing required field.
    pub fn generate(&self, license: &License) -> LicenseResult<SignedLicense> {
        let key = match (self.mode, self.keys.private_key()) {
            (OperatingMode::Generator, Some(key)) => key,
            _ => return Err(LicenseError::GeneratorModeRequired),
        };
        license.check_required()?;

        let mut data = license.clone();
        if data.issued_at == 0 {
            data.issued_at = now();
        }

        let signature = signer::sign(key, &data)?;
        debug!(customer = %data.customer, app_id = %data.app_id, "Generated license");

        Ok(SignedLicense {
            data,
            signature,
            key_id: self.key_id().to_string(),
            algorithm: ALGORITHM.to_string(),
            created_at: now(),
        })
    }

    /// Validates a signed license as of now.
    #[must_use]
    pub fn validate(&self, license: &SignedLicense) -> ValidationResult {
        self.validate_at(license, now())
    }

    /// Validates a signed license as of `now` (seconds since epoch).
    #[must_use]
    pub fn validate_at(&self, license: &SignedLicense, now: i64) -> ValidationResult {
        validation::validate(self.keys.public_key(), license, now)
    }

    /// Writes a license file (owner read/write only).
    pub fn save_license(&self, license: &SignedLicense, path: impl AsRef<Path>) -> LicenseResult<()> {
        let path = path.as_ref();
        storage::write_license(license, path)?;
        info!(path = %path.display(), "Saved license");
        Ok(())
    }

    /// Reads a license file without validating it.
    pub fn load_license(&self, path: impl AsRef<Path>) -> LicenseResult<SignedLicense> {
        storage::read_license(path)
    }

    /// Reads a license file and validates it.
    ///
    /// # Errors
    ///
    /// Only for read and decode failures. A license that fails validation is
    /// returned with an invalid [`ValidationResult`].
    pub fn load_and_validate(
        &self,
        path: impl AsRef<Path>,
    ) -> LicenseResult<(SignedLicense, ValidationResult)> {
        let license = self.load_license(path)?;
        let result = self.validate(&license);
        Ok((license, result))
    }

    /// Writes the private key and the public key PEM files.
    pub fn save_keys(
        &self,
        private_key_path: impl AsRef<Path>,
        public_key_path: impl AsRef<Path>,
    ) -> LicenseResult<()> {
        let private_pem = self.export_private_key()?;
        storage::write_private_file(private_key_path.as_ref(), private_pem.as_bytes())?;
        self.save_public_key(public_key_path)?;
        info!(
            private_key = %private_key_path.as_ref().display(),
            "Saved key pair"
        );
        Ok(())
    }

    /// Writes the public key PEM file.
    pub fn save_public_key(&self, path: impl AsRef<Path>) -> LicenseResult<()> {
        let pem = self.export_public_key()?;
        storage::write_private_file(path.as_ref(), pem.as_bytes())
    }

    /// Returns the private and public keys as PEM.
    pub fn export_keys(&self) -> LicenseResult<(Zeroizing<String>, String)> {
        Ok((self.export_private_key()?, self.export_public_key()?))
    }

    /// Returns the private key as PKCS#1 PEM.
    ///
    /// # Errors
    ///
    /// [`LicenseError::GeneratorModeRequired`] on a validator.
    pub fn export_private_key(&self) -> LicenseResult<Zeroizing<String>> {
        self.keys.private_key_pem()
    }

    /// Returns the verification key as SPKI PEM.
    pub fn export_public_key(&self) -> LicenseResult<String> {
        self.keys.public_key_pem()
    }

    /// Returns true if the license has expired.
    #[must_use]
    pub fn is_expired(&self, license: &License) -> bool {
        license.is_expired_at(now())
    }

    /// Returns true if the license has not expired.
    #[must_use]
    pub fn is_active(&self, license: &License) -> bool {
        !self.is_expired(license)
    }

    /// Fails with [`LicenseError::Expired`] if the license has expired.
    pub fn check_expiration(&self, license: &License) -> LicenseResult<()> {
        if self.is_expired(license) {
            return Err(LicenseError::Expired(license.expires_at));
        }
        Ok(())
    }

    /// Returns the display view of a license.
    #[must_use]
    pub fn license_info(&self, license: &License) -> LicenseInfo {
        LicenseInfo::from_license_at(license, now())
    }
}
