//! Canonical encoding and RSA signatures over license content.
//!
//! The signed bytes are the compact JSON encoding of [`License`]: fields in
//! declaration order, map keys sorted, empty optional fields omitted. The
//! signature is RSASSA-PKCS1-v1_5 over the SHA-256 digest of those bytes,
//! carried as standard base64.

use crate::error::{LicenseError, LicenseResult};
use crate::license::License;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Returns the bytes a signature covers.
pub fn canonical_bytes(license: &License) -> LicenseResult<Vec<u8>> {
    Ok(serde_json::to_vec(license)?)
}

fn digest(license: &License) -> LicenseResult<[u8; 32]> {
    let bytes = canonical_bytes(license)?;
    Ok(Sha256::digest(&bytes).into())
}

/// Signs license content and returns the base64 signature.
pub fn sign(key: &RsaPrivateKey, license: &License) -> LicenseResult<String> {
    let hash = digest(license)?;
    let signature = key
        .sign_with_rng(&mut rand::thread_rng(), Pkcs1v15Sign::new::<Sha256>(), &hash)
        .map_err(|e| LicenseError::Signing(e.to_string()))?;
    Ok(BASE64.encode(signature))
}

/// Verifies a base64 signature over license content.
///
/// Every failure, whatever the cause, is reported as
/// [`LicenseError::InvalidSignature`].
pub fn verify(key: &RsaPublicKey, license: &License, signature: &str) -> LicenseResult<()> {
    let signature = BASE64.decode(signature).map_err(|e| {
        debug!(error = %e, "Signature is not valid base64");
        LicenseError::InvalidSignature
    })?;

    let hash = digest(license).map_err(|e| {
        debug!(error = %e, "Failed to encode license content");
        LicenseError::InvalidSignature
    })?;

    key.verify(Pkcs1v15Sign::new::<Sha256>(), &hash, &signature)
        .map_err(|e| {
            debug!(error = %e, "Signature rejected");
            LicenseError::InvalidSignature
        })
}
