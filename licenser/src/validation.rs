//! License validation.
//!
//! Validation never fails with an error: an unacceptable license is an
//! ordinary outcome, reported as a [`ValidationResult`] listing every reason.

use crate::license::SignedLicense;
use crate::signer;
use rsa::RsaPublicKey;
use serde::{Deserialize, Serialize};

pub const SIGNATURE_VERIFICATION_FAILED: &str = "signature verification failed";
pub const LICENSE_EXPIRED_ERROR: &str = "license has expired";
pub const CUSTOMER_REQUIRED: &str = "customer is required";
pub const APP_ID_REQUIRED: &str = "app ID is required";
pub const SERVICE_REQUIRED: &str = "at least one service is required";

/// Outcome of validating a signed license.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff `errors` is empty.
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Advisory findings that do not affect `valid`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Records a failure.
    pub fn error(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(message.into());
    }

    /// Records an advisory finding.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Validates a signed license against `public_key` as of `now`.
///
/// Runs all checks in a fixed order without stopping at the first failure:
/// signature, expiry, customer, application ID, services.
#[must_use]
pub fn validate(public_key: &RsaPublicKey, license: &SignedLicense, now: i64) -> ValidationResult {
    let mut result = ValidationResult {
        valid: true,
        ..ValidationResult::default()
    };
    let data = &license.data;

    if signer::verify(public_key, data, &license.signature).is_err() {
        result.error(SIGNATURE_VERIFICATION_FAILED);
    }

    if data.is_expired_at(now) {
        result.error(LICENSE_EXPIRED_ERROR);
    }

    if data.customer.is_empty() {
        result.error(CUSTOMER_REQUIRED);
    }

    if data.app_id.is_empty() {
        result.error(APP_ID_REQUIRED);
    }

    if data.services.is_empty() {
        result.error(SERVICE_REQUIRED);
    }

    result
}
