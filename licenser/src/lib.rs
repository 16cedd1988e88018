//! Offline software licensing.
//!
//! A vendor runs a [`Manager`] in generator mode to sign [`License`] records
//! with an RSA private key. The shipped product runs a manager in validator
//! mode with only the public key and checks licenses without contacting any
//! server.
//!
//! # Signature scope
//!
//! The signature covers the canonical JSON encoding of the license content
//! (the `data` object of a license file). The envelope fields `signature`,
//! `key_id`, `algorithm` and `created_at` are not covered.
//!
//! # License File Format
//!
//! ```json
//! {
//!   "data": { "customer": "...", "app_id": "...", "services": [...], "issued_at": 0 },
//!   "signature": "base64...",
//!   "key_id": "hex sha-256 of the signing public key",
//!   "algorithm": "RS256",
//!   "created_at": 0
//! }
//! ```

mod builder;
mod config;
mod error;
pub mod helpers;
pub mod keys;
mod license;
mod manager;
pub mod signer;
pub mod storage;
mod validation;

pub use builder::LicenseBuilder;
pub use config::{DEFAULT_KEY_SIZE, ManagerConfig, OperatingMode};
pub use error::{LicenseError, LicenseResult};
pub use helpers::{
    format_expiry, format_time_until_expiry, has_service, has_service_by_id, has_service_by_name,
    is_expiring_soon, license_status, remaining_time,
};
pub use keys::{KeyPair, KeySource};
pub use license::{
    ALGORITHM, LICENSE_EXPIRED, LICENSE_NEVER_EXPIRES, License, LicenseInfo, LicenseStatus,
    Service, SignedLicense,
};
pub use manager::Manager;
pub use validation::{
    APP_ID_REQUIRED, CUSTOMER_REQUIRED, LICENSE_EXPIRED_ERROR, SERVICE_REQUIRED,
    SIGNATURE_VERIFICATION_FAILED, ValidationResult, validate,
};

pub use rsa::{RsaPrivateKey, RsaPublicKey};
