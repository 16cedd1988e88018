//! License records: the signable content, the signed envelope and the
//! display projection.
//!
//! Field order and the omission rules on these structs define the bytes that
//! get signed. Changing either invalidates every license issued before.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Algorithm tag written into every signed license.
pub const ALGORITHM: &str = "RS256";

/// Time-until-expiry text for a license past its expiry.
pub const LICENSE_EXPIRED: &str = "License expired";

/// Time-until-expiry text for a perpetual license.
pub const LICENSE_NEVER_EXPIRES: &str = "License never expires";

fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// A licensed service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Service identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Service {
    /// Creates a service with an identifier and display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// The signable license content.
///
/// Customer, application ID and at least one service are required before a
/// license can be generated, but a value may be incomplete while it is being
/// assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// Customer name.
    #[serde(default)]
    pub customer: String,
    /// Application identifier.
    #[serde(default)]
    pub app_id: String,
    /// Licensed services, in issue order.
    #[serde(default)]
    pub services: Vec<Service>,
    /// Usage limits.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, i64>,
    /// Feature flags.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: BTreeMap<String, bool>,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default)]
    pub issued_at: i64,
    /// Expiration timestamp (seconds since epoch); 0 means perpetual.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub expires_at: i64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub environment: String,
}

impl License {
    /// Returns true if the license has no expiration.
    #[must_use]
    pub fn is_perpetual(&self) -> bool {
        self.expires_at <= 0
    }

    /// Returns true if the license has expired as of `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at > 0 && now > self.expires_at
    }

    /// Checks the fields required for generation, in a fixed order.
    pub fn check_required(&self) -> crate::LicenseResult<()> {
        if self.customer.is_empty() {
            return Err(crate::LicenseError::CustomerRequired);
        }
        if self.app_id.is_empty() {
            return Err(crate::LicenseError::AppIdRequired);
        }
        if self.services.is_empty() {
            return Err(crate::LicenseError::NoServices);
        }
        Ok(())
    }
}

/// A license together with its signature envelope.
///
/// Only `data` is covered by the signature. The envelope fields can be
/// changed without the change being detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedLicense {
    /// Signed content.
    #[serde(default)]
    pub data: License,
    /// Base64 RSA signature over the canonical encoding of `data`.
    #[serde(default)]
    pub signature: String,
    /// Fingerprint of the signing key. Informational only.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub algorithm: String,
    /// When the envelope was created (seconds since epoch).
    #[serde(default)]
    pub created_at: i64,
}

/// Coarse license status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    /// Perpetual or not yet expired.
    Active,
    /// Past its expiration timestamp.
    Expired,
}

impl LicenseStatus {
    /// Returns the status as a lowercase string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation view of a license with precomputed status fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseInfo {
    pub customer: String,
    pub app_id: String,
    pub issued_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub status: LicenseStatus,
    pub time_until_expiry: String,
    pub services: Vec<Service>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub environment: String,
}

impl LicenseInfo {
    /// Projects a license into its display form as of `now`.
    #[must_use]
    pub fn from_license_at(license: &License, now: i64) -> Self {
        let status = crate::helpers::license_status_at(license, now);
        let (expires_at, time_until_expiry) = if license.is_perpetual() {
            (None, LICENSE_NEVER_EXPIRES.to_string())
        } else {
            let text = match status {
                LicenseStatus::Expired => LICENSE_EXPIRED.to_string(),
                LicenseStatus::Active => crate::helpers::format_duration(crate::helpers::seconds(
                    license.expires_at.saturating_sub(now),
                )),
            };
            (DateTime::from_timestamp(license.expires_at, 0), text)
        };

        Self {
            customer: license.customer.clone(),
            app_id: license.app_id.clone(),
            issued_at: DateTime::from_timestamp(license.issued_at, 0).unwrap_or_default(),
            expires_at,
            status,
            time_until_expiry,
            services: license.services.clone(),
            limits: license.limits.clone(),
            features: license.features.clone(),
            metadata: license.metadata.clone(),
            version: license.version.clone(),
            environment: license.environment.clone(),
        }
    }
}
