//! Convenience predicates and formatting for license content.
//!
//! Time-dependent helpers read the wall clock; each has an `_at` variant
//! taking an explicit `now` (seconds since epoch).

use crate::license::{LICENSE_EXPIRED, LICENSE_NEVER_EXPIRES, License, LicenseStatus};
use chrono::{DateTime, Duration, Utc};

fn now() -> i64 {
    Utc::now().timestamp()
}

/// Seconds as a duration, saturating at the representable range.
pub(crate) fn seconds(secs: i64) -> Duration {
    Duration::try_seconds(secs).unwrap_or(if secs < 0 { Duration::MIN } else { Duration::MAX })
}

/// Returns true if any service matches `identifier` by ID or name.
#[must_use]
pub fn has_service(license: &License, identifier: &str) -> bool {
    license
        .services
        .iter()
        .any(|s| s.id == identifier || s.name == identifier)
}

/// Returns true if any service has the given ID.
#[must_use]
pub fn has_service_by_id(license: &License, service_id: &str) -> bool {
    license.services.iter().any(|s| s.id == service_id)
}

/// Returns true if any service has the given display name.
#[must_use]
pub fn has_service_by_name(license: &License, service_name: &str) -> bool {
    license.services.iter().any(|s| s.name == service_name)
}

/// Returns true if the license expires within `within` from now.
///
/// Perpetual licenses never expire soon; already-expired ones always do.
#[must_use]
pub fn is_expiring_soon(license: &License, within: Duration) -> bool {
    is_expiring_soon_at(license, within, now())
}

#[must_use]
pub fn is_expiring_soon_at(license: &License, within: Duration, now: i64) -> bool {
    if license.is_perpetual() {
        return false;
    }
    seconds(license.expires_at.saturating_sub(now)) <= within
}

/// Returns the time left until `expires_at`, or zero if perpetual or expired.
#[must_use]
pub fn remaining_time(expires_at: i64) -> Duration {
    remaining_time_at(expires_at, now())
}

#[must_use]
pub fn remaining_time_at(expires_at: i64, now: i64) -> Duration {
    if expires_at <= 0 || expires_at <= now {
        return Duration::zero();
    }
    seconds(expires_at - now)
}

/// Formats the time left until `expires_at` as `"12d 3h 4m"`.
#[must_use]
pub fn format_time_until_expiry(expires_at: i64) -> String {
    format_time_until_expiry_at(expires_at, now())
}

#[must_use]
pub fn format_time_until_expiry_at(expires_at: i64, now: i64) -> String {
    if expires_at <= 0 {
        return LICENSE_NEVER_EXPIRES.to_string();
    }
    let remaining = remaining_time_at(expires_at, now);
    if remaining.is_zero() {
        return LICENSE_EXPIRED.to_string();
    }
    format_duration(remaining)
}

/// Formats an expiration timestamp as a UTC date and time.
#[must_use]
pub fn format_expiry(expires_at: i64) -> String {
    if expires_at <= 0 {
        return LICENSE_NEVER_EXPIRES.to_string();
    }
    match DateTime::from_timestamp(expires_at, 0) {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => expires_at.to_string(),
    }
}

/// Returns the status of a license right now.
#[must_use]
pub fn license_status(license: &License) -> LicenseStatus {
    license_status_at(license, now())
}

#[must_use]
pub fn license_status_at(license: &License, now: i64) -> LicenseStatus {
    if license.is_expired_at(now) {
        LicenseStatus::Expired
    } else {
        LicenseStatus::Active
    }
}

/// Formats a duration as days, hours and minutes, omitting zero parts.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    if d < Duration::zero() {
        return LICENSE_EXPIRED.to_string();
    }

    let days = d.num_days();
    let hours = d.num_hours() % 24;
    let minutes = d.num_minutes() % 60;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }

    if parts.is_empty() {
        return "Less than 1 minute".to_string();
    }
    parts.join(" ")
}
