//! Shared test helpers for license tests.

#![allow(dead_code)]

use licenser::{License, LicenseBuilder, Manager, ManagerConfig, Service, keys};
use std::sync::OnceLock;

/// Small key size so generation stays fast in tests.
pub const TEST_KEY_BITS: usize = 1024;

/// Returns a PKCS#1 private key PEM generated once per test binary.
pub fn private_key_pem() -> &'static str {
    static PEM: OnceLock<String> = OnceLock::new();
    PEM.get_or_init(|| {
        let pair = keys::KeyPair::generate(TEST_KEY_BITS).unwrap();
        pair.private_key_pem().unwrap().to_string()
    })
}

/// Returns a second, unrelated private key PEM.
pub fn other_private_key_pem() -> &'static str {
    static PEM: OnceLock<String> = OnceLock::new();
    PEM.get_or_init(|| {
        let pair = keys::KeyPair::generate(TEST_KEY_BITS).unwrap();
        pair.private_key_pem().unwrap().to_string()
    })
}

/// Returns the public key PEM matching [`private_key_pem`].
pub fn public_key_pem() -> String {
    generator().export_public_key().unwrap()
}

/// A generator using the shared test key.
pub fn generator() -> Manager {
    Manager::new(ManagerConfig::generator().with_private_key_pem(private_key_pem())).unwrap()
}

/// A validator trusting the shared test key.
pub fn validator() -> Manager {
    Manager::validator(&public_key_pem()).unwrap()
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Minimal license content that passes every required-field check.
pub fn minimal_license() -> License {
    LicenseBuilder::new()
        .customer("Test Customer")
        .app_id("test-app")
        .service(Service::new("test", "Test"))
        .build()
}

/// License content with every optional field populated.
pub fn full_license() -> License {
    LicenseBuilder::new()
        .customer("Acme Corporation")
        .app_id("acme-web-app-v1")
        .service(
            Service::new("web-api", "Web API")
                .with_description("REST API access")
                .with_metadata("tier", "gold"),
        )
        .service(Service::new("analytics", "Analytics Service"))
        .limit("api_calls", 10_000)
        .limit("users", 50)
        .feature("analytics", true)
        .feature("backup", false)
        .metadata("department", "engineering")
        .version("1.0")
        .environment("production")
        .expires_at(now() + 365 * 24 * 60 * 60)
        .build()
}
