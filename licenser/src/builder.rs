//! Fluent construction of license content.

use crate::error::LicenseResult;
use crate::license::{License, Service};
use chrono::{DateTime, Duration, Utc};

/// Builds a [`License`] step by step.
///
/// ```
/// use licenser::{LicenseBuilder, Service};
///
/// let license = LicenseBuilder::new()
///     .customer("Acme Corporation")
///     .app_id("acme-web-app-v1")
///     .service(Service::new("web-api", "Web API"))
///     .limit("api_calls", 10_000)
///     .feature("analytics", true)
///     .build();
/// assert_eq!(license.services.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct LicenseBuilder {
    license: License,
}

impl LicenseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer(mut self, customer: impl Into<String>) -> Self {
        self.license.customer = customer.into();
        self
    }

    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.license.app_id = app_id.into();
        self
    }

    /// Appends a service.
    pub fn service(mut self, service: Service) -> Self {
        self.license.services.push(service);
        self
    }

    /// Replaces all services.
    pub fn services(mut self, services: Vec<Service>) -> Self {
        self.license.services = services;
        self
    }

    pub fn limit(mut self, name: impl Into<String>, value: i64) -> Self {
        self.license.limits.insert(name.into(), value);
        self
    }

    pub fn feature(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.license.features.insert(name.into(), enabled);
        self
    }

    /// Sets the expiration as seconds since epoch. 0 means perpetual.
    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.license.expires_at = timestamp;
        self
    }

    pub fn expires_at_time(self, at: DateTime<Utc>) -> Self {
        self.expires_at(at.timestamp())
    }

    /// Sets the expiration relative to now.
    pub fn expires_in(self, duration: Duration) -> Self {
        self.expires_at_time(Utc::now() + duration)
    }

    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.license.issued_at = timestamp;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.license.metadata.insert(key.into(), value.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.license.version = version.into();
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.license.environment = environment.into();
        self
    }

    /// Checks that customer, application ID and a service are present.
    pub fn validate(&self) -> LicenseResult<()> {
        self.license.check_required()
    }

    /// Returns the license, stamping `issued_at` with now if unset.
    #[must_use]
    pub fn build(self) -> License {
        let mut license = self.license;
        if license.issued_at == 0 {
            license.issued_at = Utc::now().timestamp();
        }
        license
    }
}
