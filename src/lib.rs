//! # Whois Check Library
//!
//! Domain availability checks backed by a whois API, with a local file cache.
//!
//! ## Features
//!
//! - Strict domain syntax validation before anything touches the network
//! - One JSON file per domain in a user cache directory, expiring after a TTL
//! - Normalized results: available, taken (with registration metadata) or error
//! - Every failure becomes a result value with a suggested action
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use whois_check::{CheckResult, Config, WhoisClient};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WhoisClient::new(Config::load()?)?;
//!
//!     match client.resolve("example.com").await {
//!         CheckResult::Available { domain } => println!("{} is available", domain),
//!         CheckResult::Taken(registration) => println!("taken via {}", registration.registrar),
//!         CheckResult::Error(failure) => eprintln!("{}", failure.message),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod errors;
pub mod validate;
pub mod whois;

// Re-export main types for easy access
pub use cache::{CacheEntry, CacheService};
pub use config::Config;
pub use errors::WhoisError;
pub use validate::is_valid_domain;
pub use whois::{DomainLookup, WhoisService};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Placeholder for registration fields the whois source leaves out.
pub const UNKNOWN: &str = "Unknown";

/// Registration metadata for a taken domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub domain: String,
    pub registrant: String,
    pub expires: String,
    pub registrar: String,
}

/// Outcome of a successful lookup. The only thing that ever gets cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Availability {
    Available { domain: String },
    Taken(Registration),
}

impl Availability {
    pub fn domain(&self) -> &str {
        match self {
            Availability::Available { domain } => domain,
            Availability::Taken(registration) => &registration.domain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConfigurationError,
    ApiError,
    ValidationError,
    SystemError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupFailure {
    pub error_kind: ErrorKind,
    pub message: String,
    pub suggested_action: String,
}

/// The single result shape handed back to callers, discriminated by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckResult {
    Available { domain: String },
    Taken(Registration),
    Error(LookupFailure),
}

impl CheckResult {
    /// True for available and taken; callers map this to the exit status.
    pub fn is_success(&self) -> bool {
        !matches!(self, CheckResult::Error(_))
    }
}

impl From<Availability> for CheckResult {
    fn from(availability: Availability) -> Self {
        match availability {
            Availability::Available { domain } => CheckResult::Available { domain },
            Availability::Taken(registration) => CheckResult::Taken(registration),
        }
    }
}

/// Validates, consults the cache and falls back to the whois API
pub struct WhoisClient<L = WhoisService> {
    lookup: L,
    cache: CacheService,
}

impl WhoisClient<WhoisService> {
    /// Create a client talking to the configured whois API
    pub fn new(config: Config) -> Result<Self, WhoisError> {
        let lookup = WhoisService::new(&config)?;
        let cache = CacheService::new(&config);
        Ok(Self { lookup, cache })
    }
}

impl<L: DomainLookup> WhoisClient<L> {
    /// Create a client around any lookup backend
    pub fn with_lookup(lookup: L, cache: CacheService) -> Self {
        Self { lookup, cache }
    }

    /// Check a domain, answering from the cache when a fresh entry exists.
    ///
    /// Never fails: every problem is reported as `CheckResult::Error`.
    pub async fn resolve(&self, domain: &str) -> CheckResult {
        self.resolve_with_options(domain, false).await
    }

    /// Check a domain against the API even if a fresh cache entry exists
    pub async fn resolve_fresh(&self, domain: &str) -> CheckResult {
        self.resolve_with_options(domain, true).await
    }

    pub async fn resolve_with_options(&self, domain: &str, fresh: bool) -> CheckResult {
        match self.try_resolve(domain, fresh).await {
            Ok(availability) => availability.into(),
            Err(e) => e.into(),
        }
    }

    async fn try_resolve(&self, domain: &str, fresh: bool) -> Result<Availability, WhoisError> {
        if !is_valid_domain(domain) {
            return Err(WhoisError::InvalidDomain(domain.to_string()));
        }

        if !fresh {
            if let Some(entry) = self.cache.get(domain).await {
                return Ok(entry.availability);
            }
        } else {
            debug!("Bypassing cache for {}", domain);
        }

        let availability = self.lookup.lookup(domain).await?;

        let entry = CacheEntry::new(availability, Utc::now());
        self.cache.set(domain, &entry).await;

        Ok(entry.availability)
    }

    pub fn cache(&self) -> &CacheService {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct CountingLookup {
        calls: Arc<AtomicUsize>,
        answer: fn(&str) -> Result<Availability, WhoisError>,
    }

    #[async_trait]
    impl DomainLookup for CountingLookup {
        async fn lookup(&self, domain: &str) -> Result<Availability, WhoisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.answer)(domain)
        }
    }

    fn client_with(
        dir: &TempDir,
        answer: fn(&str) -> Result<Availability, WhoisError>,
    ) -> (WhoisClient<CountingLookup>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let lookup = CountingLookup { calls: calls.clone(), answer };
        let cache = CacheService::with_root(dir.path(), 86_400);
        (WhoisClient::with_lookup(lookup, cache), calls)
    }

    fn available(domain: &str) -> Result<Availability, WhoisError> {
        Ok(Availability::Available { domain: domain.to_string() })
    }

    fn rate_limited(_: &str) -> Result<Availability, WhoisError> {
        Err(WhoisError::RateLimited)
    }

    #[tokio::test]
    async fn test_cache_hit_skips_lookup() {
        let dir = TempDir::new().unwrap();
        let (client, calls) = client_with(&dir, available);

        let cached = Availability::Taken(Registration {
            domain: "example.com".to_string(),
            registrant: "Example Org".to_string(),
            expires: "2030-01-01".to_string(),
            registrar: "Example Registrar".to_string(),
        });
        client.cache().set("example.com", &CacheEntry::new(cached.clone(), Utc::now())).await;

        let result = client.resolve("example.com").await;
        assert_eq!(result, CheckResult::from(cached));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_miss_looks_up_and_stores() {
        let dir = TempDir::new().unwrap();
        let (client, calls) = client_with(&dir, available);

        let result = client.resolve("example.com").await;
        assert_eq!(result, CheckResult::Available { domain: "example.com".to_string() });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(client.cache().get("example.com").await.is_some());

        // Second call is served from the cache
        client.resolve("example.com").await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_entry_triggers_lookup() {
        let dir = TempDir::new().unwrap();
        let (client, calls) = client_with(&dir, available);

        let stale = CacheEntry::new(
            Availability::Available { domain: "example.com".to_string() },
            Utc::now() - Duration::hours(25),
        );
        client.cache().set("example.com", &stale).await;

        client.resolve("example.com").await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fresh_bypasses_cache() {
        let dir = TempDir::new().unwrap();
        let (client, calls) = client_with(&dir, available);

        client.resolve("example.com").await;
        client.resolve_fresh("example.com").await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalid_domain_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let (client, calls) = client_with(&dir, available);

        let result = client.resolve("invalid domain").await;
        match result {
            CheckResult::Error(failure) => assert_eq!(failure.error_kind, ErrorKind::ValidationError),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let dir = TempDir::new().unwrap();
        let (client, calls) = client_with(&dir, rate_limited);

        let result = client.resolve("example.com").await;
        assert!(!result.is_success());
        assert!(client.cache().get("example.com").await.is_none());

        client.resolve("example.com").await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_result_serialization() {
        let taken = CheckResult::Taken(Registration {
            domain: "example.com".to_string(),
            registrant: UNKNOWN.to_string(),
            expires: "2030-01-01".to_string(),
            registrar: "Example Registrar".to_string(),
        });
        let json = serde_json::to_value(&taken).unwrap();
        assert_eq!(json["status"], "taken");
        assert_eq!(json["registrant"], "Unknown");

        let error: CheckResult = WhoisError::MissingCredential.into();
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error_kind"], "configuration_error");
        assert!(json["suggested_action"].as_str().unwrap().contains("WHOIS_API_KEY"));
    }
}
