//! The rate limiting service façade.
//!
//! `RateLimiterService` is the single entry point an HTTP integration calls
//! once per request: look up the rule for `(domain, key_type)`, derive the
//! storage key from the caller's identity, and run the algorithm the rule
//! names. It plays the role `RateLimiterFactory` plays in a dispatch-by-enum
//! design — pick the concrete strategy from a tagged value instead of a
//! trait object, since `Algorithm::check_and_record` is generic over the
//! storage backend and can't be boxed as `dyn`.

use std::sync::Arc;
use std::time::Instant;

use tracing::warn;

use crate::algorithm::{Algorithm, FixedWindow, SlidingWindow, TokenBucket};
#[cfg(feature = "leaky-bucket")]
use crate::algorithm::LeakyBucket;
#[cfg(feature = "sliding-log")]
use crate::algorithm::SlidingLog;

use crate::decision::{Decision, RateLimitInfo};
use crate::identifier::ClientIdentifier;
use crate::quota::Quota;
use crate::rule::{AlgorithmKind, RuleRegistry};
use crate::storage::Storage;

/// Dispatches rate limit checks to the algorithm a matching rule names.
///
/// Failing open with the maximum possible quota and the sentinel algorithm
/// name `"none"` is reserved for situations with nothing to enforce: no
/// rule is registered for the `(domain, key_type)` pair, or the identity
/// has no concept of the requested key type at all. A recognized key type
/// the request simply didn't supply (e.g. no IP could be determined)
/// substitutes `"anonymous"` instead — see `ClientIdentifier::identifier_for`
/// — so a matched rule's quota still applies.
///
/// A storage backend that's unreachable also fails open — logging a
/// warning — on the reasoning that blocking every request because the
/// store hiccuped is worse than temporarily not rate limiting.
pub struct RateLimiterService<S> {
    storage: Arc<S>,
    registry: Arc<RuleRegistry>,
}

impl<S: Storage> RateLimiterService<S> {
    /// Create a new service over the given storage backend and rule set.
    pub fn new(storage: S, registry: Arc<RuleRegistry>) -> Self {
        Self {
            storage: Arc::new(storage),
            registry,
        }
    }

    /// Access the underlying rule registry, e.g. for an admin endpoint.
    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    /// Check and record a request from `identifier` against the rule for
    /// `(domain, key_type)`. Never returns an error: every failure mode is
    /// handled by failing open.
    pub async fn check(&self, identifier: &ClientIdentifier, domain: &str, key_type: &str) -> Decision {
        let Some(rule) = self.registry.get(domain, key_type) else {
            return Self::unmatched_decision();
        };

        let Some(key) = identifier.base_key(domain, key_type) else {
            return Self::unmatched_decision();
        };

        let result = match rule.algorithm {
            AlgorithmKind::TokenBucket => {
                TokenBucket::new().check_and_record(&*self.storage, &key, &rule.quota).await
            }
            AlgorithmKind::FixedWindow => {
                FixedWindow::new().check_and_record(&*self.storage, &key, &rule.quota).await
            }
            AlgorithmKind::SlidingWindowCounter => {
                SlidingWindow::new().check_and_record(&*self.storage, &key, &rule.quota).await
            }
            #[cfg(feature = "leaky-bucket")]
            AlgorithmKind::LeakyBucket => {
                LeakyBucket::new().check_and_record(&*self.storage, &key, &rule.quota).await
            }
            #[cfg(feature = "sliding-log")]
            AlgorithmKind::SlidingWindowLog => {
                SlidingLog::new().check_and_record(&*self.storage, &key, &rule.quota).await
            }
        };

        result.unwrap_or_else(|err| {
            warn!(domain, key_type, algorithm = rule.algorithm.as_str(), error = %err, "rate limit store unavailable, failing open");
            Self::fail_open_decision(&rule.quota)
        })
    }

    /// Decision returned when no rule matches, or the identity can't supply
    /// the requested key type.
    fn unmatched_decision() -> Decision {
        let now = Instant::now();
        let info = RateLimitInfo::new(u64::MAX, u64::MAX, now, now).with_algorithm("none");
        Decision::allowed(info)
    }

    /// Decision returned when the store itself couldn't be reached.
    fn fail_open_decision(quota: &Quota) -> Decision {
        let now = Instant::now();
        let info = RateLimitInfo::new(quota.max_requests(), quota.max_requests(), now + quota.window(), now);
        Decision::allowed(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;
    use crate::storage::MemoryStorage;

    fn service_with(rule: Rule) -> RateLimiterService<MemoryStorage> {
        let registry = Arc::new(RuleRegistry::new());
        registry.add_rule(rule).unwrap();
        RateLimiterService::new(MemoryStorage::new(), registry)
    }

    #[tokio::test]
    async fn test_no_matching_rule_fails_open() {
        let registry = Arc::new(RuleRegistry::new());
        let service = RateLimiterService::new(MemoryStorage::new(), registry);
        let identifier = ClientIdentifier::anonymous(Some("203.0.113.1".parse().unwrap()), "/api/x");

        let decision = service.check(&identifier, "api", "ip_address").await;
        assert!(decision.is_allowed());
        assert_eq!(decision.info().limit, u64::MAX);
        assert_eq!(decision.info().algorithm, Some("none"));
    }

    #[tokio::test]
    async fn test_missing_ip_still_enforces_matched_rule() {
        let rule = Rule::new("api", "ip_address", AlgorithmKind::FixedWindow, Quota::per_minute(1)).unwrap();
        let service = service_with(rule);
        let identifier = ClientIdentifier::anonymous(None, "/api/x");

        let first = service.check(&identifier, "api", "ip_address").await;
        assert!(first.is_allowed());
        assert_eq!(first.info().algorithm, Some("fixed_window"));

        let second = service.check(&identifier, "api", "ip_address").await;
        assert!(second.is_denied());
    }

    #[tokio::test]
    async fn test_matched_rule_enforces_quota() {
        let rule = Rule::new("auth", "ip_address", AlgorithmKind::FixedWindow, Quota::per_minute(2)).unwrap();
        let service = service_with(rule);
        let identifier = ClientIdentifier::anonymous(Some("198.51.100.9".parse().unwrap()), "/auth/login");

        assert!(service.check(&identifier, "auth", "ip_address").await.is_allowed());
        assert!(service.check(&identifier, "auth", "ip_address").await.is_allowed());
        let third = service.check(&identifier, "auth", "ip_address").await;
        assert!(third.is_denied());
        assert_eq!(third.info().algorithm, Some("fixed_window"));
    }

    #[tokio::test]
    async fn test_distinct_domains_are_independent() {
        let registry = Arc::new(RuleRegistry::new());
        registry
            .add_rule(Rule::new("auth", "ip_address", AlgorithmKind::FixedWindow, Quota::per_minute(1)).unwrap())
            .unwrap();
        registry
            .add_rule(Rule::new("messaging", "ip_address", AlgorithmKind::FixedWindow, Quota::per_minute(1)).unwrap())
            .unwrap();
        let service = RateLimiterService::new(MemoryStorage::new(), registry);
        let identifier = ClientIdentifier::anonymous(Some("198.51.100.9".parse().unwrap()), "/x");

        assert!(service.check(&identifier, "auth", "ip_address").await.is_allowed());
        assert!(service.check(&identifier, "messaging", "ip_address").await.is_allowed());
        assert!(service.check(&identifier, "auth", "ip_address").await.is_denied());
    }
}
