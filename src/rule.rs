//! Rate limit rules: which algorithm and quota apply to a `(domain, key_type)`
//! pair, and the registry that the service layer dispatches through.
//!
//! A `Rule` is the unit of configuration an operator adds at startup or
//! through the admin surface (`RuleRegistry::add_rule`/`list_rules`). The
//! `domain` groups related endpoints (e.g. `"auth"`, `"messaging"`) and the
//! `key_type` names what the request is keyed on (e.g. `"ip_address"`,
//! `"user_id"`). Looking a rule up by a pair that was never registered is not
//! an error: callers fail open, matching the rest of this crate's posture on
//! unavailable configuration.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{ConfigError, Result};
use crate::quota::Quota;

/// The supported rate limiting strategies.
///
/// These five are the algorithms every rule must pick from at the
/// admin/config layer. Two strategies this crate carries beyond the core
/// set, `GCRA` and the concurrent in-flight limiter, deliberately have no
/// variant here: `GCRA` is an alternative formulation of token-bucket
/// admission rather than a distinct strategy a rule would pick, and the
/// concurrent limiter bounds simultaneous requests rather than a request
/// rate. Neither is something a `(domain, key_type)` rule dispatches to —
/// both are used directly as their own types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    /// Token Bucket.
    TokenBucket,
    /// Leaky Bucket.
    #[cfg(feature = "leaky-bucket")]
    LeakyBucket,
    /// Fixed Window.
    FixedWindow,
    /// Sliding Window Log.
    #[cfg(feature = "sliding-log")]
    SlidingWindowLog,
    /// Sliding Window Counter.
    SlidingWindowCounter,
}

impl AlgorithmKind {
    /// Parse an algorithm name as used in configuration and the admin API.
    pub fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "token_bucket" => Self::TokenBucket,
            #[cfg(feature = "leaky-bucket")]
            "leaky_bucket" => Self::LeakyBucket,
            "fixed_window" => Self::FixedWindow,
            #[cfg(feature = "sliding-log")]
            "sliding_window_log" => Self::SlidingWindowLog,
            "sliding_window_counter" => Self::SlidingWindowCounter,
            other => return Err(ConfigError::InvalidAlgorithm(other.to_string()).into()),
        })
    }

    /// The canonical name, as returned in rule listings and decision info.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TokenBucket => "token_bucket",
            #[cfg(feature = "leaky-bucket")]
            Self::LeakyBucket => "leaky_bucket",
            Self::FixedWindow => "fixed_window",
            #[cfg(feature = "sliding-log")]
            Self::SlidingWindowLog => "sliding_window_log",
            Self::SlidingWindowCounter => "sliding_window_counter",
        }
    }
}

/// A time unit recognized by the admin surface's `add_rule`/`list_rules`.
///
/// Rules are always modeled internally as a `Quota` (a request count plus a
/// `Duration`), but the admin API that operators and config files talk to
/// deals in whole units instead of raw durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// One second.
    Second,
    /// One minute.
    Minute,
    /// One hour.
    Hour,
    /// One day.
    Day,
}

impl TimeUnit {
    /// Parse a unit name as used in configuration and the admin API.
    pub fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "second" => Self::Second,
            "minute" => Self::Minute,
            "hour" => Self::Hour,
            "day" => Self::Day,
            other => return Err(ConfigError::InvalidRule(format!("unknown time unit: {other}")).into()),
        })
    }

    /// The canonical name, as returned in rule listings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }

    /// The duration one unit spans.
    pub fn duration(&self) -> std::time::Duration {
        match self {
            Self::Second => std::time::Duration::from_secs(1),
            Self::Minute => std::time::Duration::from_secs(60),
            Self::Hour => std::time::Duration::from_secs(3600),
            Self::Day => std::time::Duration::from_secs(86400),
        }
    }

    /// Recover the unit a quota's window most likely meant, for display.
    ///
    /// Exact match only — a window that doesn't line up with one of the
    /// four admin-surface units (e.g. built directly via `Quota::new` with
    /// an arbitrary duration) falls back to raw seconds in `list_rules`.
    fn from_window(window: std::time::Duration) -> Option<Self> {
        [Self::Second, Self::Minute, Self::Hour, Self::Day]
            .into_iter()
            .find(|unit| unit.duration() == window)
    }
}

/// A rate limiting rule bound to a domain and key type.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Logical grouping of endpoints this rule applies to (e.g. `"auth"`).
    pub domain: String,
    /// What the request is keyed on (e.g. `"ip_address"`, `"user_id"`).
    pub key_type: String,
    /// Which algorithm enforces this rule.
    pub algorithm: AlgorithmKind,
    /// The quota the algorithm enforces.
    pub quota: Quota,
}

impl Rule {
    /// Create a new rule. The domain and key type must be non-empty; quota
    /// validity is already enforced by `Quota`'s own constructors.
    pub fn new(
        domain: impl Into<String>,
        key_type: impl Into<String>,
        algorithm: AlgorithmKind,
        quota: Quota,
    ) -> Result<Self> {
        let domain = domain.into();
        let key_type = key_type.into();

        if domain.is_empty() {
            return Err(ConfigError::InvalidRule("domain must not be empty".into()).into());
        }
        if key_type.is_empty() {
            return Err(ConfigError::InvalidRule("key_type must not be empty".into()).into());
        }

        Ok(Self {
            domain,
            key_type,
            algorithm,
            quota,
        })
    }

    /// Build a rule from the raw strings the admin surface accepts:
    /// `quota` requests per `unit` (one of `"second"`/`"minute"`/`"hour"`/
    /// `"day"`), enforced by the named `algorithm`.
    pub fn from_parts(
        domain: impl Into<String>,
        key_type: impl Into<String>,
        quota: u64,
        unit: &str,
        algorithm: &str,
    ) -> Result<Self> {
        let unit = TimeUnit::parse(unit)?;
        let algorithm = AlgorithmKind::parse(algorithm)?;
        let quota = Quota::try_new(quota, unit.duration())?;
        Self::new(domain, key_type, algorithm, quota)
    }

    /// A display-friendly summary of this rule, as returned by
    /// `RuleRegistry::list_rules`.
    pub fn summary(&self) -> RuleSummary {
        let limit = match TimeUnit::from_window(self.quota.window()) {
            Some(unit) => format!("{} per {}", self.quota.max_requests(), unit.as_str()),
            None => format!("{} per {}s", self.quota.max_requests(), self.quota.window().as_secs()),
        };

        RuleSummary {
            domain: self.domain.clone(),
            key_type: self.key_type.clone(),
            limit,
            algorithm: self.algorithm.as_str(),
        }
    }
}

/// Display-friendly projection of a `Rule`, as returned by
/// `RuleRegistry::list_rules`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSummary {
    /// The rule's domain.
    pub domain: String,
    /// The rule's key type.
    pub key_type: String,
    /// Human-readable quota, e.g. `"100 per minute"`.
    pub limit: String,
    /// The canonical algorithm name.
    pub algorithm: &'static str,
}

/// Registry of rules, looked up by `(domain, key_type)`.
///
/// Thread-safe and cheap to clone-share via `Arc`; used directly by the
/// service façade and exposed to operators through `add_rule`/`list_rules`.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: RwLock<HashMap<(String, String), Rule>>,
}

impl RuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a rule for its `(domain, key_type)` pair.
    pub fn add_rule(&self, rule: Rule) -> Result<()> {
        let key = (rule.domain.clone(), rule.key_type.clone());
        self.rules.write().insert(key, rule);
        Ok(())
    }

    /// Look up the rule for a domain and key type, if one was registered.
    pub fn get(&self, domain: &str, key_type: &str) -> Option<Rule> {
        self.rules
            .read()
            .get(&(domain.to_string(), key_type.to_string()))
            .cloned()
    }

    /// List every registered rule.
    pub fn list_rules(&self) -> Vec<Rule> {
        self.rules.read().values().cloned().collect()
    }

    /// List every registered rule as a display-friendly summary, the shape
    /// an admin listing endpoint would return.
    pub fn list_rule_summaries(&self) -> Vec<RuleSummary> {
        self.rules.read().values().map(Rule::summary).collect()
    }
}
