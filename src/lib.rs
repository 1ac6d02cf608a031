//! Advanced, modular rate limiting library for Rust.
//!
//! `skp_ratelimit` provides a comprehensive rate limiting solution with:
//!
//! - **Multiple Algorithms**: GCRA, Token Bucket, Leaky Bucket, Sliding Log, and more
//! - **Pluggable Storage**: In-memory with GC, Redis with connection pooling
//! - **Per-Route Quotas**: Different limits for different endpoints
//! - **Composite Keys**: Rate limit by IP + Path, User + API Key, etc.
//! - **Framework Integration**: Axum and Actix-web middleware
//!
//! # Quick Start
//!
//! ```ignore
//! use skp_ratelimit::{GCRA, Quota, MemoryStorage, Algorithm};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Create storage and algorithm
//!     let storage = MemoryStorage::new();
//!     let algorithm = GCRA::new();
//!     let quota = Quota::per_second(10).with_burst(15);
//!
//!     // Check and record a request
//!     let decision = algorithm.check_and_record(&storage, "user:123", &quota).await.unwrap();
//!
//!     if decision.is_allowed() {
//!         println!("Request allowed! {} remaining", decision.info().remaining);
//!     } else {
//!         println!("Rate limited! Retry after {:?}", decision.info().retry_after);
//!     }
//! }
//! ```
//!
//! # Algorithms
//!
//! | Algorithm | Best For | Memory | Feature Flag |
//! |-----------|----------|--------|--------------|
//! | GCRA | Precise rate control | Low | `gcra` |
//! | Token Bucket | Bursty traffic | Low | default |
//! | Leaky Bucket | Smooth output | Low | `leaky-bucket` |
//! | Sliding Log | Precision critical | High | `sliding-log` |
//! | Sliding Window | General purpose | Low | default |
//! | Fixed Window | Simple use cases | Low | default |
//! | Concurrent | Limit parallelism | Low | `concurrent` |
//!
//! # Feature Flags
//!
//! - `memory` (default): In-memory storage with garbage collection
//! - `redis`: Redis storage backend
//! - `axum`: Axum middleware integration
//! - `actix`: Actix-web middleware integration
//! - `gcra`: GCRA algorithm
//! - `leaky-bucket`: Leaky Bucket algorithm
//! - `sliding-log`: Sliding Log algorithm
//! - `concurrent`: Concurrent request limiter

pub mod algorithm;
pub mod config;
pub mod decision;
pub mod error;
pub mod extensions;
pub mod headers;
pub mod identifier;
pub mod key;
pub mod quota;
pub mod rule;
pub mod service;
pub mod storage;

#[cfg(any(feature = "axum", feature = "actix"))]
pub mod middleware;

// Re-export main types
pub use algorithm::Algorithm;
pub use config::Settings;
pub use decision::{Decision, DecisionMetadata, RateLimitInfo};
pub use error::{ConfigError, ConnectionError, RateLimitError, Result, StorageError};
pub use identifier::ClientIdentifier;
pub use key::{CompositeKey, FnKey, GlobalKey, Key, StaticKey};
pub use quota::{Quota, QuotaBuilder};
pub use rule::{AlgorithmKind, Rule, RuleRegistry, RuleSummary, TimeUnit};
pub use service::RateLimiterService;
pub use storage::{Storage, StorageEntry};

// Re-export extensions and headers
pub use extensions::{RateLimitExt, RateLimitResponse};
pub use headers::RateLimitHeaders;

// Re-export algorithms
pub use algorithm::{FixedWindow, SlidingWindow, TokenBucket};

#[cfg(feature = "gcra")]
pub use algorithm::GCRA;

#[cfg(feature = "leaky-bucket")]
pub use algorithm::LeakyBucket;

#[cfg(feature = "sliding-log")]
pub use algorithm::SlidingLog;

#[cfg(feature = "concurrent")]
pub use algorithm::ConcurrentLimiter;

// Re-export storage types
#[cfg(feature = "memory")]
pub use storage::{GcConfig, GcInterval, MemoryStorage};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::algorithm::Algorithm;
    pub use crate::config::Settings;
    pub use crate::decision::{Decision, RateLimitInfo};
    pub use crate::error::{RateLimitError, Result};
    pub use crate::identifier::ClientIdentifier;
    pub use crate::quota::Quota;
    pub use crate::rule::{AlgorithmKind, Rule, RuleRegistry, RuleSummary, TimeUnit};
    pub use crate::service::RateLimiterService;
    pub use crate::storage::Storage;

    pub use crate::algorithm::{FixedWindow, SlidingWindow, TokenBucket};

    #[cfg(feature = "gcra")]
    pub use crate::algorithm::GCRA;

    #[cfg(feature = "leaky-bucket")]
    pub use crate::algorithm::LeakyBucket;

    #[cfg(feature = "sliding-log")]
    pub use crate::algorithm::SlidingLog;

    #[cfg(feature = "concurrent")]
    pub use crate::algorithm::ConcurrentLimiter;

    #[cfg(feature = "memory")]
    pub use crate::storage::{GcConfig, GcInterval, MemoryStorage};
}
