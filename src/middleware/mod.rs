//! HTTP framework middleware for rate limiting.
//!
//! Provides Tower-compatible layers for Axum (`RateLimitLayer`, `GatewayLayer`)
//! and `Transform`/`Service` middleware for Actix-web (`actix::RateLimiter`,
//! `ActixGateway`). The two gateway adapters share domain classification and
//! identifier extraction through the internal `common` module so they can't
//! drift apart on behavior.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use oc_ratelimit_advanced::{
//!     middleware::RateLimitLayer,
//!     GCRA, Quota, MemoryStorage,
//!     key::IpKey,
//! };
//!
//! let storage = MemoryStorage::new();
//!
//! let app = Router::new()
//!     .route("/api/data", get(handler))
//!     .layer(RateLimitLayer::new(
//!         storage,
//!         GCRA::new(),
//!         Quota::per_second(10),
//!         IpKey::new(),
//!     ));
//! ```

#[cfg(any(feature = "axum", feature = "actix"))]
mod common;

#[cfg(feature = "axum")]
mod gateway;
#[cfg(feature = "axum")]
mod layer;

#[cfg(feature = "actix")]
pub mod actix;
#[cfg(feature = "actix")]
mod actix_gateway;

#[cfg(feature = "axum")]
pub use gateway::{Gateway, GatewayLayer};
#[cfg(feature = "axum")]
pub use layer::RateLimitLayer;

#[cfg(feature = "actix")]
pub use actix_gateway::{ActixGateway, ActixGatewayMiddleware};
