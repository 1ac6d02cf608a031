//! Tower layer for rate limiting in Axum.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
};
use tower::{Layer, Service};

use crate::algorithm::Algorithm;
use crate::decision::Decision;
use crate::key::{HasHeaders, HasIpAddr, HasMethod, HasPath, Key};
use crate::quota::Quota;
use crate::storage::Storage;

/// Tower layer for rate limiting.
// derive(Clone) removed to allow S to be ?Clone

pub struct RateLimitLayer<S, A, K> {
    storage: Arc<S>,
    algorithm: A,
    quota: Quota,
    key_extractor: K,
}

impl<S, A, K> RateLimitLayer<S, A, K> {
    /// Create a new rate limit layer.
    pub fn new(storage: S, algorithm: A, quota: Quota, key_extractor: K) -> Self {
        Self {
            storage: Arc::new(storage),
            algorithm,
            quota,
            key_extractor,
        }
    }
}

impl<S, A, K> Clone for RateLimitLayer<S, A, K>
where
    A: Clone,
    K: Clone,
{
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            algorithm: self.algorithm.clone(),
            quota: self.quota.clone(),
            key_extractor: self.key_extractor.clone(),
        }
    }
}

impl<S, A, K, Inner> Layer<Inner> for RateLimitLayer<S, A, K>
where
    A: Clone,
    K: Clone,
{
    type Service = RateLimitService<S, A, K, Inner>;

    fn layer(&self, inner: Inner) -> Self::Service {
        RateLimitService {
            inner,
            storage: self.storage.clone(),
            algorithm: self.algorithm.clone(),
            quota: self.quota.clone(),
            key_extractor: self.key_extractor.clone(),
        }
    }
}

/// The rate limiting service.
// derive(Clone) removed to allow S to be ?Clone

pub struct RateLimitService<S, A, K, Inner> {
    inner: Inner,
    storage: Arc<S>,
    algorithm: A,
    quota: Quota,
    key_extractor: K,
}

impl<S, A, K, Inner> Clone for RateLimitService<S, A, K, Inner>
where
    A: Clone,
    K: Clone,
    Inner: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            storage: self.storage.clone(),
            algorithm: self.algorithm.clone(),
            quota: self.quota.clone(),
            key_extractor: self.key_extractor.clone(),
        }
    }
}

/// Owned snapshot of the parts of an Axum request needed for key extraction.
///
/// Extracted synchronously from the `Request` before the handler future is
/// built, so `Key` implementations never have to deal with the request's
/// borrow lifetime.
#[derive(Debug, Clone)]
pub struct OwnedRequestParts {
    path: String,
    method: String,
    headers: Vec<(String, String)>,
}

impl OwnedRequestParts {
    fn from_request(request: &Request<Body>) -> Self {
        let headers = request
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        Self {
            path: request.uri().path().to_string(),
            method: request.method().as_str().to_string(),
            headers,
        }
    }
}

impl HasPath for OwnedRequestParts {
    fn path(&self) -> &str {
        &self.path
    }
}

impl HasMethod for OwnedRequestParts {
    fn method(&self) -> &str {
        &self.method
    }
}

impl HasHeaders for OwnedRequestParts {
    fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl HasIpAddr for OwnedRequestParts {
    fn client_ip(&self) -> Option<std::net::IpAddr> {
        if let Some(forwarded) = self.header("x-forwarded-for") {
            if let Some(first) = forwarded.split(',').next() {
                if let Ok(ip) = first.trim().parse() {
                    return Some(ip);
                }
            }
        }
        if let Some(real_ip) = self.header("x-real-ip") {
            if let Ok(ip) = real_ip.parse() {
                return Some(ip);
            }
        }
        None
    }
}

impl<S, A, K, Inner> Service<Request<Body>> for RateLimitService<S, A, K, Inner>
where
    S: Storage + Send + Sync + 'static,
    A: Algorithm + Clone + Send + Sync + 'static,
    K: Key<OwnedRequestParts> + Clone + Send + Sync + 'static,
    Inner: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    Inner::Future: Send,
{
    type Response = Response<Body>;
    type Error = Inner::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let storage = self.storage.clone();
        let algorithm = self.algorithm.clone();
        let quota = self.quota.clone();
        let key_extractor = self.key_extractor.clone();
        let mut inner = self.inner.clone();

        let parts = OwnedRequestParts::from_request(&request);
        let key = key_extractor
            .extract(&parts)
            .unwrap_or_else(|| format!("axum:{}", parts.path()));

        Box::pin(async move {
            // Check rate limit
            let decision = algorithm
                .check_and_record(&*storage, &key, &quota)
                .await
                .unwrap_or_else(|_| {
                    // On error, allow the request (fail open)
                    Decision::allowed(crate::decision::RateLimitInfo::new(
                        quota.max_requests(),
                        quota.max_requests(),
                        std::time::Instant::now() + quota.window(),
                        std::time::Instant::now(),
                    ))
                });

            if decision.is_allowed() {
                // Add rate limit headers and proceed
                let response = inner.call(request).await?;
                Ok(add_rate_limit_headers(response, &decision))
            } else {
                // Return 429 Too Many Requests
                Ok(rate_limited_response(&decision))
            }
        })
    }
}

/// Add rate limit headers to a response.
fn add_rate_limit_headers(mut response: Response<Body>, decision: &Decision) -> Response<Body> {
    let headers = response.headers_mut();
    for (name, value) in decision.info().to_headers() {
        if let Ok(header_value) = value.parse() {
            headers.insert(name, header_value);
        }
    }
    response
}

/// Create a 429 Too Many Requests response.
fn rate_limited_response(decision: &Decision) -> Response<Body> {
    let info = decision.info();
    let retry_after = info
        .retry_after
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|| "60".to_string());

    let body = format!(
        r#"{{"error":"Too Many Requests","retry_after":{},"remaining":{},"limit":{}}}"#,
        retry_after, info.remaining, info.limit
    );

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;

    let headers = response.headers_mut();
    headers.insert("content-type", "application/json".parse().unwrap());

    for (name, value) in info.to_headers() {
        if let Ok(header_value) = value.parse() {
            headers.insert(name, header_value);
        }
    }

    response
}
