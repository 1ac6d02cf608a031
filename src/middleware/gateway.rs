//! Axum middleware that wires `RateLimiterService` up to the exact HTTP
//! surface a deployed gateway exposes: path-prefix domain dispatch, the
//! `X-User-Id` header, a `/health` bypass, and the `X-Ratelimit-*` response
//! headers.
//!
//! This sits beside [`RateLimitLayer`](crate::middleware::RateLimitLayer),
//! which wraps a single [`Algorithm`](crate::algorithm::Algorithm) directly.
//! `GatewayLayer` instead dispatches through a [`RateLimiterService`], so one
//! layer can enforce a whole rule set keyed by `(domain, key_type)`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{HeaderMap, Request, Response, StatusCode},
};
use tower::{Layer, Service};

use super::common::{self, GatewayRequest, GATEWAY_KEY_TYPE, HEALTH_CHECK_PATH};
use crate::decision::Decision;
use crate::service::RateLimiterService;
use crate::storage::Storage;

struct AxumGatewayRequest<'a> {
    path: &'a str,
    headers: &'a HeaderMap,
}

impl<'a> GatewayRequest for AxumGatewayRequest<'a> {
    fn path(&self) -> &str {
        self.path
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Tower layer wrapping a [`RateLimiterService`].
pub struct GatewayLayer<S> {
    service: Arc<RateLimiterService<S>>,
}

impl<S> GatewayLayer<S> {
    /// Wrap a rate limiter service for use as Axum middleware.
    pub fn new(service: RateLimiterService<S>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl<S> Clone for GatewayLayer<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<S, Inner> Layer<Inner> for GatewayLayer<S> {
    type Service = Gateway<S, Inner>;

    fn layer(&self, inner: Inner) -> Self::Service {
        Gateway {
            inner,
            service: self.service.clone(),
        }
    }
}

/// The Tower `Service` `GatewayLayer` produces.
pub struct Gateway<S, Inner> {
    inner: Inner,
    service: Arc<RateLimiterService<S>>,
}

impl<S, Inner: Clone> Clone for Gateway<S, Inner> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            service: self.service.clone(),
        }
    }
}

impl<S, Inner> Service<Request<Body>> for Gateway<S, Inner>
where
    S: Storage + Send + Sync + 'static,
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
        let path = request.uri().path().to_string();

        if path == HEALTH_CHECK_PATH {
            let mut inner = self.inner.clone();
            return Box::pin(async move { inner.call(request).await });
        }

        let service = self.service.clone();
        let mut inner = self.inner.clone();

        let req_view = AxumGatewayRequest {
            path: &path,
            headers: request.headers(),
        };
        let identifier = common::identifier_for(&req_view);
        let domain = common::classify_domain(&path);

        Box::pin(async move {
            let decision = service.check(&identifier, domain, GATEWAY_KEY_TYPE).await;

            if decision.is_allowed() {
                let response = inner.call(request).await?;
                Ok(with_rate_limit_headers(response, &decision))
            } else {
                Ok(rejection_response(&decision))
            }
        })
    }
}

fn with_rate_limit_headers(mut response: Response<Body>, decision: &Decision) -> Response<Body> {
    let headers = response.headers_mut();
    let info = decision.info();
    if let Ok(v) = info.limit.to_string().parse() {
        headers.insert("X-Ratelimit-Limit", v);
    }
    if let Ok(v) = info.remaining.to_string().parse() {
        headers.insert("X-Ratelimit-Remaining", v);
    }
    response
}

fn rejection_response(decision: &Decision) -> Response<Body> {
    let info = decision.info();
    let retry_after = info.retry_after.map(|d| d.as_secs().max(1)).unwrap_or(1);

    let body = format!(
        r#"{{"error":"Rate limit exceeded","message":"Too many requests. Retry after {retry_after} seconds.","retry_after":{retry_after}}}"#,
    );

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;

    let headers = response.headers_mut();
    headers.insert("content-type", "application/json".parse().unwrap());
    if let Ok(v) = info.limit.to_string().parse() {
        headers.insert("X-Ratelimit-Limit", v);
    }
    if let Ok(v) = info.remaining.to_string().parse() {
        headers.insert("X-Ratelimit-Remaining", v);
    }
    if let Ok(v) = retry_after.to_string().parse() {
        headers.insert("X-Ratelimit-Retry-After", v);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_request_reads_axum_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", "alice".parse().unwrap());
        let req = AxumGatewayRequest {
            path: "/auth/login",
            headers: &headers,
        };
        assert_eq!(req.header("x-user-id"), Some("alice"));
        assert_eq!(common::classify_domain(req.path()), "auth");
    }
}
