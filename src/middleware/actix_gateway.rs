//! Actix-web middleware that wires `RateLimiterService` up to the same
//! gateway HTTP surface `middleware::gateway::GatewayLayer` exposes for
//! axum: path-prefix domain dispatch, the `X-User-Id` header, a `/health`
//! bypass, and the `X-Ratelimit-*` response headers. Domain classification
//! and identifier extraction are shared with the axum adapter through
//! `middleware::common`, so the two integrations can't drift apart.
//!
//! This sits beside [`RateLimiter`](crate::middleware::actix::RateLimiter),
//! which wraps a single [`Algorithm`](crate::algorithm::Algorithm) directly.
//! `ActixGateway` instead dispatches through a [`RateLimiterService`], so one
//! middleware can enforce a whole rule set keyed by `(domain, key_type)`.

use std::future::{ready, Future, Ready};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_service::{Service, Transform};
use actix_web::{
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{HeaderName, HeaderValue},
    http::StatusCode,
    Error, HttpResponse,
};

use super::common::{self, GatewayRequest, GATEWAY_KEY_TYPE, HEALTH_CHECK_PATH};
use crate::decision::Decision;
use crate::service::RateLimiterService;
use crate::storage::Storage;

struct ActixGatewayRequest<'a> {
    req: &'a ServiceRequest,
}

impl<'a> GatewayRequest for ActixGatewayRequest<'a> {
    fn path(&self) -> &str {
        self.req.path()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.req.headers().get(name).and_then(|v| v.to_str().ok())
    }
}

/// Actix-web `Transform` wrapping a [`RateLimiterService`].
pub struct ActixGateway<S> {
    service: Arc<RateLimiterService<S>>,
}

impl<S> ActixGateway<S> {
    /// Wrap a rate limiter service for use as Actix-web middleware.
    pub fn new(service: RateLimiterService<S>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl<S> Clone for ActixGateway<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<S, Svc, B> Transform<Svc, ServiceRequest> for ActixGateway<S>
where
    S: Storage + Send + Sync + 'static,
    Svc: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    Svc::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = ActixGatewayMiddleware<S, Svc>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: Svc) -> Self::Future {
        ready(Ok(ActixGatewayMiddleware {
            service,
            gateway: self.service.clone(),
        }))
    }
}

/// The actual middleware service `ActixGateway` produces.
pub struct ActixGatewayMiddleware<S, Svc> {
    service: Svc,
    gateway: Arc<RateLimiterService<S>>,
}

impl<S, Svc, B> Service<ServiceRequest> for ActixGatewayMiddleware<S, Svc>
where
    S: Storage + Send + Sync + 'static,
    Svc: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    Svc::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if req.path() == HEALTH_CHECK_PATH {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
        }

        let gateway = self.gateway.clone();
        let domain = common::classify_domain(req.path());
        let identifier = {
            let req_view = ActixGatewayRequest { req: &req };
            common::identifier_for(&req_view)
        };

        let fut = self.service.call(req);

        Box::pin(async move {
            let decision = gateway.check(&identifier, domain, GATEWAY_KEY_TYPE).await;

            if decision.is_denied() {
                return Err(rejection_error(&decision));
            }

            let mut res = fut.await?.map_into_left_body();
            apply_rate_limit_headers(res.headers_mut(), &decision);
            Ok(res)
        })
    }
}

fn apply_rate_limit_headers(headers: &mut actix_web::http::header::HeaderMap, decision: &Decision) {
    let info = decision.info();
    if let Ok(v) = HeaderValue::from_str(&info.limit.to_string()) {
        headers.insert(HeaderName::from_static("x-ratelimit-limit"), v);
    }
    if let Ok(v) = HeaderValue::from_str(&info.remaining.to_string()) {
        headers.insert(HeaderName::from_static("x-ratelimit-remaining"), v);
    }
}

fn rejection_error(decision: &Decision) -> Error {
    let info = decision.info();
    let retry_after = info.retry_after.map(|d| d.as_secs().max(1)).unwrap_or(1);

    let body = format!(
        r#"{{"error":"Rate limit exceeded","message":"Too many requests. Retry after {retry_after} seconds.","retry_after":{retry_after}}}"#,
    );

    let response = HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header(("Content-Type", "application/json"))
        .insert_header(("X-Ratelimit-Limit", info.limit.to_string()))
        .insert_header(("X-Ratelimit-Remaining", info.remaining.to_string()))
        .insert_header(("X-Ratelimit-Retry-After", retry_after.to_string()))
        .body(body);

    actix_web::error::InternalError::from_response("Rate limited", response).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actix_gateway_clone() {
        use crate::rule::RuleRegistry;
        use crate::storage::MemoryStorage;

        let registry = Arc::new(RuleRegistry::new());
        let service = RateLimiterService::new(MemoryStorage::new(), registry);
        let gateway = ActixGateway::new(service);
        let _cloned = gateway.clone();
    }
}
