//! Request-shape-independent logic shared by the axum and actix-web gateway
//! adapters: domain classification and identifier construction. Kept in one
//! place so the two integrations can't drift apart on what counts as the
//! `auth`/`messaging` domain or how a missing `X-User-Id` header is handled.

use std::net::IpAddr;

use crate::identifier::ClientIdentifier;

/// Path that bypasses rate limiting entirely.
pub const HEALTH_CHECK_PATH: &str = "/health";

/// Key type every gateway-dispatched rule is looked up under.
///
/// Both gateway adapters identify clients by IP address; rules that key on
/// `user_id` or `endpoint` are reached through `RateLimiterService::check`
/// directly rather than through a gateway layer.
pub const GATEWAY_KEY_TYPE: &str = "ip_address";

/// Minimal view of an inbound request a gateway adapter needs. Each
/// framework implements this once, over its own request type, so domain
/// classification and identifier extraction can't drift between the axum
/// and actix-web integrations.
pub trait GatewayRequest {
    /// The request's path.
    fn path(&self) -> &str;
    /// A request header, by lowercase name.
    fn header(&self, name: &str) -> Option<&str>;
}

/// Classify a request path into a rate limiting domain.
///
/// Path-prefix dispatch: `/auth/...` and `/messages/...` get their own
/// domain, everything else falls back to `"api"`.
pub fn classify_domain(path: &str) -> &'static str {
    if path.contains("/auth/") {
        "auth"
    } else if path.contains("/messages/") {
        "messaging"
    } else {
        "api"
    }
}

fn resolve_client_ip(forwarded_for: Option<&str>, real_ip: Option<&str>) -> Option<IpAddr> {
    if let Some(forwarded) = forwarded_for {
        if let Some(first) = forwarded.split(',').next() {
            if let Ok(ip) = first.trim().parse() {
                return Some(ip);
            }
        }
    }
    real_ip.and_then(|v| v.parse().ok())
}

/// Build the client identifier a gateway adapter checks a request against:
/// IP from proxy headers, user id from `X-User-Id` (defaulting to
/// `"anonymous"`), endpoint from the path.
pub fn identifier_for<R: GatewayRequest + ?Sized>(req: &R) -> ClientIdentifier {
    let ip = resolve_client_ip(req.header("x-forwarded-for"), req.header("x-real-ip"));
    let path = req.path().to_string();

    match req.header("x-user-id") {
        Some(user_id) => ClientIdentifier::new(ip, user_id, path),
        None => ClientIdentifier::anonymous(ip, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeRequest {
        path: String,
        headers: Vec<(&'static str, &'static str)>,
    }

    impl GatewayRequest for FakeRequest {
        fn path(&self) -> &str {
            &self.path
        }

        fn header(&self, name: &str) -> Option<&str> {
            self.headers.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
        }
    }

    #[test]
    fn test_classify_domain() {
        assert_eq!(classify_domain("/auth/login"), "auth");
        assert_eq!(classify_domain("/messages/send"), "messaging");
        assert_eq!(classify_domain("/widgets/42"), "api");
    }

    #[test]
    fn test_identifier_for_defaults_to_anonymous() {
        let req = FakeRequest {
            path: "/api/x".into(),
            headers: vec![],
        };
        let id = identifier_for(&req);
        assert_eq!(id.user_id, "anonymous");
    }

    #[test]
    fn test_identifier_for_uses_user_id_header() {
        let req = FakeRequest {
            path: "/api/x".into(),
            headers: vec![("x-user-id", "alice")],
        };
        let id = identifier_for(&req);
        assert_eq!(id.user_id, "alice");
    }

    #[test]
    fn test_identifier_for_prefers_forwarded_for_over_real_ip() {
        let req = FakeRequest {
            path: "/api/x".into(),
            headers: vec![
                ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
                ("x-real-ip", "198.51.100.2"),
            ],
        };
        let id = identifier_for(&req);
        assert_eq!(id.ip_address, Some("203.0.113.7".parse().unwrap()));
    }
}
