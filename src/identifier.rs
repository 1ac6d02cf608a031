//! Client identity and the base storage key it derives.
//!
//! A `ClientIdentifier` carries the pieces of an inbound request the
//! rate-limiting service needs to name a bucket: the caller's IP address,
//! an authenticated user id (or the `"anonymous"` default), and the
//! endpoint path. `base_key` turns a `(domain, key_type)` pair plus this
//! identity into the storage key every algorithm keys its state under.

use std::net::IpAddr;

/// Default user id used when a request carries no identifying header.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Identifying information extracted from an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentifier {
    /// Client IP address, when known.
    pub ip_address: Option<IpAddr>,
    /// Authenticated user id, defaulting to `"anonymous"`.
    pub user_id: String,
    /// The request's endpoint path (used for domain classification upstream).
    pub endpoint: String,
}

impl ClientIdentifier {
    /// Build an identifier from its parts.
    pub fn new(ip_address: Option<IpAddr>, user_id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            ip_address,
            user_id: user_id.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Build an identifier with the default anonymous user.
    pub fn anonymous(ip_address: Option<IpAddr>, endpoint: impl Into<String>) -> Self {
        Self::new(ip_address, ANONYMOUS_USER, endpoint)
    }

    /// Resolve the raw identifier string for a given key type.
    ///
    /// Returns `None` only for a `key_type` this identity has no concept of
    /// at all — callers should fail open in that case. A recognized key
    /// type that the request simply didn't supply (no IP could be
    /// determined) still resolves, substituting `"anonymous"`, so a matched
    /// rule's quota keeps applying instead of silently not applying to
    /// anonymous traffic.
    pub fn identifier_for(&self, key_type: &str) -> Option<String> {
        match key_type {
            "ip_address" => Some(
                self.ip_address
                    .map(|ip| ip.to_string())
                    .unwrap_or_else(|| ANONYMOUS_USER.to_string()),
            ),
            "user_id" => Some(self.user_id.clone()),
            "endpoint" => Some(self.endpoint.clone()),
            _ => None,
        }
    }

    /// Build the base storage key: `"rate_limit:{domain}:{key_type}:{identifier}"`.
    ///
    /// Individual algorithms append their own suffix (`:tokens`, `:log`,
    /// `:window:{start}`, etc.) on top of this base.
    pub fn base_key(&self, domain: &str, key_type: &str) -> Option<String> {
        let identifier = self.identifier_for(key_type)?;
        Some(format!("rate_limit:{domain}:{key_type}:{identifier}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_default() {
        let id = ClientIdentifier::anonymous(None, "/api/data");
        assert_eq!(id.user_id, "anonymous");
    }

    #[test]
    fn test_base_key_ip_address() {
        let id = ClientIdentifier::new(Some("203.0.113.7".parse().unwrap()), "anonymous", "/api/data");
        assert_eq!(
            id.base_key("api", "ip_address"),
            Some("rate_limit:api:ip_address:203.0.113.7".to_string())
        );
    }

    #[test]
    fn test_base_key_user_id() {
        let id = ClientIdentifier::new(None, "alice", "/messages/send");
        assert_eq!(
            id.base_key("messaging", "user_id"),
            Some("rate_limit:messaging:user_id:alice".to_string())
        );
    }

    #[test]
    fn test_base_key_missing_ip_substitutes_anonymous() {
        let id = ClientIdentifier::new(None, "anonymous", "/api/data");
        assert_eq!(
            id.base_key("api", "ip_address"),
            Some("rate_limit:api:ip_address:anonymous".to_string())
        );
    }

    #[test]
    fn test_base_key_unknown_key_type_fails_open() {
        let id = ClientIdentifier::new(Some("203.0.113.7".parse().unwrap()), "anonymous", "/api/data");
        assert_eq!(id.base_key("api", "api_key"), None);
    }
}
