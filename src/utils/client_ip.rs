//! Client address extraction for per-client quotas.

use axum::http::HeaderMap;
use std::net::SocketAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Identifier used when no address can be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Determines the client address a request is accounted to.
///
/// Without a proxy in front, the socket peer is authoritative and headers are
/// ignored, since any client can forge them. Behind a trusted reverse proxy
/// the first entry of `X-Forwarded-For` wins, then `X-Real-IP`, then the peer.
///
/// Returns [`UNKNOWN_CLIENT`] if nothing is available; all such requests share
/// one quota.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
///
/// assert_eq!(extract_client_ip(&headers, None, true), "203.0.113.7");
/// ```
pub fn extract_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> String {
    if behind_proxy {
        if let Some(ip) = header_ip(headers, X_FORWARDED_FOR) {
            return ip;
        }
        if let Some(ip) = header_ip(headers, X_REAL_IP) {
            return ip;
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn header_ip(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .split(',')
        .map(str::trim)
        .find(|part| !part.is_empty())
        .map(str::to_string)
}
