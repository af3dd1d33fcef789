//! Client key extraction for admission control.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Returns the key the rate limiter buckets a request under.
///
/// With `behind_proxy` set, the first address in `X-Forwarded-For` wins, then
/// `X-Real-IP`. Otherwise (or when neither header parses) the peer address
/// is used. Ports are never part of the key.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> String {
    if behind_proxy && let Some(ip) = forwarded_ip(headers) {
        return ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let from_xff = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok());

    from_xff.or_else(|| {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    })
}
