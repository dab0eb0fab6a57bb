use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, RateLimiter};
use rollcall_config::RateLimitConfig;
use serde_json::json;
use tracing::{debug, warn};

use crate::state::AppState;

/// How often idle client buckets are dropped.
const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Per-client limiter for the public authentication endpoints.
pub type AuthRateLimiter = DefaultKeyedRateLimiter<IpAddr>;

pub fn auth_rate_limiter(config: &RateLimitConfig) -> AuthRateLimiter {
    RateLimiter::keyed(config.auth_quota())
}

/// Drops buckets that have refilled completely so the key map stays bounded
/// by the number of recently active clients.
pub fn spawn_limiter_pruning(limiter: Arc<AuthRateLimiter>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            limiter.retain_recent();
            limiter.shrink_to_fit();
            debug!(clients = limiter.len(), "Pruned auth rate limiter");
        }
    });
}

/// Client key: the socket peer. The first `X-Forwarded-For` hop is used only
/// when `trust_proxy` is set, and only if it parses as an IP address.
fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> IpAddr {
    let forwarded = trust_proxy
        .then(|| headers.get("x-forwarded-for"))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok());

    forwarded
        .or_else(|| peer.map(|addr| addr.ip()))
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn auth_rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if !state.rate_limit_config.enabled {
        return next.run(req).await;
    }

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(req.headers(), peer, state.rate_limit_config.trust_proxy);

    if state.auth_limiter.check_key(&key).is_err() {
        warn!(client = %key, path = %req.uri().path(), "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Too many requests, please try again later",
                "code": "RATE_LIMITED",
            })),
        )
            .into_response();
    }

    next.run(req).await
}
