use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Extension, Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use fieldtrack_application::RateLimitRule;
use fieldtrack_core::{AppError, UserIdentity};
use ipnet::IpNet;
use tower_sessions::Session;
use tracing::warn;

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

const UNKNOWN_SOURCE: &str = "unknown";

pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site") {
            if fetch_site == HeaderValue::from_static("cross-site") {
                return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
            }
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let allowed_origin = state.frontend_url.as_str();
        let origin_is_allowed = origin == allowed_origin;
        let referer_is_allowed = referer.starts_with(allowed_origin);

        if !origin_is_allowed && !referer_is_allowed {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

/// Counts the request against the route's budget, keyed by client address.
pub async fn rate_limit(
    State(state): State<AppState>,
    Extension(rule): Extension<RateLimitRule>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip());
    let source = client_source(peer, request.headers(), &state.trusted_proxies);

    if let Err(error) = state
        .rate_limit_service
        .check_rate_limit(&rule, source.as_str())
        .await
    {
        if matches!(error, AppError::RateLimited(_)) {
            warn!(category = %rule.category, source = %source, "rate limit exceeded");
        }
        return Err(error.into());
    }

    Ok(next.run(request).await)
}

/// Resolves the address a request is attributed to.
///
/// Forwarded headers are honoured only when the direct peer is a trusted
/// proxy; the right-most untrusted hop wins.
fn client_source(peer: Option<IpAddr>, headers: &HeaderMap, trusted_proxies: &[IpNet]) -> String {
    let Some(peer) = peer else {
        return UNKNOWN_SOURCE.to_owned();
    };

    let is_trusted = |address: &IpAddr| trusted_proxies.iter().any(|net| net.contains(address));
    if !is_trusted(&peer) {
        return peer.to_string();
    }

    headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|hop| hop.trim().parse::<IpAddr>().ok())
        .rev()
        .find(|hop| !is_trusted(hop))
        .unwrap_or(peer)
        .to_string()
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
