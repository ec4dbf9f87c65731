//! Session and rate limit middleware for the feed routes

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Utc;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    error::ApiError,
    session::{SessionDecision, SessionPolicy},
    state::AppState,
};

/// Authenticated user information
///
/// Resolved once per request by [`session_middleware`] and read by handlers
/// from the request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Session cookie middleware
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let policy = &state.session_policy;
    let path = req.uri().path().to_string();

    let jar = CookieJar::from_headers(req.headers());
    let Some(session_id) = jar
        .get(policy.cookie_name())
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
    else {
        warn!(target: "security", %path, "Unauthorized access attempt: no session cookie");
        return Err(ApiError::Unauthorized);
    };

    let session = state
        .session_repository
        .find_by_id(&session_id)
        .await
        .map_err(|e| {
            error!("Failed to load session: {}", e);
            ApiError::InternalServerError
        })?;

    let (user_id, extend_to) = match policy.decide(session.as_ref(), Utc::now()) {
        SessionDecision::Accept { user_id, extend_to } => (user_id, extend_to),
        SessionDecision::Reject { delete } => {
            if delete {
                if let Err(e) = state.session_repository.delete(&session_id).await {
                    error!("Failed to delete expired session: {}", e);
                }
                warn!(target: "security", %path, "Rejected expired session");
            } else {
                warn!(target: "security", %path, "Unauthorized access attempt: unknown session");
            }
            return Ok(reject_with_blank_cookie(policy));
        }
    };

    let refreshed_cookie = match extend_to {
        Some(expires_at) => {
            state
                .session_repository
                .extend(&session_id, expires_at)
                .await
                .map_err(|e| {
                    error!("Failed to extend session: {}", e);
                    ApiError::InternalServerError
                })?;
            Some(policy.session_cookie(&session_id))
        }
        None => None,
    };

    req.extensions_mut().insert(AuthUser { id: user_id });

    let mut response = next.run(req).await;
    if let Some(cookie) = refreshed_cookie {
        append_cookie(&mut response, &cookie);
    }

    Ok(response)
}

/// Per-user rate limit middleware
///
/// Must run after [`session_middleware`].
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = req
        .extensions()
        .get::<AuthUser>()
        .map(|user| user.id)
        .ok_or(ApiError::Unauthorized)?;

    let decision = state
        .rate_limiter
        .check(&user_id.to_string())
        .await
        .map_err(|e| {
            error!("Failed to check rate limit: {}", e);
            ApiError::InternalServerError
        })?;

    if !decision.allowed {
        warn!(
            target: "security",
            %user_id,
            path = %req.uri().path(),
            limit = decision.limit,
            "Rate limit exceeded"
        );
        return Err(ApiError::TooManyRequests {
            retry_after_seconds: decision.retry_after_seconds.unwrap_or(1),
        });
    }

    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static("x-ratelimit-limit"),
        HeaderValue::from(decision.limit),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-remaining"),
        HeaderValue::from(decision.remaining),
    );

    Ok(response)
}

fn reject_with_blank_cookie(policy: &SessionPolicy) -> Response {
    let mut response = ApiError::Unauthorized.into_response();
    append_cookie(&mut response, &policy.blank_cookie());
    response
}

fn append_cookie(response: &mut Response, cookie: &Cookie<'_>) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => error!("Failed to encode session cookie: {}", e),
    }
}
