//! Session cookie policy
//!
//! Sessions live for a fixed lifetime. Once less than half of it remains,
//! a validated session is extended to a full lifetime again and the cookie
//! is re-issued. Expired or unknown sessions get a blank cookie that tells
//! the browser to drop it.

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{config::SessionConfig, repositories::SessionRecord};

/// Result of checking a session's expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    /// Still valid but in the second half of its life; extend to this expiry
    Refresh(DateTime<Utc>),
    Expired,
}

/// What to do with the session found for a request's cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionDecision {
    /// Let the request through; when `extend_to` is set, persist the new
    /// expiry and re-issue the cookie
    Accept {
        user_id: Uuid,
        extend_to: Option<DateTime<Utc>>,
    },
    /// Answer 401 with a blank cookie; `delete` is set for expired sessions
    Reject { delete: bool },
}

#[derive(Debug, Clone)]
pub struct SessionPolicy {
    cookie_name: String,
    lifetime: Duration,
    secure: bool,
}

impl SessionPolicy {
    pub fn new(cookie_name: impl Into<String>, lifetime: Duration, secure: bool) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            lifetime,
            secure,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn evaluate(&self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> SessionStatus {
        if now >= expires_at {
            SessionStatus::Expired
        } else if now >= expires_at - self.lifetime / 2 {
            SessionStatus::Refresh(now + self.lifetime)
        } else {
            SessionStatus::Active
        }
    }

    pub fn decide(&self, session: Option<&SessionRecord>, now: DateTime<Utc>) -> SessionDecision {
        let Some(session) = session else {
            return SessionDecision::Reject { delete: false };
        };

        match self.evaluate(session.expires_at, now) {
            SessionStatus::Active => SessionDecision::Accept {
                user_id: session.user_id,
                extend_to: None,
            },
            SessionStatus::Refresh(expires_at) => SessionDecision::Accept {
                user_id: session.user_id,
                extend_to: Some(expires_at),
            },
            SessionStatus::Expired => SessionDecision::Reject { delete: true },
        }
    }

    /// Browser-session cookie carrying `session_id`
    pub fn session_cookie(&self, session_id: &str) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), session_id.to_string()))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .secure(self.secure)
            .build()
    }

    /// Empty, already expired cookie that clears the session on the client
    pub fn blank_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.session_cookie("");
        cookie.make_removal();
        cookie
    }
}

impl From<&SessionConfig> for SessionPolicy {
    fn from(config: &SessionConfig) -> Self {
        Self::new(
            config.cookie_name.clone(),
            Duration::days(config.lifetime_days),
            config.secure_cookie,
        )
    }
}
