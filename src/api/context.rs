//! Request-scoped identity context and the cookies that carry it.
//!
//! The browser holds the signed-in email and session token in two session
//! cookies (no `Max-Age`, so they die with the browser session). Admin grants
//! travel in their own cookie or as a bearer token. Nothing about the caller
//! is kept server-side between requests.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        header::{InvalidHeaderValue, AUTHORIZATION, COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue, StatusCode,
    },
};
use std::sync::Arc;
use tracing::error;

use super::state::AppState;
use crate::directory::AdminCapability;

pub const USER_COOKIE_NAME: &str = "ankur_user";
pub const SESSION_COOKIE_NAME: &str = "ankur_session";
pub const ADMIN_COOKIE_NAME: &str = "ankur_admin";

/// Who is calling, as far as this request can tell.
#[derive(Debug, Default)]
pub struct RequestContext {
    pub email: Option<String>,
    pub session_token: Option<String>,
    pub admin: Option<AdminCapability>,
}

impl RequestContext {
    /// Email and token together, when the caller presents both.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((self.email.as_deref()?, self.session_token.as_deref()?))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(state) = parts.extensions.get::<Arc<AppState>>().cloned() else {
            error!("AppState extension missing");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        };

        let admin = match admin_token(&parts.headers) {
            Some(token) => state.admin().authorize(&token).await,
            None => None,
        };

        Ok(Self {
            email: extract_cookie(&parts.headers, USER_COOKIE_NAME),
            session_token: extract_cookie(&parts.headers, SESSION_COOKIE_NAME),
            admin,
        })
    }
}

/// Admin grant from the bearer header, falling back to the admin cookie.
pub(crate) fn admin_token(headers: &HeaderMap) -> Option<String> {
    extract_bearer_token(headers).or_else(|| extract_cookie(headers, ADMIN_COOKIE_NAME))
}

pub(crate) fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        // Emails may carry non-ASCII characters, which `to_str` rejects.
        let Ok(value) = std::str::from_utf8(header.as_bytes()) else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            let val = val.trim();
            if key.trim() == name && !val.is_empty() {
                return Some(val.to_string());
            }
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// `HttpOnly` cookie; without `max_age` it lasts for the browser session.
pub(crate) fn set_cookie(
    name: &str,
    value: &str,
    secure: bool,
    max_age: Option<u64>,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax");
    if let Some(seconds) = max_age {
        cookie.push_str(&format!("; Max-Age={seconds}"));
    }
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn clear_cookie(name: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    set_cookie(name, "", secure, Some(0))
}

/// `Set-Cookie` headers that drop the user and session cookies.
pub(crate) fn clear_session_cookies(secure: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in [USER_COOKIE_NAME, SESSION_COOKIE_NAME] {
        match clear_cookie(name, secure) {
            Ok(cookie) => {
                headers.append(SET_COOKIE, cookie);
            }
            Err(err) => error!("Failed to build {name} cookie: {err}"),
        }
    }
    headers
}
