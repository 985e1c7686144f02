//! Session liveness and logout.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::api::{
    context::{clear_session_cookies, RequestContext},
    error::{message, Message, LOGIN_REQUIRED, SESSION_TAKEN_OVER},
    state::AppState,
};
use crate::directory::DirectoryError;

#[derive(ToSchema, Serialize, Debug)]
pub struct SessionResponse {
    pub email: String,
}

/// Resolve the caller's cookies into a live session, or the response to send instead.
///
/// A superseded token answers 401 with the takeover notice and clears the
/// cookies, so the client drops its credentials and logs in again.
pub(crate) async fn require_session(
    state: &AppState,
    context: &RequestContext,
) -> Result<String, Response> {
    let Some((email, token)) = context.credentials() else {
        return Err(message(StatusCode::UNAUTHORIZED, LOGIN_REQUIRED));
    };

    match state.sessions().validate(email, token).await {
        Ok(()) => Ok(email.to_string()),
        Err(DirectoryError::SessionConflict) => Err(taken_over(state)),
        Err(err) => Err(err.into_response()),
    }
}

fn taken_over(state: &AppState) -> Response {
    let headers = clear_session_cookies(state.config().session_cookie_secure());
    (
        StatusCode::UNAUTHORIZED,
        headers,
        Json(Message::new(SESSION_TAKEN_OVER)),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/v1/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No session cookies"),
        (status = 401, description = "Session was replaced by a login elsewhere", body = Message),
    ),
    tag = "auth"
)]
#[instrument(skip(state, context))]
pub async fn session(state: Extension<Arc<AppState>>, context: RequestContext) -> Response {
    // Missing cookies are "no session", not an error.
    if context.credentials().is_none() {
        return StatusCode::NO_CONTENT.into_response();
    }

    match require_session(&state, &context).await {
        Ok(email) => (StatusCode::OK, Json(SessionResponse { email })).into_response(),
        Err(response) => response,
    }
}

#[utoipa::path(
    post,
    path = "/v1/logout",
    responses(
        (status = 204, description = "Session ended and cookies cleared")
    ),
    tag = "auth"
)]
#[instrument(skip(state, context))]
pub async fn logout(state: Extension<Arc<AppState>>, context: RequestContext) -> Response {
    if let Some((email, token)) = context.credentials() {
        // Only the holder of the active token may end it; a superseded device
        // must not sign out the login that replaced it.
        match state.sessions().is_active_with_token(email, token).await {
            Ok(true) => {
                if let Err(err) = state.sessions().end(email).await {
                    return err.into_response();
                }
                info!("session ended");
            }
            Ok(false) => (),
            Err(err) => return err.into_response(),
        }
    }

    // Always clear the cookies, even if the session was already gone.
    let headers = clear_session_cookies(state.config().session_cookie_secure());
    (StatusCode::NO_CONTENT, headers).into_response()
}
