//! Password login that opens the account's single active session.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

use crate::api::{
    context::{set_cookie, RequestContext, SESSION_COOKIE_NAME, USER_COOKIE_NAME},
    error::{message, Message},
    state::{AppState, LoginPolicy},
};
use crate::directory::{DirectoryError, SessionManager};

#[derive(ToSchema, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct LoginResponse {
    pub email: String,
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookies set", body = LoginResponse),
        (status = 401, description = "Incorrect password", body = Message),
        (status = 403, description = "Account not activated", body = Message),
        (status = 404, description = "User not found", body = Message),
        (status = 409, description = "Signed in elsewhere (reject policy)", body = Message),
    ),
    tag = "auth"
)]
#[instrument(skip(state, context, payload))]
pub async fn login(
    state: Extension<Arc<AppState>>,
    context: RequestContext,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return message(StatusCode::BAD_REQUEST, "Missing payload");
    };

    let authenticated = match state
        .identity()
        .authenticate(&request.email, &request.password)
        .await
    {
        Ok(authenticated) => authenticated,
        Err(err) => return err.into_response(),
    };

    if state.config().login_policy() == LoginPolicy::Reject {
        match held_elsewhere(state.sessions(), &authenticated.email, &context).await {
            Ok(false) => (),
            Ok(true) => return DirectoryError::SessionConflict.into_response(),
            Err(err) => return err.into_response(),
        }
    }

    let token = match state.sessions().begin(&authenticated.email).await {
        Ok(token) => token,
        Err(err) => return err.into_response(),
    };

    let secure = state.config().session_cookie_secure();
    let mut headers = HeaderMap::new();
    for (name, value) in [
        (USER_COOKIE_NAME, authenticated.email.as_str()),
        (SESSION_COOKIE_NAME, token.as_str()),
    ] {
        match set_cookie(name, value, secure, None) {
            Ok(cookie) => {
                headers.append(SET_COOKIE, cookie);
            }
            Err(err) => {
                error!("Failed to build {name} cookie: {err}");
                return DirectoryError::Store(err.into()).into_response();
            }
        }
    }

    info!("login successful");

    let body = LoginResponse {
        email: authenticated.email,
        message: "Login successful.".to_string(),
    };
    (StatusCode::OK, headers, Json(body)).into_response()
}

/// Whether another device holds the active session for `email`.
///
/// A caller re-submitting its own still-valid token is not "elsewhere".
async fn held_elsewhere(
    sessions: &SessionManager,
    email: &str,
    context: &RequestContext,
) -> Result<bool, DirectoryError> {
    if !sessions.is_active(email).await? {
        return Ok(false);
    }
    match context.session_token.as_deref() {
        Some(token) => Ok(!sessions.is_active_with_token(email, token).await?),
        None => Ok(true),
    }
}
