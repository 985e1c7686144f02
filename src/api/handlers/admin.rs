//! Admin login and account management.
//!
//! Every management route needs an admin grant. The grant comes from
//! `POST /v1/admin/login` and is presented as a bearer token or in the admin
//! cookie. The handlers pass the resolved [`AdminCapability`] down to the
//! identity service, which accepts nothing else as proof of authority.

use axum::{
    extract::{Extension, Path},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

use crate::api::{
    context::{admin_token, clear_cookie, set_cookie, RequestContext, ADMIN_COOKIE_NAME},
    error::{message, Message, ADMIN_REQUIRED},
    state::AppState,
};
use crate::directory::{AdminCapability, AdminOverview, DirectoryError};

#[derive(ToSchema, Deserialize)]
pub struct AdminLoginRequest {
    username: String,
    password: String,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct AdminLoginResponse {
    pub token: String,
    pub expires_in_seconds: u64,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct ActiveRequest {
    pub active: bool,
}

fn require_admin(context: &RequestContext) -> Result<&AdminCapability, Response> {
    context
        .admin
        .as_ref()
        .ok_or_else(|| message(StatusCode::UNAUTHORIZED, ADMIN_REQUIRED))
}

#[utoipa::path(
    post,
    path = "/v1/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Admin grant issued", body = AdminLoginResponse),
        (status = 401, description = "Invalid admin credentials", body = Message),
    ),
    tag = "admin"
)]
#[instrument(skip(state, payload))]
pub async fn admin_login(
    state: Extension<Arc<AppState>>,
    payload: Option<Json<AdminLoginRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return message(StatusCode::BAD_REQUEST, "Missing payload");
    };

    let grant = match state
        .admin()
        .login(&request.username, &request.password)
        .await
    {
        Ok(grant) => grant,
        Err(err) => return err.into_response(),
    };

    let expires_in_seconds = grant.expires_in.as_secs();
    let cookie = match set_cookie(
        ADMIN_COOKIE_NAME,
        &grant.token,
        state.config().session_cookie_secure(),
        Some(expires_in_seconds),
    ) {
        Ok(cookie) => cookie,
        Err(err) => {
            error!("Failed to build admin cookie: {err}");
            return DirectoryError::Store(err.into()).into_response();
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    let body = AdminLoginResponse {
        token: grant.token,
        expires_in_seconds,
    };
    (StatusCode::OK, headers, Json(body)).into_response()
}

#[utoipa::path(
    post,
    path = "/v1/admin/logout",
    responses(
        (status = 204, description = "Admin grant revoked and cookie cleared")
    ),
    tag = "admin"
)]
#[instrument(skip(state, headers))]
pub async fn admin_logout(state: Extension<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(token) = admin_token(&headers) {
        state.admin().revoke(&token).await;
    }

    let mut response_headers = HeaderMap::new();
    match clear_cookie(ADMIN_COOKIE_NAME, state.config().session_cookie_secure()) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build admin cookie: {err}"),
    }
    (StatusCode::NO_CONTENT, response_headers).into_response()
}

#[utoipa::path(
    get,
    path = "/v1/admin/users",
    responses(
        (status = 200, description = "All accounts with counts, password hashes omitted", body = AdminOverview),
        (status = 401, description = "Admin login required", body = Message),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state, context))]
pub async fn list_users(state: Extension<Arc<AppState>>, context: RequestContext) -> Response {
    let admin = match require_admin(&context) {
        Ok(admin) => admin,
        Err(response) => return response,
    };

    match state.identity().list_all(admin).await {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/v1/admin/users/{email}/active",
    params(("email" = String, Path, description = "Account email")),
    request_body = ActiveRequest,
    responses(
        (status = 204, description = "Account status updated"),
        (status = 401, description = "Admin login required", body = Message),
        (status = 404, description = "User not found", body = Message),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state, context, payload))]
pub async fn set_active(
    state: Extension<Arc<AppState>>,
    context: RequestContext,
    Path(email): Path<String>,
    payload: Option<Json<ActiveRequest>>,
) -> Response {
    let admin = match require_admin(&context) {
        Ok(admin) => admin,
        Err(response) => return response,
    };
    let Some(Json(request)) = payload else {
        return message(StatusCode::BAD_REQUEST, "Missing payload");
    };

    match state
        .identity()
        .set_active(admin, &email, request.active)
        .await
    {
        Ok(()) => {
            info!(active = request.active, "admin changed account status");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/v1/admin/users/{email}",
    params(("email" = String, Path, description = "Account email")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Admin login required", body = Message),
        (status = 404, description = "User not found", body = Message),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state, context))]
pub async fn delete_user(
    state: Extension<Arc<AppState>>,
    context: RequestContext,
    Path(email): Path<String>,
) -> Response {
    let admin = match require_admin(&context) {
        Ok(admin) => admin,
        Err(response) => return response,
    };

    match state.identity().delete(admin, &email).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}
