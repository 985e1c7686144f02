use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::session::require_session;
use crate::api::{context::RequestContext, error::Message, state::AppState};
use crate::directory::DirectoryEntry;

#[utoipa::path(
    get,
    path = "/v1/directory",
    responses(
        (status = 200, description = "Alumni directory: name, batch, profession, email, year of passout", body = [DirectoryEntry]),
        (status = 401, description = "Not logged in, or logged in elsewhere", body = Message),
    ),
    tag = "directory"
)]
#[instrument(skip(state, context))]
pub async fn directory(state: Extension<Arc<AppState>>, context: RequestContext) -> Response {
    if let Err(response) = require_session(&state, &context).await {
        return response;
    }

    match state.identity().list_directory().await {
        Ok(entries) => {
            debug!("directory entries: {}", entries.len());
            (StatusCode::OK, Json(entries)).into_response()
        }
        Err(err) => err.into_response(),
    }
}
