//! Turning directory outcomes into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::directory::DirectoryError;

pub const GENERIC_FAILURE: &str = "Something went wrong, please try again.";
pub const SESSION_TAKEN_OVER: &str =
    "You have been logged out because your account was used to log in elsewhere.";
pub const LOGIN_REQUIRED: &str = "Please log in.";
pub const ADMIN_REQUIRED: &str = "Admin login required.";

#[derive(Debug, Serialize, ToSchema)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub(crate) fn message(status: StatusCode, text: impl Into<String>) -> Response {
    (status, Json(Message::new(text))).into_response()
}

pub(crate) const fn status_for(err: &DirectoryError) -> StatusCode {
    match err {
        DirectoryError::InvalidField(_) => StatusCode::BAD_REQUEST,
        DirectoryError::DuplicateEmail | DirectoryError::SessionConflict => StatusCode::CONFLICT,
        DirectoryError::UserNotFound => StatusCode::NOT_FOUND,
        DirectoryError::WrongPassword | DirectoryError::AdminDenied => StatusCode::UNAUTHORIZED,
        DirectoryError::Inactive => StatusCode::FORBIDDEN,
        DirectoryError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for DirectoryError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if self.is_user_facing() {
            message(status, self.to_string())
        } else {
            // Store details stay in the logs.
            error!("Directory store failure: {self:#}");
            message(status, GENERIC_FAILURE)
        }
    }
}
