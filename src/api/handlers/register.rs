use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use crate::api::{
    error::{message, Message},
    state::AppState,
};
use crate::directory::Profile;

#[derive(ToSchema, Deserialize)]
pub struct RegisterRequest {
    name: String,
    phone: String,
    batch: String,
    year_of_passout: String,
    email: String,
    #[serde(default)]
    address: String,
    profession: String,
    password: String,
}

impl RegisterRequest {
    fn into_parts(self) -> (Profile, String) {
        (
            Profile {
                name: self.name.trim().to_string(),
                phone: self.phone.trim().to_string(),
                batch: self.batch.trim().to_string(),
                year_of_passout: self.year_of_passout.trim().to_string(),
                email: self.email,
                address: self.address.trim().to_string(),
                profession: self.profession.trim().to_string(),
            },
            self.password,
        )
    }
}

#[utoipa::path(
    post,
    path = "/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = Message),
        (status = 400, description = "Invalid or missing field", body = Message),
        (status = 409, description = "Email already registered", body = Message),
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn register(
    state: Extension<Arc<AppState>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return message(StatusCode::BAD_REQUEST, "Missing payload");
    };

    let (profile, password) = request.into_parts();
    debug!("registering {}", profile.email);

    match state.identity().register(profile, &password).await {
        Ok(()) => message(
            StatusCode::CREATED,
            "Registration successful! You can now log in.",
        ),
        Err(err) => err.into_response(),
    }
}
