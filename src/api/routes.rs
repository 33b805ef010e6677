//! Service and authentication route handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::server::SharedState;
use crate::auth::{AuthUser, LoginRequest, LoginResponse, RegisterRequest};
use crate::error::{Error, Result};

/// Envelope for resource responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::with_status(StatusCode::OK, "OK", data)
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            data: Some(data),
        }
    }
}

/// Unwrap a JSON body, turning extractor rejections into 400s
pub fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| Error::Validation(rejection.body_text()))
}

pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Server Is Successfully Running" }))
}

pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok("healthy"))
}

/// Returns the created account record; the token only comes from `/login`
pub async fn register(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let account = state.auth.register(json_body(payload)?).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_status(
            StatusCode::CREATED,
            "Inserted",
            account,
        )),
    ))
}

pub async fn login(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let token = state.auth.login(json_body(payload)?).await?;
    Ok(Json(LoginResponse { token }))
}

/// Claims of the caller as decoded by the gate
pub async fn account_info(AuthUser(claims): AuthUser) -> impl IntoResponse {
    Json(claims)
}
