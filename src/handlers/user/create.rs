// handlers/user/create.rs - POST /users handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::database::models::{NewUser, User};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::UserService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
}

/// Register or refresh a user record synced from the identity provider
pub async fn user_create(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(body) = payload?;
    let service = UserService::new(state.gateway().await?);

    let user = service
        .create_user(NewUser {
            id: body.id,
            email: body.email,
            first_name: body.first_name,
            last_name: body.last_name,
            username: body.username,
        })
        .await?;

    Ok(ApiResponse::success(user))
}
