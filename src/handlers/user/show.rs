// handlers/user/show.rs - GET /users/:user_id handler

use axum::extract::{Path, State};

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::UserService;
use crate::state::AppState;

pub async fn user_show(State(state): State<AppState>, Path(user_id): Path<String>) -> ApiResult<User> {
    let user = UserService::new(state.gateway().await?).get_user(&user_id).await?;
    Ok(ApiResponse::success(user))
}
