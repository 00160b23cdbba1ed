// handlers/invite/delete.rs - DELETE /invites/:invite_id handler

use axum::extract::{Path, State};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::InviteService;
use crate::state::AppState;

pub async fn invite_delete(State(state): State<AppState>, Path(invite_id): Path<String>) -> ApiResult<()> {
    InviteService::new(state.gateway().await?)
        .delete_invite(&invite_id)
        .await?;
    Ok(ApiResponse::no_content())
}
