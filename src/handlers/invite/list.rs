// handlers/invite/list.rs - GET /users/:user_id/invites handler

use axum::extract::{Path, State};

use crate::database::models::UserInvite;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::InviteService;
use crate::state::AppState;

/// Pending invites for a user id or an email address; an empty array when there are none
pub async fn invite_list(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<UserInvite>> {
    let invites = InviteService::new(state.gateway().await?)
        .list_invites(&user_id)
        .await?;
    Ok(ApiResponse::success(invites))
}
