// handlers/invite/decline.rs - POST /invites/:invite_id/decline handler

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::InviteActionRequest;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::InviteService;
use crate::state::AppState;

/// 204 on success, 403 when the caller is not the invitee
pub async fn invite_decline(
    State(state): State<AppState>,
    Path(invite_id): Path<String>,
    payload: Result<Json<InviteActionRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Json(body) = payload?;
    InviteService::new(state.gateway().await?)
        .decline_invite(&invite_id, &body.user_id)
        .await?;
    Ok(ApiResponse::no_content())
}
