// handlers/invite/accept.rs - POST /invites/:invite_id/accept handler

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::InviteActionRequest;
use crate::database::models::Invite;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::InviteService;
use crate::state::AppState;

/// 200 with the consumed invite, 410 when it is no longer pending
pub async fn invite_accept(
    State(state): State<AppState>,
    Path(invite_id): Path<String>,
    payload: Result<Json<InviteActionRequest>, JsonRejection>,
) -> ApiResult<Invite> {
    let Json(body) = payload?;
    let invite = InviteService::new(state.gateway().await?)
        .accept_invite(&invite_id, &body.user_id)
        .await?;
    Ok(ApiResponse::success(invite))
}
