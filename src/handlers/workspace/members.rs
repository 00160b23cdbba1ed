// handlers/workspace/members.rs - GET /workspaces/:workspace_id/members handler

use axum::extract::{Extension, Path, State};

use crate::database::models::Membership;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::WorkspaceService;
use crate::state::AppState;

pub async fn workspace_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(workspace_id): Path<String>,
) -> ApiResult<Vec<Membership>> {
    let members = WorkspaceService::new(state.gateway().await?)
        .list_members(&workspace_id, &auth.user_id)
        .await?;
    Ok(ApiResponse::success(members))
}
