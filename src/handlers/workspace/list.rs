// handlers/workspace/list.rs - GET /users/:user_id/workspaces handler

use axum::extract::{Path, State};

use crate::database::models::UserWorkspace;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::WorkspaceService;
use crate::state::AppState;

/// Workspaces the user belongs to, each with the user's access level
pub async fn workspace_list(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<UserWorkspace>> {
    let workspaces = WorkspaceService::new(state.gateway().await?)
        .list_user_workspaces(&user_id)
        .await?;
    Ok(ApiResponse::success(workspaces))
}
