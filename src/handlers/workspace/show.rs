// handlers/workspace/show.rs - GET /workspaces/:workspace_id handler

use axum::extract::{Extension, Path, State};

use crate::database::models::Workspace;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::WorkspaceService;
use crate::state::AppState;

pub async fn workspace_show(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(workspace_id): Path<String>,
) -> ApiResult<Workspace> {
    let workspace = WorkspaceService::new(state.gateway().await?)
        .get_workspace(&workspace_id, &auth.user_id)
        .await?;
    Ok(ApiResponse::success(workspace))
}
