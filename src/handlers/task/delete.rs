// handlers/task/delete.rs - DELETE /workspaces/:workspace_id/tasks/:task_id handler

use axum::extract::{Extension, Path, State};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::TaskService;
use crate::state::AppState;

pub async fn task_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((workspace_id, task_id)): Path<(String, String)>,
) -> ApiResult<()> {
    TaskService::new(state.gateway().await?)
        .delete_task(&workspace_id, &task_id, &auth.user_id)
        .await?;
    Ok(ApiResponse::no_content())
}
