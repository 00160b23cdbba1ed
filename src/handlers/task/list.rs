// handlers/task/list.rs - GET /workspaces/:workspace_id/tasks handler

use axum::extract::{Extension, Path, State};

use crate::database::models::Task;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::TaskService;
use crate::state::AppState;

pub async fn task_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(workspace_id): Path<String>,
) -> ApiResult<Vec<Task>> {
    let tasks = TaskService::new(state.gateway().await?)
        .list_tasks(&workspace_id, &auth.user_id)
        .await?;
    Ok(ApiResponse::success(tasks))
}
