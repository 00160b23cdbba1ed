// handlers/task/show.rs - GET /workspaces/:workspace_id/tasks/:task_id handler

use axum::extract::{Extension, Path, State};

use crate::database::models::Task;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::TaskService;
use crate::state::AppState;

pub async fn task_show(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((workspace_id, task_id)): Path<(String, String)>,
) -> ApiResult<Task> {
    let task = TaskService::new(state.gateway().await?)
        .get_task(&workspace_id, &task_id, &auth.user_id)
        .await?;
    Ok(ApiResponse::success(task))
}
