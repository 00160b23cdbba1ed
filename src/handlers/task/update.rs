// handlers/task/update.rs - PUT /workspaces/:workspace_id/tasks/:task_id handler

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    Json,
};

use crate::database::models::{Task, TaskInput};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::TaskService;
use crate::state::AppState;

pub async fn task_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((workspace_id, task_id)): Path<(String, String)>,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> ApiResult<Task> {
    let Json(input) = payload?;
    let task = TaskService::new(state.gateway().await?)
        .update_task(&workspace_id, &task_id, &auth.user_id, input)
        .await?;
    Ok(ApiResponse::success(task))
}
