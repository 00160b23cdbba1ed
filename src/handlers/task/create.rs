// handlers/task/create.rs - POST /workspaces/:workspace_id/tasks handler

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    Json,
};

use crate::database::models::{Task, TaskInput};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::TaskService;
use crate::state::AppState;

/**
 * Expected Input:
 * ```json
 * {
 *   "title": "string",          // Required
 *   "description": "string",    // Optional
 *   "assignee_id": "string",    // Optional
 *   "status": "todo",           // Optional: todo (default) | in_progress | done
 *   "priority": "high",         // Optional: low | medium | high
 *   "due_date": "2026-11-02T09:00:00Z"  // Optional, RFC 3339
 * }
 * ```
 */
pub async fn task_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(workspace_id): Path<String>,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> ApiResult<Task> {
    let Json(input) = payload?;
    let task = TaskService::new(state.gateway().await?)
        .create_task(&workspace_id, &auth.user_id, input)
        .await?;
    Ok(ApiResponse::success(task))
}
