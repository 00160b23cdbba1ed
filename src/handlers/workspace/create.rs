// handlers/workspace/create.rs - POST /workspaces handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::database::models::Workspace;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::WorkspaceService;
use crate::state::AppState;

/**
 * Expected Input:
 * ```json
 * {
 *   "name": "string",         // Required
 *   "description": "string",  // Optional
 *   "owner_id": "string"      // Required: becomes the `owner` member
 * }
 * ```
 */
#[derive(Debug, Deserialize)]
pub struct CreateWorkspaceRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: String,
}

pub async fn workspace_create(
    State(state): State<AppState>,
    payload: Result<Json<CreateWorkspaceRequest>, JsonRejection>,
) -> ApiResult<Workspace> {
    let Json(body) = payload?;
    let service = WorkspaceService::new(state.gateway().await?);

    let workspace = service
        .create_workspace(&body.name, body.description.as_deref(), &body.owner_id)
        .await?;

    Ok(ApiResponse::success(workspace))
}
