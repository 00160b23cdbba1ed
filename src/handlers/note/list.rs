// handlers/note/list.rs - GET /workspaces/:workspace_id/notes handler

use axum::extract::{Extension, Path, State};

use crate::database::models::Note;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::NoteService;
use crate::state::AppState;

pub async fn note_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(workspace_id): Path<String>,
) -> ApiResult<Vec<Note>> {
    let notes = NoteService::new(state.gateway().await?)
        .list_notes(&workspace_id, &auth.user_id)
        .await?;
    Ok(ApiResponse::success(notes))
}
