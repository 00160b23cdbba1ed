// handlers/note/delete.rs - DELETE /workspaces/:workspace_id/notes/:note_id handler

use axum::extract::{Extension, Path, State};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::NoteService;
use crate::state::AppState;

pub async fn note_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((workspace_id, note_id)): Path<(String, String)>,
) -> ApiResult<()> {
    NoteService::new(state.gateway().await?)
        .delete_note(&workspace_id, &note_id, &auth.user_id)
        .await?;
    Ok(ApiResponse::no_content())
}
