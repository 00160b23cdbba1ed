// handlers/note/show.rs - GET /workspaces/:workspace_id/notes/:note_id handler

use axum::extract::{Extension, Path, State};

use crate::database::models::Note;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::NoteService;
use crate::state::AppState;

pub async fn note_show(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((workspace_id, note_id)): Path<(String, String)>,
) -> ApiResult<Note> {
    let note = NoteService::new(state.gateway().await?)
        .get_note(&workspace_id, &note_id, &auth.user_id)
        .await?;
    Ok(ApiResponse::success(note))
}
