// handlers/note/update.rs - PATCH /workspaces/:workspace_id/notes/:note_id handler

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    Json,
};

use crate::database::models::{Note, NoteChanges};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::NoteService;
use crate::state::AppState;

/// Absent fields are left unchanged; a blank title keeps the current one.
pub async fn note_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((workspace_id, note_id)): Path<(String, String)>,
    payload: Result<Json<NoteChanges>, JsonRejection>,
) -> ApiResult<Note> {
    let Json(changes) = payload?;
    let note = NoteService::new(state.gateway().await?)
        .update_note(&workspace_id, &note_id, &auth.user_id, changes)
        .await?;
    Ok(ApiResponse::success(note))
}
