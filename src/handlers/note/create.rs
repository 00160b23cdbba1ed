// handlers/note/create.rs - POST /workspaces/:workspace_id/notes handler

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    Json,
};
use serde::Deserialize;

use crate::database::models::Note;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{CreateNote, NoteService};
use crate::state::AppState;

/**
 * Expected Input:
 * ```json
 * {
 *   "title": "string",      // Optional: blank becomes "Untitled"
 *   "content": "string",    // Optional
 *   "tags": ["string"]      // Optional: trimmed, deduplicated ignoring case
 * }
 * ```
 */
#[derive(Debug, Default, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

pub async fn note_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(workspace_id): Path<String>,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> ApiResult<Note> {
    let Json(body) = payload?;
    let note = NoteService::new(state.gateway().await?)
        .create_note(
            &workspace_id,
            &auth.user_id,
            CreateNote {
                title: body.title,
                content: body.content,
                tags: body.tags,
            },
        )
        .await?;
    Ok(ApiResponse::success(note))
}
