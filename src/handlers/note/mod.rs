// handlers/note/mod.rs - Workspace note handlers
//
// All routes sit behind the identity middleware. The caller must be a member
// of the workspace and is recorded as the author of new notes.

pub mod create; // POST /workspaces/:workspace_id/notes
pub mod delete; // DELETE /workspaces/:workspace_id/notes/:note_id
pub mod list;   // GET /workspaces/:workspace_id/notes
pub mod show;   // GET /workspaces/:workspace_id/notes/:note_id
pub mod update; // PATCH /workspaces/:workspace_id/notes/:note_id

pub use create::note_create;
pub use delete::note_delete;
pub use list::note_list;
pub use show::note_show;
pub use update::note_update;
