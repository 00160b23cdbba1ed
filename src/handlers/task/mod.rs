// handlers/task/mod.rs - Workspace task handlers
//
// Create and update share one body shape; update replaces every field.

pub mod create; // POST /workspaces/:workspace_id/tasks
pub mod delete; // DELETE /workspaces/:workspace_id/tasks/:task_id
pub mod list;   // GET /workspaces/:workspace_id/tasks
pub mod show;   // GET /workspaces/:workspace_id/tasks/:task_id
pub mod update; // PUT /workspaces/:workspace_id/tasks/:task_id

pub use create::task_create;
pub use delete::task_delete;
pub use list::task_list;
pub use show::task_show;
pub use update::task_update;
