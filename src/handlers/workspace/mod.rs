// handlers/workspace/mod.rs - Workspace handlers
//
// `show` and `members` sit behind the identity middleware; the caller must
// be a member of the workspace.

pub mod create;  // POST /workspaces
pub mod list;    // GET /users/:user_id/workspaces
pub mod members; // GET /workspaces/:workspace_id/members
pub mod show;    // GET /workspaces/:workspace_id

pub use create::workspace_create;
pub use list::workspace_list;
pub use members::workspace_members;
pub use show::workspace_show;
