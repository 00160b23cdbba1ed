// handlers/invite/mod.rs - Invite lifecycle handlers
//
// Accept, decline and delete each consume the invite; a second attempt on
// the same id finds nothing pending.

pub mod accept;  // POST /invites/:invite_id/accept
pub mod create;  // POST /workspaces/:workspace_id/invites
pub mod decline; // POST /invites/:invite_id/decline
pub mod delete;  // DELETE /invites/:invite_id
pub mod list;    // GET /users/:user_id/invites

pub use accept::invite_accept;
pub use create::invite_create;
pub use decline::invite_decline;
pub use delete::invite_delete;
pub use list::invite_list;

use serde::Deserialize;

/// Body of accept and decline
#[derive(Debug, Default, Deserialize)]
pub struct InviteActionRequest {
    #[serde(default)]
    pub user_id: String,
}
