pub mod error;
pub mod invite_service;
pub mod membership_service;
pub mod note_service;
pub mod task_service;
pub mod user_service;
pub mod workspace_service;

pub use error::{ErrorKind, ServiceError};
pub use invite_service::InviteService;
pub use membership_service::MembershipService;
pub use note_service::{CreateNote, NoteService};
pub use task_service::TaskService;
pub use user_service::UserService;
pub use workspace_service::WorkspaceService;
