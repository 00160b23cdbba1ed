pub mod access;
pub mod invite;
pub mod membership;
pub mod note;
pub mod task;
pub mod user;
pub mod workspace;

pub use access::{AccessLevel, UnknownAccessLevel};
pub use invite::{Invite, Invitee, NewInvite, UserInvite};
pub use membership::{Membership, MembershipGrant};
pub use note::{normalize_tags, Note, NoteChanges, NoteFields};
pub use task::{Task, TaskFields, TaskInput, TaskPriority, TaskStatus, UnknownTaskValue};
pub use user::{NewUser, User};
pub use workspace::{UserWorkspace, Workspace};
