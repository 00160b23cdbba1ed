use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    AccessLevel, Invite, Membership, MembershipGrant, NewInvite, NewUser, Note, NoteFields, Task,
    TaskFields, User, UserInvite, UserWorkspace, Workspace,
};

/// Transactional access to the workspace store.
///
/// Every read and write goes through a [`Transaction`]; single-statement operations
/// simply open one, run it and commit.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn Transaction>, DatabaseError>;

    /// Round-trip to the backing store
    async fn ping(&self) -> Result<(), DatabaseError>;

    fn backend(&self) -> &'static str;

    async fn close(&self) {}
}

/// One unit of work against the store.
///
/// Dropping a transaction without calling [`Transaction::commit`] rolls it back, so an
/// early return or a cancelled request never leaves partial writes behind.
#[async_trait]
pub trait Transaction: Send {
    // users
    async fn upsert_user(&mut self, user: NewUser) -> Result<User, DatabaseError>;
    async fn get_user(&mut self, id: &str) -> Result<Option<User>, DatabaseError>;
    /// Match by id, or by email case-insensitively
    async fn find_user(&mut self, identifier: &str) -> Result<Option<User>, DatabaseError>;

    // workspaces
    async fn insert_workspace(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Workspace, DatabaseError>;
    async fn get_workspace(&mut self, id: Uuid) -> Result<Option<Workspace>, DatabaseError>;
    async fn list_user_workspaces(&mut self, user_id: &str)
        -> Result<Vec<UserWorkspace>, DatabaseError>;

    // memberships
    /// Insert the (workspace, user) pair unless it already exists. An existing row keeps
    /// its access level.
    async fn insert_membership(
        &mut self,
        workspace_id: Uuid,
        user_id: &str,
        access: AccessLevel,
    ) -> Result<MembershipGrant, DatabaseError>;
    async fn get_membership(
        &mut self,
        workspace_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Membership>, DatabaseError>;
    async fn list_memberships(&mut self, workspace_id: Uuid)
        -> Result<Vec<Membership>, DatabaseError>;

    // invites
    async fn insert_invite(&mut self, invite: NewInvite) -> Result<Invite, DatabaseError>;
    async fn get_invite(&mut self, id: Uuid) -> Result<Option<Invite>, DatabaseError>;
    /// Read the invite and hold it against concurrent consumers until this
    /// transaction ends.
    async fn lock_invite(&mut self, id: Uuid) -> Result<Option<Invite>, DatabaseError>;
    async fn list_invites_for_user(
        &mut self,
        user_id: &str,
        email: Option<&str>,
    ) -> Result<Vec<UserInvite>, DatabaseError>;
    /// Returns the deleted row, `None` when nothing was there to delete.
    async fn delete_invite(&mut self, id: Uuid) -> Result<Option<Invite>, DatabaseError>;

    // notes, always addressed through their workspace
    async fn insert_note(
        &mut self,
        workspace_id: Uuid,
        author_id: &str,
        fields: NoteFields,
    ) -> Result<Note, DatabaseError>;
    async fn get_note(&mut self, workspace_id: Uuid, id: Uuid) -> Result<Option<Note>, DatabaseError>;
    /// Most recently updated first
    async fn list_notes(&mut self, workspace_id: Uuid) -> Result<Vec<Note>, DatabaseError>;
    async fn update_note(
        &mut self,
        workspace_id: Uuid,
        id: Uuid,
        fields: NoteFields,
    ) -> Result<Option<Note>, DatabaseError>;
    async fn delete_note(&mut self, workspace_id: Uuid, id: Uuid) -> Result<bool, DatabaseError>;

    // tasks
    async fn insert_task(&mut self, workspace_id: Uuid, fields: TaskFields) -> Result<Task, DatabaseError>;
    async fn get_task(&mut self, workspace_id: Uuid, id: Uuid) -> Result<Option<Task>, DatabaseError>;
    /// Oldest first
    async fn list_tasks(&mut self, workspace_id: Uuid) -> Result<Vec<Task>, DatabaseError>;
    /// Replace every column; `None` when the task does not exist in the workspace
    async fn update_task(
        &mut self,
        workspace_id: Uuid,
        id: Uuid,
        fields: TaskFields,
    ) -> Result<Option<Task>, DatabaseError>;
    async fn delete_task(&mut self, workspace_id: Uuid, id: Uuid) -> Result<bool, DatabaseError>;

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;
    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError>;
}
