use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, Notify, OwnedMutexGuard};
use uuid::Uuid;

use crate::database::gateway::{Gateway, Transaction};
use crate::database::manager::DatabaseError;
use crate::database::models::{
    AccessLevel, Invite, Membership, MembershipGrant, NewInvite, NewUser, Note, NoteFields, Task,
    TaskFields, User, UserInvite, UserWorkspace, Workspace,
};

/// Points at which a [`MemoryGateway`] transaction can be made to fail or to pause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    AddMember,
    DeleteInvite,
    Commit,
}

/// A transaction parked at a [`FaultPoint`]. It stays parked until [`Pause::release`]
/// or until its task is dropped.
#[derive(Debug, Default)]
pub struct Pause {
    reached: Notify,
    release: Notify,
}

impl Pause {
    /// Resolves once a transaction has arrived at the point
    pub async fn reached(&self) {
        self.reached.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[derive(Default)]
struct Hooks {
    faults: HashSet<FaultPoint>,
    pauses: HashMap<FaultPoint, Arc<Pause>>,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: HashMap<String, User>,
    workspaces: HashMap<Uuid, Workspace>,
    memberships: BTreeMap<(Uuid, String), Membership>,
    invites: HashMap<Uuid, Invite>,
    notes: HashMap<Uuid, Note>,
    tasks: HashMap<Uuid, Task>,
}

/// In-process store used by the `memory` backend and by tests.
///
/// A transaction holds the store lock from `begin` until it ends, so transactions are
/// fully serialized. Writes go to a staged copy that only replaces the committed state
/// on `commit`.
#[derive(Clone, Default)]
pub struct MemoryGateway {
    state: Arc<Mutex<MemoryState>>,
    hooks: Arc<StdMutex<Hooks>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot failure: the next transaction step reaching `point` returns an error.
    pub fn inject_fault(&self, point: FaultPoint) {
        if let Ok(mut hooks) = self.hooks.lock() {
            hooks.faults.insert(point);
        }
    }

    /// Arm a one-shot pause: the next transaction step reaching `point` waits there,
    /// holding the store lock, until released.
    pub fn pause_at(&self, point: FaultPoint) -> Arc<Pause> {
        let pause = Arc::new(Pause::default());
        if let Ok(mut hooks) = self.hooks.lock() {
            hooks.pauses.insert(point, Arc::clone(&pause));
        }
        pause
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn begin(&self) -> Result<Box<dyn Transaction>, DatabaseError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTransaction {
            guard,
            staged,
            hooks: Arc::clone(&self.hooks),
        }))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
    hooks: Arc<StdMutex<Hooks>>,
}

impl MemoryTransaction {
    async fn trip(&self, point: FaultPoint) -> Result<(), DatabaseError> {
        let (pause, fired) = match self.hooks.lock() {
            Ok(mut hooks) => (hooks.pauses.remove(&point), hooks.faults.remove(&point)),
            Err(_) => (None, false),
        };
        if let Some(pause) = pause {
            pause.reached.notify_one();
            pause.release.notified().await;
        }
        if fired {
            return Err(DatabaseError::QueryError(format!("injected fault at {:?}", point)));
        }
        Ok(())
    }

    fn workspace_name(&self, id: Uuid) -> Option<String> {
        self.staged.workspaces.get(&id).map(|w| w.name.clone())
    }

    fn require_workspace(&self, id: Uuid) -> Result<(), DatabaseError> {
        if !self.staged.workspaces.contains_key(&id) {
            return Err(DatabaseError::QueryError(format!(
                "workspace {} violates foreign key",
                id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn upsert_user(&mut self, user: NewUser) -> Result<User, DatabaseError> {
        let created_at = self
            .staged
            .users
            .get(&user.id)
            .map(|existing| existing.created_at)
            .unwrap_or_else(Utc::now);
        let record = User {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            created_at,
        };
        self.staged.users.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get_user(&mut self, id: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.staged.users.get(id).cloned())
    }

    async fn find_user(&mut self, identifier: &str) -> Result<Option<User>, DatabaseError> {
        if let Some(user) = self.staged.users.get(identifier) {
            return Ok(Some(user.clone()));
        }
        Ok(self
            .staged
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(identifier))
            .cloned())
    }

    async fn insert_workspace(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Workspace, DatabaseError> {
        let now = Utc::now();
        let workspace = Workspace {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        self.staged.workspaces.insert(workspace.id, workspace.clone());
        Ok(workspace)
    }

    async fn get_workspace(&mut self, id: Uuid) -> Result<Option<Workspace>, DatabaseError> {
        Ok(self.staged.workspaces.get(&id).cloned())
    }

    async fn list_user_workspaces(
        &mut self,
        user_id: &str,
    ) -> Result<Vec<UserWorkspace>, DatabaseError> {
        let mut rows: Vec<UserWorkspace> = self
            .staged
            .memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| {
                self.staged.workspaces.get(&m.workspace_id).map(|w| UserWorkspace {
                    workspace: w.clone(),
                    access_type: m.access_type,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            (a.workspace.created_at, a.workspace.id).cmp(&(b.workspace.created_at, b.workspace.id))
        });
        Ok(rows)
    }

    async fn insert_membership(
        &mut self,
        workspace_id: Uuid,
        user_id: &str,
        access: AccessLevel,
    ) -> Result<MembershipGrant, DatabaseError> {
        self.trip(FaultPoint::AddMember).await?;
        self.require_workspace(workspace_id)?;

        let key = (workspace_id, user_id.to_string());
        if let Some(existing) = self.staged.memberships.get(&key) {
            return Ok(MembershipGrant::AlreadyMember(existing.access_type));
        }
        self.staged.memberships.insert(
            key,
            Membership {
                workspace_id,
                user_id: user_id.to_string(),
                access_type: access,
                joined_at: Utc::now(),
            },
        );
        Ok(MembershipGrant::Added)
    }

    async fn get_membership(
        &mut self,
        workspace_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Membership>, DatabaseError> {
        Ok(self
            .staged
            .memberships
            .get(&(workspace_id, user_id.to_string()))
            .cloned())
    }

    async fn list_memberships(
        &mut self,
        workspace_id: Uuid,
    ) -> Result<Vec<Membership>, DatabaseError> {
        let mut rows: Vec<Membership> = self
            .staged
            .memberships
            .values()
            .filter(|m| m.workspace_id == workspace_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.joined_at, &a.user_id).cmp(&(b.joined_at, &b.user_id)));
        Ok(rows)
    }

    async fn insert_invite(&mut self, invite: NewInvite) -> Result<Invite, DatabaseError> {
        self.require_workspace(invite.workspace_id)?;
        if invite.invitee_email.is_none() && invite.invitee_id.is_none() {
            return Err(DatabaseError::QueryError("invite has no invitee".to_string()));
        }

        let record = Invite {
            id: Uuid::new_v4(),
            workspace_id: invite.workspace_id,
            invited_by: invite.invited_by,
            invitee_email: invite.invitee_email,
            invitee_id: invite.invitee_id,
            access_type: invite.access_type,
            created_at: Utc::now(),
        };
        self.staged.invites.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_invite(&mut self, id: Uuid) -> Result<Option<Invite>, DatabaseError> {
        Ok(self.staged.invites.get(&id).cloned())
    }

    async fn lock_invite(&mut self, id: Uuid) -> Result<Option<Invite>, DatabaseError> {
        // The store lock is already held for the whole transaction.
        self.get_invite(id).await
    }

    async fn list_invites_for_user(
        &mut self,
        user_id: &str,
        email: Option<&str>,
    ) -> Result<Vec<UserInvite>, DatabaseError> {
        let mut rows: Vec<UserInvite> = self
            .staged
            .invites
            .values()
            .filter(|invite| invite.is_addressed_to(user_id, email))
            .filter_map(|invite| {
                self.workspace_name(invite.workspace_id).map(|workspace_name| UserInvite {
                    invite: invite.clone(),
                    workspace_name,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            (a.invite.created_at, a.invite.id).cmp(&(b.invite.created_at, b.invite.id))
        });
        Ok(rows)
    }

    async fn delete_invite(&mut self, id: Uuid) -> Result<Option<Invite>, DatabaseError> {
        self.trip(FaultPoint::DeleteInvite).await?;
        Ok(self.staged.invites.remove(&id))
    }

    async fn insert_note(
        &mut self,
        workspace_id: Uuid,
        author_id: &str,
        fields: NoteFields,
    ) -> Result<Note, DatabaseError> {
        self.require_workspace(workspace_id)?;
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            workspace_id,
            author_id: author_id.to_string(),
            title: fields.title,
            content: fields.content,
            tags: fields.tags,
            created_at: now,
            updated_at: now,
        };
        self.staged.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn get_note(&mut self, workspace_id: Uuid, id: Uuid) -> Result<Option<Note>, DatabaseError> {
        Ok(self
            .staged
            .notes
            .get(&id)
            .filter(|n| n.workspace_id == workspace_id)
            .cloned())
    }

    async fn list_notes(&mut self, workspace_id: Uuid) -> Result<Vec<Note>, DatabaseError> {
        let mut rows: Vec<Note> = self
            .staged
            .notes
            .values()
            .filter(|n| n.workspace_id == workspace_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.updated_at, b.id).cmp(&(a.updated_at, a.id)));
        Ok(rows)
    }

    async fn update_note(
        &mut self,
        workspace_id: Uuid,
        id: Uuid,
        fields: NoteFields,
    ) -> Result<Option<Note>, DatabaseError> {
        let Some(note) = self
            .staged
            .notes
            .get_mut(&id)
            .filter(|n| n.workspace_id == workspace_id)
        else {
            return Ok(None);
        };
        note.title = fields.title;
        note.content = fields.content;
        note.tags = fields.tags;
        note.updated_at = Utc::now();
        Ok(Some(note.clone()))
    }

    async fn delete_note(&mut self, workspace_id: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        if self.get_note(workspace_id, id).await?.is_none() {
            return Ok(false);
        }
        Ok(self.staged.notes.remove(&id).is_some())
    }

    async fn insert_task(&mut self, workspace_id: Uuid, fields: TaskFields) -> Result<Task, DatabaseError> {
        self.require_workspace(workspace_id)?;
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            workspace_id,
            title: fields.title,
            description: fields.description,
            assignee_id: fields.assignee_id,
            status: fields.status,
            priority: fields.priority,
            due_date: fields.due_date,
            created_at: now,
            updated_at: now,
        };
        self.staged.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get_task(&mut self, workspace_id: Uuid, id: Uuid) -> Result<Option<Task>, DatabaseError> {
        Ok(self
            .staged
            .tasks
            .get(&id)
            .filter(|t| t.workspace_id == workspace_id)
            .cloned())
    }

    async fn list_tasks(&mut self, workspace_id: Uuid) -> Result<Vec<Task>, DatabaseError> {
        let mut rows: Vec<Task> = self
            .staged
            .tasks
            .values()
            .filter(|t| t.workspace_id == workspace_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(rows)
    }

    async fn update_task(
        &mut self,
        workspace_id: Uuid,
        id: Uuid,
        fields: TaskFields,
    ) -> Result<Option<Task>, DatabaseError> {
        let Some(task) = self
            .staged
            .tasks
            .get_mut(&id)
            .filter(|t| t.workspace_id == workspace_id)
        else {
            return Ok(None);
        };
        task.title = fields.title;
        task.description = fields.description;
        task.assignee_id = fields.assignee_id;
        task.status = fields.status;
        task.priority = fields.priority;
        task.due_date = fields.due_date;
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete_task(&mut self, workspace_id: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        if self.get_task(workspace_id, id).await?.is_none() {
            return Ok(false);
        }
        Ok(self.staged.tasks.remove(&id).is_some())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.trip(FaultPoint::Commit).await?;
        let MemoryTransaction { mut guard, staged, .. } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        Ok(())
    }
}
