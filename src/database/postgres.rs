use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool, Postgres};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::database::gateway::{Gateway, Transaction};
use crate::database::manager::DatabaseError;
use crate::database::models::{
    AccessLevel, Invite, Membership, MembershipGrant, NewInvite, NewUser, Note, NoteFields, Task,
    TaskFields, TaskPriority, TaskStatus, User, UserInvite, UserWorkspace, Workspace,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Postgres-backed gateway over a shared connection pool
#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        if config.url.trim().is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }
        let redacted = redact_url(&config.url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;

        info!("Created database pool for: {}", redacted);
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        MIGRATOR.run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }
}

/// Strip the password so the URL can be logged
fn redact_url(raw: &str) -> Result<String, DatabaseError> {
    let mut url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
    if url.password().is_some() {
        url.set_password(Some("***"))
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
    }
    Ok(url.into())
}

#[async_trait]
impl Gateway for PgGateway {
    async fn begin(&self) -> Result<Box<dyn Transaction>, DatabaseError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTransaction { tx }))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

pub struct PgTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[derive(FromRow)]
struct UserRow {
    id: String,
    email: String,
    first_name: String,
    last_name: String,
    username: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            username: row.username,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct WorkspaceRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<WorkspaceRow> for Workspace {
    fn from(row: WorkspaceRow) -> Self {
        Workspace {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct UserWorkspaceRow {
    #[sqlx(flatten)]
    workspace: WorkspaceRow,
    access_type: String,
}

#[derive(FromRow)]
struct MembershipRow {
    workspace_id: Uuid,
    user_id: String,
    access_type: String,
    joined_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct InviteRow {
    id: Uuid,
    workspace_id: Uuid,
    invited_by: String,
    invitee_email: Option<String>,
    invitee_id: Option<String>,
    access_type: String,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct UserInviteRow {
    #[sqlx(flatten)]
    invite: InviteRow,
    workspace_name: String,
}

fn access_level(raw: &str) -> Result<AccessLevel, DatabaseError> {
    raw.parse::<AccessLevel>()
        .map_err(|e| DatabaseError::QueryError(e.to_string()))
}

impl TryFrom<MembershipRow> for Membership {
    type Error = DatabaseError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(Membership {
            workspace_id: row.workspace_id,
            user_id: row.user_id,
            access_type: access_level(&row.access_type)?,
            joined_at: row.joined_at,
        })
    }
}

impl TryFrom<InviteRow> for Invite {
    type Error = DatabaseError;

    fn try_from(row: InviteRow) -> Result<Self, Self::Error> {
        Ok(Invite {
            id: row.id,
            workspace_id: row.workspace_id,
            invited_by: row.invited_by,
            invitee_email: row.invitee_email,
            invitee_id: row.invitee_id,
            access_type: access_level(&row.access_type)?,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct NoteRow {
    id: Uuid,
    workspace_id: Uuid,
    author_id: String,
    title: String,
    content: String,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Note {
            id: row.id,
            workspace_id: row.workspace_id,
            author_id: row.author_id,
            title: row.title,
            content: row.content,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct TaskRow {
    id: Uuid,
    workspace_id: Uuid,
    title: String,
    description: Option<String>,
    assignee_id: Option<String>,
    status: String,
    priority: Option<String>,
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = DatabaseError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<TaskStatus>()
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        let priority = row
            .priority
            .as_deref()
            .map(str::parse::<TaskPriority>)
            .transpose()
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        Ok(Task {
            id: row.id,
            workspace_id: row.workspace_id,
            title: row.title,
            description: row.description,
            assignee_id: row.assignee_id,
            status,
            priority,
            due_date: row.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, email, first_name, last_name, username, created_at";
const WORKSPACE_COLUMNS: &str = "id, name, description, created_at, updated_at";
const INVITE_COLUMNS: &str =
    "id, workspace_id, invited_by, invitee_email, invitee_id, access_type, created_at";
const NOTE_COLUMNS: &str =
    "id, workspace_id, author_id, title, content, tags, created_at, updated_at";
const TASK_COLUMNS: &str = "id, workspace_id, title, description, assignee_id, status, priority, \
     due_date, created_at, updated_at";

#[async_trait]
impl Transaction for PgTransaction {
    async fn upsert_user(&mut self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (id, email, first_name, last_name, username)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO UPDATE SET
                 email = EXCLUDED.email,
                 first_name = EXCLUDED.first_name,
                 last_name = EXCLUDED.last_name,
                 username = EXCLUDED.username
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.username)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row.into())
    }

    async fn get_user(&mut self, id: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_user(&mut self, identifier: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE id = $1 OR lower(email) = lower($1)
             ORDER BY (id = $1) DESC
             LIMIT 1"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(identifier)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(User::from))
    }

    async fn insert_workspace(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Workspace, DatabaseError> {
        let sql = format!(
            "INSERT INTO workspaces (id, name, description) VALUES ($1, $2, $3)
             RETURNING {WORKSPACE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, WorkspaceRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(description)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row.into())
    }

    async fn get_workspace(&mut self, id: Uuid) -> Result<Option<Workspace>, DatabaseError> {
        let sql = format!("SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE id = $1");
        let row = sqlx::query_as::<_, WorkspaceRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(Workspace::from))
    }

    async fn list_user_workspaces(
        &mut self,
        user_id: &str,
    ) -> Result<Vec<UserWorkspace>, DatabaseError> {
        let rows = sqlx::query_as::<_, UserWorkspaceRow>(
            "SELECT w.id, w.name, w.description, w.created_at, w.updated_at, wu.access_type
             FROM workspaces w
             JOIN workspace_users wu ON wu.workspace_id = w.id
             WHERE wu.user_id = $1
             ORDER BY w.created_at, w.id",
        )
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(UserWorkspace {
                    access_type: access_level(&row.access_type)?,
                    workspace: row.workspace.into(),
                })
            })
            .collect()
    }

    async fn insert_membership(
        &mut self,
        workspace_id: Uuid,
        user_id: &str,
        access: AccessLevel,
    ) -> Result<MembershipGrant, DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO workspace_users (workspace_id, user_id, access_type)
             VALUES ($1, $2, $3)
             ON CONFLICT (workspace_id, user_id) DO NOTHING",
        )
        .bind(workspace_id)
        .bind(user_id)
        .bind(access.as_str())
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(MembershipGrant::Added);
        }

        let existing = self.get_membership(workspace_id, user_id).await?.ok_or_else(|| {
            DatabaseError::QueryError("membership conflict without existing row".to_string())
        })?;
        Ok(MembershipGrant::AlreadyMember(existing.access_type))
    }

    async fn get_membership(
        &mut self,
        workspace_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Membership>, DatabaseError> {
        let row = sqlx::query_as::<_, MembershipRow>(
            "SELECT workspace_id, user_id, access_type, joined_at
             FROM workspace_users WHERE workspace_id = $1 AND user_id = $2",
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(Membership::try_from).transpose()
    }

    async fn list_memberships(
        &mut self,
        workspace_id: Uuid,
    ) -> Result<Vec<Membership>, DatabaseError> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            "SELECT workspace_id, user_id, access_type, joined_at
             FROM workspace_users WHERE workspace_id = $1
             ORDER BY joined_at, user_id",
        )
        .bind(workspace_id)
        .fetch_all(&mut *self.tx)
        .await?;
        rows.into_iter().map(Membership::try_from).collect()
    }

    async fn insert_invite(&mut self, invite: NewInvite) -> Result<Invite, DatabaseError> {
        let sql = format!(
            "INSERT INTO workspace_invites
                 (id, workspace_id, invited_by, invitee_email, invitee_id, access_type)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {INVITE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, InviteRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(invite.workspace_id)
            .bind(&invite.invited_by)
            .bind(invite.invitee_email.as_deref())
            .bind(invite.invitee_id.as_deref())
            .bind(invite.access_type.as_str())
            .fetch_one(&mut *self.tx)
            .await?;
        row.try_into()
    }

    async fn get_invite(&mut self, id: Uuid) -> Result<Option<Invite>, DatabaseError> {
        let sql = format!("SELECT {INVITE_COLUMNS} FROM workspace_invites WHERE id = $1");
        let row = sqlx::query_as::<_, InviteRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(Invite::try_from).transpose()
    }

    async fn lock_invite(&mut self, id: Uuid) -> Result<Option<Invite>, DatabaseError> {
        // A concurrent consumer blocks here until the holder commits; once the row is
        // deleted the re-check finds nothing.
        let sql = format!(
            "SELECT {INVITE_COLUMNS} FROM workspace_invites WHERE id = $1 FOR UPDATE"
        );
        let row = sqlx::query_as::<_, InviteRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(Invite::try_from).transpose()
    }

    async fn list_invites_for_user(
        &mut self,
        user_id: &str,
        email: Option<&str>,
    ) -> Result<Vec<UserInvite>, DatabaseError> {
        let rows = sqlx::query_as::<_, UserInviteRow>(
            "SELECT i.id, i.workspace_id, i.invited_by, i.invitee_email, i.invitee_id,
                    i.access_type, i.created_at, w.name AS workspace_name
             FROM workspace_invites i
             JOIN workspaces w ON w.id = i.workspace_id
             WHERE i.invitee_id = $1
                OR (i.invitee_id IS NULL AND lower(i.invitee_email) = lower($2))
             ORDER BY i.created_at, i.id",
        )
        .bind(user_id)
        .bind(email)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(UserInvite {
                    invite: row.invite.try_into()?,
                    workspace_name: row.workspace_name,
                })
            })
            .collect()
    }

    async fn delete_invite(&mut self, id: Uuid) -> Result<Option<Invite>, DatabaseError> {
        let sql = format!("DELETE FROM workspace_invites WHERE id = $1 RETURNING {INVITE_COLUMNS}");
        let row = sqlx::query_as::<_, InviteRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(Invite::try_from).transpose()
    }

    async fn insert_note(
        &mut self,
        workspace_id: Uuid,
        author_id: &str,
        fields: NoteFields,
    ) -> Result<Note, DatabaseError> {
        let sql = format!(
            "INSERT INTO workspace_notes (id, workspace_id, author_id, title, content, tags)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {NOTE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(workspace_id)
            .bind(author_id)
            .bind(&fields.title)
            .bind(&fields.content)
            .bind(&fields.tags)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row.into())
    }

    async fn get_note(&mut self, workspace_id: Uuid, id: Uuid) -> Result<Option<Note>, DatabaseError> {
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM workspace_notes WHERE workspace_id = $1 AND id = $2"
        );
        let row = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(workspace_id)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(Note::from))
    }

    async fn list_notes(&mut self, workspace_id: Uuid) -> Result<Vec<Note>, DatabaseError> {
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM workspace_notes WHERE workspace_id = $1
             ORDER BY updated_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(workspace_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().map(Note::from).collect())
    }

    async fn update_note(
        &mut self,
        workspace_id: Uuid,
        id: Uuid,
        fields: NoteFields,
    ) -> Result<Option<Note>, DatabaseError> {
        let sql = format!(
            "UPDATE workspace_notes
             SET title = $3, content = $4, tags = $5, updated_at = now()
             WHERE workspace_id = $1 AND id = $2
             RETURNING {NOTE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(workspace_id)
            .bind(id)
            .bind(&fields.title)
            .bind(&fields.content)
            .bind(&fields.tags)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(Note::from))
    }

    async fn delete_note(&mut self, workspace_id: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM workspace_notes WHERE workspace_id = $1 AND id = $2")
            .bind(workspace_id)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_task(&mut self, workspace_id: Uuid, fields: TaskFields) -> Result<Task, DatabaseError> {
        let sql = format!(
            "INSERT INTO workspace_tasks
                 (id, workspace_id, title, description, assignee_id, status, priority, due_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {TASK_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(workspace_id)
            .bind(&fields.title)
            .bind(fields.description.as_deref())
            .bind(fields.assignee_id.as_deref())
            .bind(fields.status.as_str())
            .bind(fields.priority.map(|p| p.as_str()))
            .bind(fields.due_date)
            .fetch_one(&mut *self.tx)
            .await?;
        row.try_into()
    }

    async fn get_task(&mut self, workspace_id: Uuid, id: Uuid) -> Result<Option<Task>, DatabaseError> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM workspace_tasks WHERE workspace_id = $1 AND id = $2"
        );
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(workspace_id)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(Task::try_from).transpose()
    }

    async fn list_tasks(&mut self, workspace_id: Uuid) -> Result<Vec<Task>, DatabaseError> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM workspace_tasks WHERE workspace_id = $1
             ORDER BY created_at, id"
        );
        let rows = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(workspace_id)
            .fetch_all(&mut *self.tx)
            .await?;
        rows.into_iter().map(Task::try_from).collect()
    }

    async fn update_task(
        &mut self,
        workspace_id: Uuid,
        id: Uuid,
        fields: TaskFields,
    ) -> Result<Option<Task>, DatabaseError> {
        let sql = format!(
            "UPDATE workspace_tasks
             SET title = $3, description = $4, assignee_id = $5, status = $6,
                 priority = $7, due_date = $8, updated_at = now()
             WHERE workspace_id = $1 AND id = $2
             RETURNING {TASK_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(workspace_id)
            .bind(id)
            .bind(&fields.title)
            .bind(fields.description.as_deref())
            .bind(fields.assignee_id.as_deref())
            .bind(fields.status.as_str())
            .bind(fields.priority.map(|p| p.as_str()))
            .bind(fields.due_date)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(Task::try_from).transpose()
    }

    async fn delete_task(&mut self, workspace_id: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM workspace_tasks WHERE workspace_id = $1 AND id = $2")
            .bind(workspace_id)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.rollback().await?;
        debug!("Transaction rolled back");
        Ok(())
    }
}
