use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::database::gateway::Gateway;
use crate::database::models::{Note, NoteChanges, NoteFields};
use crate::services::error::{parse_id, DbResultExt, ServiceError};
use crate::services::workspace_service::WorkspaceService;

/// Notes inside a workspace. Every operation requires the caller to be a member.
pub struct NoteService {
    gateway: Arc<dyn Gateway>,
}

/// Values for a new note. The author is the caller.
#[derive(Debug, Clone, Default)]
pub struct CreateNote {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl NoteService {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    async fn authorize(&self, workspace_id: &str, user_id: &str) -> Result<Uuid, ServiceError> {
        WorkspaceService::new(Arc::clone(&self.gateway))
            .authorize(workspace_id, user_id)
            .await
    }

    pub async fn create_note(
        &self,
        workspace_id: &str,
        user_id: &str,
        input: CreateNote,
    ) -> Result<Note, ServiceError> {
        let workspace_id = self.authorize(workspace_id, user_id).await?;
        let fields = NoteFields::new(&input.title, input.content, &input.tags);

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let note = tx
            .insert_note(workspace_id, user_id.trim(), fields)
            .await
            .db_context("failed to create note")?;
        tx.commit().await.db_context("failed to commit transaction")?;

        info!(note_id = %note.id, %workspace_id, author_id = %note.author_id, "Note created");
        Ok(note)
    }

    pub async fn get_note(&self, workspace_id: &str, note_id: &str, user_id: &str) -> Result<Note, ServiceError> {
        let note_id = parse_id(note_id, "note id")?;
        let workspace_id = self.authorize(workspace_id, user_id).await?;

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let note = tx
            .get_note(workspace_id, note_id)
            .await
            .db_context("failed to get note")?;
        tx.commit().await.db_context("failed to commit transaction")?;
        note.ok_or(ServiceError::NoteNotFound)
    }

    pub async fn list_notes(&self, workspace_id: &str, user_id: &str) -> Result<Vec<Note>, ServiceError> {
        let workspace_id = self.authorize(workspace_id, user_id).await?;

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let notes = tx
            .list_notes(workspace_id)
            .await
            .db_context("failed to list notes")?;
        tx.commit().await.db_context("failed to commit transaction")?;
        Ok(notes)
    }

    /// Apply a partial update. The read and the write share one transaction.
    pub async fn update_note(
        &self,
        workspace_id: &str,
        note_id: &str,
        user_id: &str,
        changes: NoteChanges,
    ) -> Result<Note, ServiceError> {
        let note_id = parse_id(note_id, "note id")?;
        let workspace_id = self.authorize(workspace_id, user_id).await?;

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let current = tx
            .get_note(workspace_id, note_id)
            .await
            .db_context("failed to get note")?
            .ok_or(ServiceError::NoteNotFound)?;
        let updated = tx
            .update_note(workspace_id, note_id, NoteFields::merged(&current, changes))
            .await
            .db_context("failed to update note")?
            .ok_or(ServiceError::NoteNotFound)?;
        tx.commit().await.db_context("failed to commit transaction")?;

        info!(%note_id, %workspace_id, user_id, "Note updated");
        Ok(updated)
    }

    /// Deleting a note that is not there is [`ServiceError::NoteNotFound`].
    pub async fn delete_note(&self, workspace_id: &str, note_id: &str, user_id: &str) -> Result<(), ServiceError> {
        let note_id = parse_id(note_id, "note id")?;
        let workspace_id = self.authorize(workspace_id, user_id).await?;

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let deleted = tx
            .delete_note(workspace_id, note_id)
            .await
            .db_context("failed to delete note")?;
        if !deleted {
            return Err(ServiceError::NoteNotFound);
        }
        tx.commit().await.db_context("failed to commit transaction")?;

        info!(%note_id, %workspace_id, user_id, "Note deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestContext;

    fn draft(title: &str, tags: &[&str]) -> CreateNote {
        CreateNote {
            title: title.to_string(),
            content: "body".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn create_normalizes_title_and_tags() {
        let ctx = TestContext::new();
        let workspace = ctx.workspace("W1").await;
        let service = NoteService::new(ctx.gateway());

        let note = service
            .create_note(&workspace.id.to_string(), ctx.owner(), draft("  ", &["Ops", " ops ", ""]))
            .await
            .unwrap();

        assert_eq!(note.title, "Untitled");
        assert_eq!(note.tags, vec!["Ops".to_string()]);
        assert_eq!(note.author_id, ctx.owner());
        assert_eq!(note.workspace_id, workspace.id);
    }

    #[tokio::test]
    async fn non_members_cannot_touch_notes() {
        let ctx = TestContext::new();
        let workspace = ctx.workspace("W1").await;
        let service = NoteService::new(ctx.gateway());
        let id = workspace.id.to_string();
        let note = service.create_note(&id, ctx.owner(), draft("Plan", &[])).await.unwrap();

        let err = service.create_note(&id, "U9", draft("Plan", &[])).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        let err = service.get_note(&id, &note.id.to_string(), "U9").await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        let err = service.list_notes(&Uuid::new_v4().to_string(), ctx.owner()).await.unwrap_err();
        assert!(matches!(err, ServiceError::WorkspaceNotFound));
    }

    #[tokio::test]
    async fn invited_member_can_write_notes() {
        let ctx = TestContext::new();
        let workspace = ctx.workspace("W1").await;
        let invite = ctx.invite(&workspace, "U2", crate::database::models::AccessLevel::Member).await;
        crate::services::InviteService::new(ctx.gateway())
            .accept_invite(&invite.id.to_string(), "U2")
            .await
            .unwrap();

        let service = NoteService::new(ctx.gateway());
        let note = service
            .create_note(&workspace.id.to_string(), "U2", draft("Mine", &[]))
            .await
            .unwrap();
        assert_eq!(note.author_id, "U2");
    }

    #[tokio::test]
    async fn update_merges_and_delete_removes() {
        let ctx = TestContext::new();
        let workspace = ctx.workspace("W1").await;
        let service = NoteService::new(ctx.gateway());
        let id = workspace.id.to_string();
        let note = service.create_note(&id, ctx.owner(), draft("Plan", &["a"])).await.unwrap();
        let note_id = note.id.to_string();

        let updated = service
            .update_note(
                &id,
                &note_id,
                ctx.owner(),
                NoteChanges {
                    title: Some(" ".into()),
                    content: Some("rewritten".into()),
                    tags: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Plan");
        assert_eq!(updated.content, "rewritten");
        assert_eq!(updated.tags, vec!["a".to_string()]);
        assert!(updated.updated_at >= note.updated_at);

        assert_eq!(service.list_notes(&id, ctx.owner()).await.unwrap().len(), 1);
        service.delete_note(&id, &note_id, ctx.owner()).await.unwrap();
        assert!(service.list_notes(&id, ctx.owner()).await.unwrap().is_empty());

        let err = service.delete_note(&id, &note_id, ctx.owner()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NoteNotFound));
        let err = service
            .update_note(&id, &note_id, ctx.owner(), NoteChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NoteNotFound));
    }

    #[tokio::test]
    async fn note_from_another_workspace_is_not_found() {
        let ctx = TestContext::new();
        let first = ctx.workspace("W1").await;
        let second = ctx.workspace("W2").await;
        let service = NoteService::new(ctx.gateway());
        let note = service
            .create_note(&first.id.to_string(), ctx.owner(), draft("Plan", &[]))
            .await
            .unwrap();

        let err = service
            .get_note(&second.id.to_string(), &note.id.to_string(), ctx.owner())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NoteNotFound));
        assert!(matches!(
            service.get_note(&first.id.to_string(), "nope", ctx.owner()).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }
}
