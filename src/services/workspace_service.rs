use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::gateway::{Gateway, Transaction};
use crate::database::models::{AccessLevel, Membership, UserWorkspace, Workspace};
use crate::services::error::{parse_id, required, DbResultExt, ServiceError};
use crate::services::membership_service::MembershipService;

pub struct WorkspaceService {
    gateway: Arc<dyn Gateway>,
}

impl WorkspaceService {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Create the workspace and its owner membership in one transaction
    pub async fn create_workspace(
        &self,
        name: &str,
        description: Option<&str>,
        owner_id: &str,
    ) -> Result<Workspace, ServiceError> {
        let name = required(name, "workspace name")?;
        let owner_id = required(owner_id, "owner id")?;
        let description = description.map(str::trim).filter(|d| !d.is_empty());

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let workspace = match Self::insert_with_owner(tx.as_mut(), name, description, owner_id).await {
            Ok(workspace) => workspace,
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    warn!("Rollback after failed workspace create: {}", rb);
                }
                return Err(e);
            }
        };
        tx.commit().await.db_context("failed to commit transaction")?;

        info!(workspace_id = %workspace.id, owner_id, "Workspace created");
        Ok(workspace)
    }

    async fn insert_with_owner(
        tx: &mut dyn Transaction,
        name: &str,
        description: Option<&str>,
        owner_id: &str,
    ) -> Result<Workspace, ServiceError> {
        let workspace = tx
            .insert_workspace(name, description)
            .await
            .db_context("failed to create workspace")?;
        MembershipService::grant(tx, workspace.id, owner_id, AccessLevel::Owner).await?;
        Ok(workspace)
    }

    /// Fetch a workspace the caller belongs to
    pub async fn get_workspace(&self, workspace_id: &str, user_id: &str) -> Result<Workspace, ServiceError> {
        let workspace_id = parse_id(workspace_id, "workspace id")?;
        let workspace = self.lookup(workspace_id).await?;
        self.require_member(workspace_id, user_id).await?;
        Ok(workspace)
    }

    /// Resolve a workspace reference without any membership check
    pub async fn lookup(&self, workspace_id: Uuid) -> Result<Workspace, ServiceError> {
        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let workspace = tx
            .get_workspace(workspace_id)
            .await
            .db_context("failed to get workspace")?;
        tx.commit().await.db_context("failed to commit transaction")?;
        workspace.ok_or(ServiceError::WorkspaceNotFound)
    }

    pub async fn list_user_workspaces(&self, user_id: &str) -> Result<Vec<UserWorkspace>, ServiceError> {
        let user_id = required(user_id, "user id")?;
        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let workspaces = tx
            .list_user_workspaces(user_id)
            .await
            .db_context("failed to list user workspaces")?;
        tx.commit().await.db_context("failed to commit transaction")?;
        Ok(workspaces)
    }

    pub async fn list_members(&self, workspace_id: &str, user_id: &str) -> Result<Vec<Membership>, ServiceError> {
        let workspace_id = self.authorize(workspace_id, user_id).await?;

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let members = tx
            .list_memberships(workspace_id)
            .await
            .db_context("failed to list workspace members")?;
        tx.commit().await.db_context("failed to commit transaction")?;
        Ok(members)
    }

    /// Gate for workspace-scoped resources: the workspace must exist (404) and the
    /// caller must belong to it (403).
    pub(crate) async fn authorize(&self, workspace_id: &str, user_id: &str) -> Result<Uuid, ServiceError> {
        let workspace_id = parse_id(workspace_id, "workspace id")?;
        self.lookup(workspace_id).await?;
        self.require_member(workspace_id, user_id).await?;
        Ok(workspace_id)
    }

    async fn require_member(&self, workspace_id: Uuid, user_id: &str) -> Result<(), ServiceError> {
        let user_id = required(user_id, "user id")?;
        let memberships = MembershipService::new(Arc::clone(&self.gateway));
        if !memberships.is_member(workspace_id, user_id).await? {
            return Err(ServiceError::forbidden("not a member of this workspace"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestContext;

    #[tokio::test]
    async fn create_adds_owner_membership() {
        let ctx = TestContext::new();
        let service = WorkspaceService::new(ctx.gateway());

        let workspace = service.create_workspace("Team", Some("  "), "U1").await.unwrap();

        assert_eq!(workspace.description, None);
        let members = ctx.members(workspace.id).await;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, "U1");
        assert_eq!(members[0].access_type, AccessLevel::Owner);
    }

    #[tokio::test]
    async fn create_requires_name_and_owner() {
        let ctx = TestContext::new();
        let service = WorkspaceService::new(ctx.gateway());
        assert!(matches!(service.create_workspace("", None, "U1").await, Err(ServiceError::InvalidInput(_))));
        assert!(matches!(service.create_workspace("Team", None, "").await, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn create_rolls_back_when_owner_grant_fails() {
        let ctx = TestContext::new();
        let service = WorkspaceService::new(ctx.gateway());

        ctx.memory().inject_fault(crate::database::memory::FaultPoint::AddMember);
        assert!(service.create_workspace("Team", None, "U1").await.is_err());
        assert!(service.list_user_workspaces("U1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_requires_membership() {
        let ctx = TestContext::new();
        let workspace = ctx.workspace("Team").await;
        let service = WorkspaceService::new(ctx.gateway());
        let id = workspace.id.to_string();

        assert_eq!(service.get_workspace(&id, ctx.owner()).await.unwrap(), workspace);
        assert!(matches!(service.get_workspace(&id, "U9").await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(service.get_workspace("bad", "U1").await, Err(ServiceError::InvalidInput(_))));
        assert!(matches!(
            service.get_workspace(&Uuid::new_v4().to_string(), "U1").await,
            Err(ServiceError::WorkspaceNotFound)
        ));
    }

    #[tokio::test]
    async fn lists_workspaces_with_access_level() {
        let ctx = TestContext::new();
        let first = ctx.workspace("One").await;
        ctx.workspace("Two").await;
        let service = WorkspaceService::new(ctx.gateway());

        let listed = service.list_user_workspaces(ctx.owner()).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|w| w.access_type == AccessLevel::Owner));
        assert!(listed.iter().any(|w| w.workspace.id == first.id));
        assert!(service.list_user_workspaces("U9").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lists_members_for_members_only() {
        let ctx = TestContext::new();
        let workspace = ctx.workspace("Team").await;
        let service = WorkspaceService::new(ctx.gateway());
        let id = workspace.id.to_string();

        assert_eq!(service.list_members(&id, ctx.owner()).await.unwrap().len(), 1);
        assert!(matches!(service.list_members(&id, "U9").await, Err(ServiceError::Forbidden(_))));
    }
}
