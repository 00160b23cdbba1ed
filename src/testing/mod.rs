use std::sync::Arc;
use uuid::Uuid;

use crate::database::gateway::Gateway;
use crate::database::memory::MemoryGateway;
use crate::database::models::{AccessLevel, Invite, Membership, NewUser, User, Workspace};
use crate::services::{InviteService, UserService, WorkspaceService};

/// Test fixture over a fresh in-memory store.
/// Workspaces created through it are owned by [`TestContext::owner`].
pub struct TestContext {
    gateway: MemoryGateway,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            gateway: MemoryGateway::new(),
        }
    }

    pub fn gateway(&self) -> Arc<dyn Gateway> {
        Arc::new(self.gateway.clone())
    }

    /// Handle for fault injection
    pub fn memory(&self) -> &MemoryGateway {
        &self.gateway
    }

    pub fn owner(&self) -> &'static str {
        "U1"
    }

    pub async fn workspace(&self, name: &str) -> Workspace {
        WorkspaceService::new(self.gateway())
            .create_workspace(name, None, self.owner())
            .await
            .expect("create test workspace")
    }

    pub async fn user(&self, id: &str, email: &str) -> User {
        UserService::new(self.gateway())
            .create_user(NewUser {
                id: id.to_string(),
                email: email.to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                username: format!("user_{}", id.to_ascii_lowercase()),
            })
            .await
            .expect("create test user")
    }

    pub async fn invite(&self, workspace: &Workspace, invitee: &str, access: AccessLevel) -> Invite {
        InviteService::new(self.gateway())
            .create_invite(&workspace.id.to_string(), self.owner(), invitee, Some(access.as_str()))
            .await
            .expect("create test invite")
    }

    pub async fn is_pending(&self, invite_id: Uuid) -> bool {
        let mut tx = self.gateway.begin().await.expect("begin");
        tx.get_invite(invite_id).await.expect("get invite").is_some()
    }

    pub async fn membership(&self, workspace_id: Uuid, user_id: &str) -> Option<Membership> {
        let mut tx = self.gateway.begin().await.expect("begin");
        tx.get_membership(workspace_id, user_id).await.expect("get membership")
    }

    pub async fn members(&self, workspace_id: Uuid) -> Vec<Membership> {
        let mut tx = self.gateway.begin().await.expect("begin");
        tx.list_memberships(workspace_id).await.expect("list memberships")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
