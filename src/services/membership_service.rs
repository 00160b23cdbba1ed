use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::gateway::{Gateway, Transaction};
use crate::database::models::{AccessLevel, Membership, MembershipGrant};
use crate::services::error::{parse_id, required, DbResultExt, ServiceError};

/// Workspace membership: who belongs to a workspace and at which level
pub struct MembershipService {
    gateway: Arc<dyn Gateway>,
}

impl MembershipService {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Idempotent add. A repeat add for an existing member leaves the stored level as is.
    pub async fn add_member(
        &self,
        workspace_id: &str,
        user_id: &str,
        access: AccessLevel,
    ) -> Result<MembershipGrant, ServiceError> {
        let workspace_id = parse_id(workspace_id, "workspace id")?;
        let user_id = required(user_id, "user id")?;

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let grant = match Self::add_checked(tx.as_mut(), workspace_id, user_id, access).await {
            Ok(grant) => grant,
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    warn!("Rollback after failed add member: {}", rb);
                }
                return Err(e);
            }
        };
        tx.commit().await.db_context("failed to commit transaction")?;
        Ok(grant)
    }

    async fn add_checked(
        tx: &mut dyn Transaction,
        workspace_id: Uuid,
        user_id: &str,
        access: AccessLevel,
    ) -> Result<MembershipGrant, ServiceError> {
        tx.get_workspace(workspace_id)
            .await
            .db_context("failed to get workspace")?
            .ok_or(ServiceError::WorkspaceNotFound)?;
        Self::grant(tx, workspace_id, user_id, access).await
    }

    /// Grant membership inside a caller-owned transaction
    pub(crate) async fn grant(
        tx: &mut dyn Transaction,
        workspace_id: Uuid,
        user_id: &str,
        access: AccessLevel,
    ) -> Result<MembershipGrant, ServiceError> {
        let user_id = required(user_id, "user id")?;
        let grant = tx
            .insert_membership(workspace_id, user_id, access)
            .await
            .db_context("failed to add user to workspace")?;

        if let MembershipGrant::AlreadyMember(existing) = grant {
            debug!(
                %workspace_id, user_id, %existing, requested = %access,
                "User already a member, keeping existing access level"
            );
        }
        Ok(grant)
    }

    pub async fn is_member(&self, workspace_id: Uuid, user_id: &str) -> Result<bool, ServiceError> {
        Ok(self.membership(workspace_id, user_id).await?.is_some())
    }

    pub async fn membership(
        &self,
        workspace_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Membership>, ServiceError> {
        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let membership = tx
            .get_membership(workspace_id, user_id)
            .await
            .db_context("failed to get membership")?;
        tx.commit().await.db_context("failed to commit transaction")?;
        Ok(membership)
    }
}
