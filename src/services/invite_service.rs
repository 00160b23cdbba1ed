use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::database::gateway::{Gateway, Transaction};
use crate::database::models::{AccessLevel, Invite, Invitee, NewInvite, UserInvite};
use crate::services::error::{parse_id, required, DbResultExt, ServiceError};
use crate::services::membership_service::MembershipService;

/// Invite lifecycle: create, list, and the three consuming transitions
/// (accept, decline, delete). A row's existence is its pending state.
pub struct InviteService {
    gateway: Arc<dyn Gateway>,
}

impl InviteService {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Create a pending invite. `invitee` is an email address or a user id; a blank
    /// `access` defaults to member.
    pub async fn create_invite(
        &self,
        workspace_id: &str,
        inviter_id: &str,
        invitee: &str,
        access: Option<&str>,
    ) -> Result<Invite, ServiceError> {
        let workspace_id = parse_id(workspace_id, "workspace id")?;
        let inviter_id = required(inviter_id, "inviter id")?;
        let invitee = Invitee::parse(invitee).ok_or_else(|| ServiceError::invalid("missing invitee"))?;
        let access = AccessLevel::parse_or_default(access)
            .map_err(|e| ServiceError::invalid(e.to_string()))?;

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let result = Self::insert(tx.as_mut(), workspace_id, inviter_id, invitee, access).await;
        let invite = Self::finish(tx, result).await?;

        info!(
            invite_id = %invite.id, workspace_id = %invite.workspace_id,
            invited_by = %invite.invited_by, access = %invite.access_type,
            "Invite created"
        );
        Ok(invite)
    }

    async fn insert(
        tx: &mut dyn Transaction,
        workspace_id: Uuid,
        inviter_id: &str,
        invitee: Invitee,
        access: AccessLevel,
    ) -> Result<Invite, ServiceError> {
        tx.get_workspace(workspace_id)
            .await
            .db_context("failed to get workspace")?
            .ok_or(ServiceError::WorkspaceNotFound)?;

        let identifier = match &invitee {
            Invitee::Email(email) => email.clone(),
            Invitee::UserId(id) => id.clone(),
        };
        let known = tx.find_user(&identifier).await.db_context("failed to resolve invitee")?;
        let (invitee_email, invitee_id) = invitee.into_columns(known.as_ref());

        tx.insert_invite(NewInvite {
            workspace_id,
            invited_by: inviter_id.to_string(),
            invitee_email,
            invitee_id,
            access_type: access,
        })
        .await
        .db_context("failed to create invite")
    }

    /// Invites addressed to the invitee by id, or by email.
    ///
    /// `invitee` is a user id or an email address, the same forms `create_invite`
    /// accepts. A registered user is matched by id and by their registered email. An
    /// unregistered email address is matched against email-only invites.
    /// Never `None`; an empty list when nothing is pending.
    pub async fn list_invites(&self, invitee: &str) -> Result<Vec<UserInvite>, ServiceError> {
        let invitee = required(invitee, "user id")?;

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let (user_id, email) = match tx.find_user(invitee).await.db_context("failed to get user")? {
            Some(user) => (user.id, Some(user.email)),
            None => {
                let email = invitee.contains('@').then(|| invitee.to_ascii_lowercase());
                (invitee.to_string(), email)
            }
        };
        let invites = tx
            .list_invites_for_user(&user_id, email.as_deref())
            .await
            .db_context("failed to list invites")?;
        tx.commit().await.db_context("failed to commit transaction")?;
        Ok(invites)
    }

    /// Consume the invite and grant membership as one atomic unit.
    ///
    /// The invite row is locked for the duration of the transaction, so of two
    /// concurrent accepts only one can see it; the other gets [`ServiceError::InviteExpired`].
    /// If the user is already a member their existing access level is kept.
    pub async fn accept_invite(&self, invite_id: &str, user_id: &str) -> Result<Invite, ServiceError> {
        let invite_id = parse_id(invite_id, "invite id")?;
        let user_id = required(user_id, "user id")?;

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let result = Self::consume_for_member(tx.as_mut(), invite_id, user_id).await;
        let invite = Self::finish(tx, result).await?;

        info!(
            invite_id = %invite.id, workspace_id = %invite.workspace_id, user_id,
            access = %invite.access_type, "Invite accepted"
        );
        Ok(invite)
    }

    async fn consume_for_member(
        tx: &mut dyn Transaction,
        invite_id: Uuid,
        user_id: &str,
    ) -> Result<Invite, ServiceError> {
        let invite = tx
            .lock_invite(invite_id)
            .await
            .db_context("failed to accept invite")?
            .ok_or(ServiceError::InviteExpired)?;

        MembershipService::grant(tx, invite.workspace_id, user_id, invite.access_type).await?;

        tx.delete_invite(invite_id)
            .await
            .db_context("failed to delete invite after accepting")?
            .ok_or(ServiceError::InviteExpired)?;

        Ok(invite)
    }

    /// Consume the invite without granting anything. Only the addressee may decline.
    pub async fn decline_invite(&self, invite_id: &str, user_id: &str) -> Result<(), ServiceError> {
        let invite_id = parse_id(invite_id, "invite id")?;
        let user_id = required(user_id, "user id")?;

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let result = Self::consume_for_addressee(tx.as_mut(), invite_id, user_id).await;
        let invite = Self::finish(tx, result).await?;

        info!(invite_id = %invite.id, workspace_id = %invite.workspace_id, user_id, "Invite declined");
        Ok(())
    }

    async fn consume_for_addressee(
        tx: &mut dyn Transaction,
        invite_id: Uuid,
        user_id: &str,
    ) -> Result<Invite, ServiceError> {
        let invite = tx
            .lock_invite(invite_id)
            .await
            .db_context("failed to fetch invite")?
            .ok_or(ServiceError::InviteNotFound)?;

        let email = tx
            .get_user(user_id)
            .await
            .db_context("failed to get user")?
            .map(|u| u.email);
        if !invite.is_addressed_to(user_id, email.as_deref()) {
            return Err(ServiceError::forbidden("invite is addressed to another user"));
        }

        tx.delete_invite(invite_id)
            .await
            .db_context("failed to delete invite")?
            .ok_or(ServiceError::InviteNotFound)
    }

    /// Administrative removal, no addressee check. Deleting an absent invite is a no-op.
    pub async fn delete_invite(&self, invite_id: &str) -> Result<(), ServiceError> {
        let invite_id = parse_id(invite_id, "invite id")?;

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let deleted = tx.delete_invite(invite_id).await.db_context("failed to delete invite");
        let deleted = Self::finish(tx, deleted).await?;

        match deleted {
            Some(invite) => info!(invite_id = %invite.id, workspace_id = %invite.workspace_id, "Invite deleted"),
            None => debug!(%invite_id, "Delete for invite that is not pending"),
        }
        Ok(())
    }

    /// Commit on success, roll back on failure. Dropping the transaction would also
    /// roll back; rolling back here releases the connection before the error surfaces.
    async fn finish<T>(
        tx: Box<dyn Transaction>,
        result: Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        match result {
            Ok(value) => {
                tx.commit().await.db_context("failed to commit transaction")?;
                Ok(value)
            }
            Err(e) => {
                if matches!(e, ServiceError::InviteExpired) {
                    debug!("Invite already consumed, rolling back");
                }
                if let Err(rb) = tx.rollback().await {
                    warn!("Rollback failed: {}", rb);
                }
                Err(e)
            }
        }
    }
}
