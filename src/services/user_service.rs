use std::sync::Arc;
use tracing::info;

use crate::database::gateway::Gateway;
use crate::database::models::{NewUser, User};
use crate::services::error::{required, DbResultExt, ServiceError};

/// Registry of users synced from the identity provider
pub struct UserService {
    gateway: Arc<dyn Gateway>,
}

impl UserService {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Insert or refresh a user. Every field is required.
    pub async fn create_user(&self, user: NewUser) -> Result<User, ServiceError> {
        let user = NewUser {
            id: required(&user.id, "user id")?.to_string(),
            email: required(&user.email, "email")?.to_ascii_lowercase(),
            first_name: required(&user.first_name, "first name")?.to_string(),
            last_name: required(&user.last_name, "last name")?.to_string(),
            username: required(&user.username, "username")?.to_string(),
        };

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let user = tx.upsert_user(user).await.db_context("failed to create user")?;
        tx.commit().await.db_context("failed to commit transaction")?;

        info!(user_id = %user.id, "User synced");
        Ok(user)
    }

    pub async fn get_user(&self, id: &str) -> Result<User, ServiceError> {
        let id = required(id, "user id")?;
        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let user = tx.get_user(id).await.db_context("failed to get user")?;
        tx.commit().await.db_context("failed to commit transaction")?;
        user.ok_or(ServiceError::UserNotFound)
    }
}
