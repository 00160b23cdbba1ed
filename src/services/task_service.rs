use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::database::gateway::Gateway;
use crate::database::models::{Task, TaskFields, TaskInput};
use crate::services::error::{parse_id, DbResultExt, ServiceError};
use crate::services::workspace_service::WorkspaceService;

/// Workspace tasks, visible to members only
pub struct TaskService {
    gateway: Arc<dyn Gateway>,
}

fn validate(input: TaskInput) -> Result<TaskFields, ServiceError> {
    input
        .into_fields()
        .map_err(|e| ServiceError::invalid(e.to_string()))?
        .ok_or_else(|| ServiceError::invalid("missing task title"))
}

impl TaskService {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    async fn authorize(&self, workspace_id: &str, user_id: &str) -> Result<Uuid, ServiceError> {
        WorkspaceService::new(Arc::clone(&self.gateway))
            .authorize(workspace_id, user_id)
            .await
    }

    pub async fn create_task(&self, workspace_id: &str, user_id: &str, input: TaskInput) -> Result<Task, ServiceError> {
        let fields = validate(input)?;
        let workspace_id = self.authorize(workspace_id, user_id).await?;

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let task = tx
            .insert_task(workspace_id, fields)
            .await
            .db_context("failed to create task")?;
        tx.commit().await.db_context("failed to commit transaction")?;

        info!(task_id = %task.id, %workspace_id, user_id, status = %task.status, "Task created");
        Ok(task)
    }

    pub async fn list_tasks(&self, workspace_id: &str, user_id: &str) -> Result<Vec<Task>, ServiceError> {
        let workspace_id = self.authorize(workspace_id, user_id).await?;

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let tasks = tx
            .list_tasks(workspace_id)
            .await
            .db_context("failed to get workspace tasks")?;
        tx.commit().await.db_context("failed to commit transaction")?;
        Ok(tasks)
    }

    pub async fn get_task(&self, workspace_id: &str, task_id: &str, user_id: &str) -> Result<Task, ServiceError> {
        let task_id = parse_id(task_id, "task id")?;
        let workspace_id = self.authorize(workspace_id, user_id).await?;

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let task = tx
            .get_task(workspace_id, task_id)
            .await
            .db_context("failed to get task")?;
        tx.commit().await.db_context("failed to commit transaction")?;
        task.ok_or(ServiceError::TaskNotFound)
    }

    /// Full replacement: every field in `input` overwrites the stored value.
    pub async fn update_task(
        &self,
        workspace_id: &str,
        task_id: &str,
        user_id: &str,
        input: TaskInput,
    ) -> Result<Task, ServiceError> {
        let task_id = parse_id(task_id, "task id")?;
        let fields = validate(input)?;
        let workspace_id = self.authorize(workspace_id, user_id).await?;

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        let task = tx
            .update_task(workspace_id, task_id, fields)
            .await
            .db_context("failed to update task")?
            .ok_or(ServiceError::TaskNotFound)?;
        tx.commit().await.db_context("failed to commit transaction")?;

        info!(%task_id, %workspace_id, user_id, status = %task.status, "Task updated");
        Ok(task)
    }

    pub async fn delete_task(&self, workspace_id: &str, task_id: &str, user_id: &str) -> Result<(), ServiceError> {
        let task_id = parse_id(task_id, "task id")?;
        let workspace_id = self.authorize(workspace_id, user_id).await?;

        let mut tx = self.gateway.begin().await.db_context("failed to begin transaction")?;
        if !tx
            .delete_task(workspace_id, task_id)
            .await
            .db_context("failed to delete task")?
        {
            return Err(ServiceError::TaskNotFound);
        }
        tx.commit().await.db_context("failed to commit transaction")?;

        info!(%task_id, %workspace_id, user_id, "Task deleted");
        Ok(())
    }
}
