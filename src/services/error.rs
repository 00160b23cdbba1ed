use thiserror::Error;
use uuid::Uuid;

use crate::database::manager::DatabaseError;

/// Domain errors raised by the services. The HTTP layer matches on [`ErrorKind`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("workspace not found")]
    WorkspaceNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("invite not found")]
    InviteNotFound,

    #[error("note not found")]
    NoteNotFound,

    #[error("task not found")]
    TaskNotFound,

    /// The invite row is gone: already consumed, or another transaction won the race.
    #[error("invite expired or invalid")]
    InviteExpired,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("database unavailable")]
    Unavailable,

    #[error("{context}: {source}")]
    Persistence {
        context: &'static str,
        #[source]
        source: DatabaseError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Forbidden,
    Gone,
    Unavailable,
    Internal,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::InvalidInput(_) => ErrorKind::InvalidInput,
            ServiceError::WorkspaceNotFound
            | ServiceError::UserNotFound
            | ServiceError::InviteNotFound
            | ServiceError::NoteNotFound
            | ServiceError::TaskNotFound => ErrorKind::NotFound,
            ServiceError::InviteExpired => ErrorKind::Gone,
            ServiceError::Forbidden(_) => ErrorKind::Forbidden,
            ServiceError::Unavailable => ErrorKind::Unavailable,
            ServiceError::Persistence { .. } => ErrorKind::Internal,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ServiceError::InvalidInput(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }
}

/// Attach context to a persistence failure
pub trait DbResultExt<T> {
    fn db_context(self, context: &'static str) -> Result<T, ServiceError>;
}

impl<T> DbResultExt<T> for Result<T, DatabaseError> {
    fn db_context(self, context: &'static str) -> Result<T, ServiceError> {
        self.map_err(|source| match source {
            DatabaseError::NotConnected => ServiceError::Unavailable,
            source => ServiceError::Persistence { context, source },
        })
    }
}

/// Reject blank required fields, returning the trimmed value
pub fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, ServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::invalid(format!("missing {}", field)));
    }
    Ok(value)
}

pub fn parse_id(value: &str, field: &str) -> Result<Uuid, ServiceError> {
    let value = required(value, field)?;
    Uuid::parse_str(value).map_err(|_| ServiceError::invalid(format!("invalid {}", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_cover_taxonomy() {
        assert_eq!(ServiceError::invalid("x").kind(), ErrorKind::InvalidInput);
        assert_eq!(ServiceError::WorkspaceNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(ServiceError::TaskNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(ServiceError::InviteExpired.kind(), ErrorKind::Gone);
        assert_eq!(ServiceError::forbidden("x").kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn not_connected_maps_to_unavailable() {
        let err = Err::<(), _>(DatabaseError::NotConnected).db_context("failed").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);

        let err = Err::<(), _>(DatabaseError::QueryError("boom".into()))
            .db_context("failed to accept invite")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.to_string(), "failed to accept invite: Query error: boom");
    }

    #[test]
    fn validates_ids() {
        assert!(matches!(parse_id("  ", "invite id"), Err(ServiceError::InvalidInput(m)) if m == "missing invite id"));
        assert!(matches!(parse_id("abc", "invite id"), Err(ServiceError::InvalidInput(m)) if m == "invalid invite id"));
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "invite id").unwrap(), id);
    }
}
