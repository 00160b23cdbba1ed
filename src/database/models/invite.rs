use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::access::AccessLevel;
use super::user::User;

/// A pending grant of workspace access. Existence of the row is the pending state;
/// accept, decline and delete all consume it by deleting the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub invited_by: String,
    pub invitee_email: Option<String>,
    pub invitee_id: Option<String>,
    pub access_type: AccessLevel,
    pub created_at: DateTime<Utc>,
}

impl Invite {
    /// Whether this invite is addressed to the given caller, by id or by registered email.
    /// An invite carrying an invitee id only matches that id.
    pub fn is_addressed_to(&self, user_id: &str, user_email: Option<&str>) -> bool {
        match (&self.invitee_id, &self.invitee_email, user_email) {
            (Some(id), _, _) => id == user_id,
            (None, Some(email), Some(caller)) => email.eq_ignore_ascii_case(caller),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewInvite {
    pub workspace_id: Uuid,
    pub invited_by: String,
    pub invitee_email: Option<String>,
    pub invitee_id: Option<String>,
    pub access_type: AccessLevel,
}

/// An invite as listed for its recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInvite {
    #[serde(flatten)]
    pub invite: Invite,
    pub workspace_name: String,
}

/// How the inviter addressed the recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invitee {
    Email(String),
    UserId(String),
}

impl Invitee {
    /// Anything containing `@` is treated as an email address.
    pub fn parse(identifier: &str) -> Option<Self> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            None
        } else if identifier.contains('@') {
            Some(Invitee::Email(identifier.to_ascii_lowercase()))
        } else {
            Some(Invitee::UserId(identifier.to_string()))
        }
    }

    /// Fill the invite's addressing columns, preferring a resolved registry user.
    pub fn into_columns(self, known: Option<&User>) -> (Option<String>, Option<String>) {
        match (known, self) {
            (Some(user), _) => (Some(user.email.clone()), Some(user.id.clone())),
            (None, Invitee::Email(email)) => (Some(email), None),
            (None, Invitee::UserId(id)) => (None, Some(id)),
        }
    }
}
