use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::access::AccessLevel;

/// Row of `workspace_users`, unique per (workspace_id, user_id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub workspace_id: Uuid,
    pub user_id: String,
    pub access_type: AccessLevel,
    pub joined_at: DateTime<Utc>,
}

/// Outcome of an insert-if-absent on the membership table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipGrant {
    Added,
    /// The pair already existed; its access level was left untouched.
    AlreadyMember(AccessLevel),
}
