// handlers/invite/create.rs - POST /workspaces/:workspace_id/invites handler

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Deserialize;

use crate::database::models::Invite;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::InviteService;
use crate::state::AppState;

/**
 * Expected Input:
 * ```json
 * {
 *   "invited_by": "string",       // Required: inviter user id
 *   "identifier": "string",       // Email or user id of the invitee
 *   "invitee_email": "string",    // Alternative to `identifier`
 *   "invitee_user_id": "string",  // Alternative to `identifier`
 *   "access_type": "admin"        // Optional: owner | admin | member (default)
 * }
 * ```
 */
#[derive(Debug, Deserialize)]
pub struct CreateInviteRequest {
    #[serde(default)]
    pub invited_by: String,
    pub identifier: Option<String>,
    pub invitee_email: Option<String>,
    pub invitee_user_id: Option<String>,
    pub access_type: Option<String>,
}

impl CreateInviteRequest {
    /// First non-blank of `identifier`, `invitee_user_id`, `invitee_email`
    fn invitee(&self) -> &str {
        [&self.identifier, &self.invitee_user_id, &self.invitee_email]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }
}

pub async fn invite_create(
    State(state): State<AppState>,
    Path(workspace_id): Path<String>,
    payload: Result<Json<CreateInviteRequest>, JsonRejection>,
) -> ApiResult<Invite> {
    let Json(body) = payload?;
    let service = InviteService::new(state.gateway().await?);

    let invite = service
        .create_invite(
            &workspace_id,
            &body.invited_by,
            body.invitee(),
            body.access_type.as_deref(),
        )
        .await?;

    Ok(ApiResponse::success(invite))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(identifier: Option<&str>, user_id: Option<&str>, email: Option<&str>) -> CreateInviteRequest {
        CreateInviteRequest {
            invited_by: "U1".into(),
            identifier: identifier.map(String::from),
            invitee_email: email.map(String::from),
            invitee_user_id: user_id.map(String::from),
            access_type: None,
        }
    }

    #[test]
    fn invitee_prefers_identifier_then_user_id() {
        assert_eq!(request(Some("x@y.z"), Some("U2"), None).invitee(), "x@y.z");
        assert_eq!(request(Some(" "), Some("U2"), Some("x@y.z")).invitee(), "U2");
        assert_eq!(request(None, None, Some("x@y.z")).invitee(), "x@y.z");
        assert_eq!(request(None, None, None).invitee(), "");
    }
}
