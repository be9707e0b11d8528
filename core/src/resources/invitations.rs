//! Organization invitations.

use serde::Serialize;

use crate::client::{RequestOptions, TogglClient};
use crate::error::Result;
use crate::fields::FieldMap;
use crate::types::InvitationResponse;

#[derive(Debug, Clone, Default, Serialize)]
pub struct InvitationBody {
    pub emails: Option<Vec<String>>,
    pub workspaces: Option<Vec<i64>>,
}

pub(crate) const INVITATION_FIELDS: FieldMap =
    FieldMap::new(&[("emails", "emails"), ("workspaces", "workspaces")]);

/// Organization invitations.
#[derive(Debug, Clone, Copy)]
pub struct Invitations<'a> {
    toggl: &'a TogglClient,
}

impl<'a> Invitations<'a> {
    pub(crate) fn new(toggl: &'a TogglClient) -> Self {
        Self { toggl }
    }

    /// Invite users by email into an organization's workspaces.
    pub async fn create(
        &self,
        organization_id: i64,
        body: &InvitationBody,
    ) -> Result<InvitationResponse> {
        let body = INVITATION_FIELDS.to_body(body)?;
        self.toggl
            .request_as(
                &format!("organizations/{organization_id}/invitations"),
                RequestOptions::post().body(body),
            )
            .await
    }
}
