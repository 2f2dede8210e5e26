//! User lookup and mutations (`/users/{userId}`)

use callwire_core::{decode_json, Endpoint, RawResponse};
use callwire_domain::{wire_enum, RequestDescriptor, Result};
use serde::{Deserialize, Serialize};

wire_enum! {
    /// What `DELETE /users/{userId}` does to the account.
    pub enum DeleteAction {
        /// Remove the user from the account but keep their login.
        Disassociate => "disassociate",
        Delete => "delete",
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// `GET /users/{userId}`
#[derive(Debug, Clone)]
pub struct GetUser {
    pub user_id: String,
}

impl GetUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into() }
    }
}

impl Endpoint for GetUser {
    type Output = User;

    fn build_request(&self) -> Result<RequestDescriptor> {
        RequestDescriptor::get().segment("users").id_segment("user_id", &self.user_id).build()
    }

    fn decode_response(&self, response: &RawResponse) -> Result<User> {
        decode_json(response)
    }
}

/// Fields a PATCH may change; `None` fields are left out of the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// `PATCH /users/{userId}`; success is 204 with no body
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub user_id: String,
    pub patch: UserPatch,
}

impl UpdateUser {
    pub fn new(user_id: impl Into<String>, patch: UserPatch) -> Self {
        Self { user_id: user_id.into(), patch }
    }
}

impl Endpoint for UpdateUser {
    type Output = ();

    fn build_request(&self) -> Result<RequestDescriptor> {
        RequestDescriptor::patch()
            .segment("users")
            .id_segment("user_id", &self.user_id)
            .json_body(&self.patch)
            .build()
    }

    fn decode_response(&self, _response: &RawResponse) -> Result<()> {
        Ok(())
    }
}

/// `DELETE /users/{userId}?action=...`; success is 204 with no body
#[derive(Debug, Clone)]
pub struct DeleteUser {
    pub user_id: String,
    pub action: Option<DeleteAction>,
}

impl DeleteUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), action: None }
    }

    #[must_use]
    pub fn action(mut self, action: DeleteAction) -> Self {
        self.action = Some(action);
        self
    }
}

impl Endpoint for DeleteUser {
    type Output = ();

    fn build_request(&self) -> Result<RequestDescriptor> {
        RequestDescriptor::delete()
            .segment("users")
            .id_segment("user_id", &self.user_id)
            .with_query(|q| {
                q.append_enum_opt("action", self.action);
            })
            .build()
    }

    fn decode_response(&self, _response: &RawResponse) -> Result<()> {
        Ok(())
    }
}
