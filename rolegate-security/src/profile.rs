use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User profile returned by the Auth0 `tokeninfo` / `userinfo` endpoints.
///
/// Unknown fields are ignored and missing ones take their default value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    #[serde(rename = "clientID")]
    pub client_id: String,
    pub global_client_id: String,
    pub user_id: String,
    pub email_verified: bool,
    pub email: String,
    pub name: String,
    pub picture: String,
    pub nickname: String,
    pub locale: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub app_metadata: AppMetadata,
}

/// The part of the profile the user can't edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    pub roles: Vec<String>,
}

impl Profile {
    /// Roles granted in `app_metadata`, in provider order.
    pub fn roles(&self) -> &[String] {
        &self.app_metadata.roles
    }

    /// A profile without roles is never authorized for a role-gated route.
    pub fn has_roles(&self) -> bool {
        !self.app_metadata.roles.is_empty()
    }

    /// `true` if at least one of the profile's roles is in `required`.
    pub fn contains_any_role(&self, required: &RoleSet) -> bool {
        self.roles().iter().any(|r| required.contains(r))
    }
}

/// Set of role names required by a route, built once per layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(HashSet<String>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, role: &str) -> bool {
        self.0.contains(role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for RoleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        RoleSet(iter.into_iter().map(Into::into).collect())
    }
}
