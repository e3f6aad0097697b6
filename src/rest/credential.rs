/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::FlickrError;
use crate::rest::parsers::from_content;
use crate::rest::PermissionLevel;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use url::Url;

/// Result of the first handshake step.
///
/// The grant value cannot authorize calls by itself. Send the user to
/// [`approval_url`](GrantHandle::approval_url) and, once they have approved, exchange the
/// grant with
/// [`HandshakeCoordinator::exchange_grant_for_credential`](crate::rest::HandshakeCoordinator::exchange_grant_for_credential).
/// There is no local expiry; a grant the service has expired fails at exchange time.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GrantHandle {
    grant: String,
    approval_url: Url,
}

impl GrantHandle {
    pub(crate) fn new(grant: String, approval_url: Url) -> Self {
        Self {
            grant,
            approval_url,
        }
    }

    pub fn grant(&self) -> &str {
        &self.grant
    }

    pub fn approval_url(&self) -> &Url {
        &self.approval_url
    }
}

/// Durable credential that authorizes calls on behalf of a user.
///
/// Immutable once built. The permission it was issued with never changes; getting a
/// higher one means running the handshake again. Two credentials are the same credential
/// when their tokens match, whatever the other fields say.
///
/// Serialize it to persist it between runs. Loading a persisted credential re-checks the
/// token and permission.
///
/// Only the handshake issues new credentials:
///
/// ```compile_fail
/// use flickr::rest::{Credential, PermissionLevel};
/// let forged = Credential::new("token", PermissionLevel::Delete, "1@N01", "user", "");
/// ```
#[derive(Serialize, Deserialize, Clone)]
#[serde(try_from = "PersistedCredential")]
pub struct Credential {
    token: String,
    permission: PermissionLevel,
    user_id: String,
    user_name: String,
    full_name: String,
}

impl Credential {
    pub(crate) fn new(
        token: impl Into<String>,
        permission: PermissionLevel,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Result<Self, FlickrError> {
        let token = token.into();
        if token.is_empty() {
            return Err(FlickrError::invalid_argument("credential token is empty"));
        }
        let user_id = user_id.into();
        if user_id.is_empty() {
            return Err(FlickrError::invalid_argument("credential user id is empty"));
        }
        Ok(Self {
            token,
            permission,
            user_id,
            user_name: user_name.into(),
            full_name: full_name.into(),
        })
    }

    /// Builds a credential from an `auth` reply document.
    ///
    /// Used by every call that issues or re-issues a credential. Missing fields, an empty
    /// token or an unknown permission fail the whole parse.
    pub(crate) fn from_auth_document(doc: &serde_json::Value) -> Result<Self, FlickrError> {
        let resp = AuthResponse::deserialize(doc)?;
        let auth = resp.auth;
        let permission = PermissionLevel::parse(&auth.perms)
            .map_err(|e| FlickrError::ResponseMissing(format!("auth.perms: {e}")))?;
        Credential::new(
            auth.token,
            permission,
            auth.user.nsid,
            auth.user.username,
            auth.user.fullname,
        )
        .map_err(|e| FlickrError::ResponseMissing(format!("auth: {e}")))
    }

    /// Token attached to authenticated calls
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn permission(&self) -> PermissionLevel {
        self.permission
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}
impl Eq for Credential {}

impl Hash for Credential {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.token.hash(state);
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"xxx")
            .field("permission", &self.permission)
            .field("user_id", &self.user_id)
            .field("user_name", &self.user_name)
            .field("full_name", &self.full_name)
            .finish()
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "user: {}, permission: {}", self.user_name, self.permission)
    }
}

// Shape a credential is loaded from; goes through Credential::new so the checks apply
#[derive(Deserialize)]
struct PersistedCredential {
    token: String,
    permission: PermissionLevel,
    user_id: String,
    user_name: String,
    #[serde(default)]
    full_name: String,
}

impl TryFrom<PersistedCredential> for Credential {
    type Error = FlickrError;

    fn try_from(p: PersistedCredential) -> Result<Self, Self::Error> {
        Credential::new(p.token, p.permission, p.user_id, p.user_name, p.full_name)
    }
}

// Expected response from the auth.getToken/checkToken/getFullToken methods
#[derive(Deserialize, Debug)]
struct AuthResponse {
    #[serde(rename = "auth")]
    auth: AuthBody,
}

#[derive(Deserialize, Debug)]
struct AuthBody {
    #[serde(deserialize_with = "from_content")]
    token: String,

    #[serde(deserialize_with = "from_content")]
    perms: String,

    user: AuthUser,
}

#[derive(Deserialize, Debug)]
struct AuthUser {
    nsid: String,

    username: String,

    #[serde(default)]
    fullname: String,
}
