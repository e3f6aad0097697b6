/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! The three step auth handshake.
//!
//! 1. [`HandshakeCoordinator::request_grant`] asks the service for a grant and builds the
//!    signed URL the user must visit.
//! 2. The application sends the user to [`GrantHandle::approval_url`] and waits for them to
//!    approve the request. This can take minutes and can span restarts of the application,
//!    which is why [`GrantHandle`] and [`HandshakeState`] are plain serializable values.
//! 3. [`HandshakeCoordinator::exchange_grant_for_credential`] trades the grant for a
//!    [`Credential`].
//!
//! A persisted credential can later be re-checked with
//! [`HandshakeCoordinator::check_credential`], and a short code the user typed in can be
//! turned into a credential with [`HandshakeCoordinator::upgrade_short_credential`].

use crate::rest::client::Shared;
use crate::rest::correlation::Notifier;
use crate::rest::errors::FlickrError;
use crate::rest::parsers::from_content;
use crate::rest::{
    CallOutcome, Completions, CorrelationId, Credential, GrantHandle, Params, PermissionLevel,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const GET_FROB: &str = "flickr.auth.getFrob";
const GET_TOKEN: &str = "flickr.auth.getToken";
const CHECK_TOKEN: &str = "flickr.auth.checkToken";
const GET_FULL_TOKEN: &str = "flickr.auth.getFullToken";

/// Where completions of handshake calls are delivered
#[derive(Debug)]
pub struct HandshakeCompletions {
    /// Completions of [`HandshakeCoordinator::request_grant`]
    pub grants: Completions<GrantHandle>,
    /// Completions of every call that yields a [`Credential`]
    pub credentials: Completions<Credential>,
}

/// Runs the handshake calls. None of them need an existing credential.
///
/// Every method returns a [`CorrelationId`] straight away, or an `InvalidArgument` error
/// when the input is unusable, in which case nothing is sent. The result of the call
/// arrives later on [`HandshakeCompletions`] tagged with the returned id.
#[derive(Debug, Clone)]
pub struct HandshakeCoordinator {
    shared: Arc<Shared>,
    grants: Notifier<GrantHandle>,
    credentials: Notifier<Credential>,
}

impl HandshakeCoordinator {
    pub(crate) fn new(shared: Arc<Shared>) -> (Self, HandshakeCompletions) {
        let (grants, grant_rx) = Notifier::channel();
        let (credentials, credential_rx) = Notifier::channel();
        (
            Self {
                shared,
                grants,
                credentials,
            },
            HandshakeCompletions {
                grants: grant_rx,
                credentials: credential_rx,
            },
        )
    }

    /// Requests a grant for `desired` permission.
    ///
    /// Completes with a [`GrantHandle`] whose approval URL carries the API key, the
    /// permission and the grant, signed so they cannot be altered.
    pub fn request_grant(&self, desired: PermissionLevel) -> Result<CorrelationId, FlickrError> {
        let secret = self.secret()?;
        let api_key = self.shared.creds.api_key().to_string();
        let shared = self.shared.clone();

        self.grants.dispatch(&self.shared.correlator, async move {
            let mut params = Params::new();
            params.push("api_key", api_key.as_str()).push("method", GET_FROB);
            let doc = shared.transport.sign_and_send(Some(&secret), &params).await?;

            let grant = FrobResponse::deserialize(&doc)?.frob;
            if grant.is_empty() {
                return Err(FlickrError::ResponseMissing("frob is empty".to_string()));
            }

            let mut url_params = Params::new();
            url_params
                .push("api_key", api_key)
                .push("perms", desired.as_str())
                .push("frob", grant.as_str());
            let approval_url = shared.transport.build_approval_url(&secret, &url_params)?;
            log::debug!("grant obtained for {desired} permission");
            Ok::<_, FlickrError>(GrantHandle::new(grant, approval_url))
        })
    }

    /// Exchanges an approved grant for a credential
    pub fn exchange_grant_for_credential(&self, grant: &str) -> Result<CorrelationId, FlickrError> {
        if grant.trim().is_empty() {
            return Err(FlickrError::invalid_argument("grant is empty"));
        }
        self.issue_credential(GET_TOKEN, "frob", grant.to_string())
    }

    /// Asks the service whether a credential token is still good. Completes with the
    /// credential as the service currently sees it.
    pub fn check_credential(&self, token: &str) -> Result<CorrelationId, FlickrError> {
        if token.trim().is_empty() {
            return Err(FlickrError::invalid_argument("credential token is empty"));
        }
        self.issue_credential(CHECK_TOKEN, "auth_token", token.to_string())
    }

    /// Turns a short code the user copied by hand (such as `123-456-789`) into a full
    /// credential. Dashes and whitespace in the code are ignored.
    pub fn upgrade_short_credential(&self, short_code: &str) -> Result<CorrelationId, FlickrError> {
        let code: String = short_code
            .chars()
            .filter(|c| *c != '-' && !c.is_whitespace())
            .collect();
        if code.is_empty() {
            return Err(FlickrError::invalid_argument("short code is empty"));
        }
        self.issue_credential(GET_FULL_TOKEN, "mini_token", code)
    }

    fn issue_credential(
        &self,
        method: &'static str,
        name: &'static str,
        value: String,
    ) -> Result<CorrelationId, FlickrError> {
        let secret = self.secret()?;
        let api_key = self.shared.creds.api_key().to_string();
        let shared = self.shared.clone();

        self.credentials.dispatch(&self.shared.correlator, async move {
            let mut params = Params::new();
            params
                .push("api_key", api_key)
                .push("method", method)
                .push(name, value);
            let doc = shared.transport.sign_and_send(Some(&secret), &params).await?;
            let credential = Credential::from_auth_document(&doc)?;
            log::debug!("{method} issued credential: {credential}");
            Ok::<_, FlickrError>(credential)
        })
    }

    // Every handshake call is signed
    fn secret(&self) -> Result<String, FlickrError> {
        self.shared
            .creds
            .shared_secret()
            .map(str::to_string)
            .ok_or_else(|| FlickrError::invalid_argument("the handshake needs a shared secret"))
    }
}

/// Progress of one handshake.
///
/// `Unstarted → GrantRequested → Approved → CredentialIssued`, with `Failed` reachable from
/// any step before a credential is issued. Approval happens outside the application, so
/// [`approved`](HandshakeState::approved) is called by the application once the user says
/// they are done.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum HandshakeState {
    #[default]
    Unstarted,
    GrantRequested(GrantHandle),
    Approved(GrantHandle),
    CredentialIssued(Credential),
    Failed(String),
}

impl HandshakeState {
    pub fn grant_received(self, handle: GrantHandle) -> Result<Self, FlickrError> {
        match self {
            HandshakeState::Unstarted => Ok(HandshakeState::GrantRequested(handle)),
            other => Err(other.invalid("receive a grant")),
        }
    }

    pub fn approved(self) -> Result<Self, FlickrError> {
        match self {
            HandshakeState::GrantRequested(handle) => Ok(HandshakeState::Approved(handle)),
            other => Err(other.invalid("approve")),
        }
    }

    pub fn credential_issued(self, credential: Credential) -> Result<Self, FlickrError> {
        match self {
            HandshakeState::Approved(_) => Ok(HandshakeState::CredentialIssued(credential)),
            other => Err(other.invalid("issue a credential")),
        }
    }

    pub fn failed(self, reason: impl Into<String>) -> Result<Self, FlickrError> {
        match self {
            HandshakeState::Unstarted
            | HandshakeState::GrantRequested(_)
            | HandshakeState::Approved(_) => Ok(HandshakeState::Failed(reason.into())),
            other => Err(other.invalid("fail")),
        }
    }

    /// Applies the outcome of a [`HandshakeCoordinator::request_grant`] call
    pub fn on_grant_outcome(self, outcome: CallOutcome<GrantHandle>) -> Result<Self, FlickrError> {
        match outcome {
            CallOutcome::Success(handle) => self.grant_received(handle),
            CallOutcome::Failure(e) => self.failed(e.to_string()),
        }
    }

    /// Applies the outcome of a [`HandshakeCoordinator::exchange_grant_for_credential`] call
    pub fn on_credential_outcome(
        self,
        outcome: CallOutcome<Credential>,
    ) -> Result<Self, FlickrError> {
        match outcome {
            CallOutcome::Success(credential) => self.credential_issued(credential),
            CallOutcome::Failure(e) => self.failed(e.to_string()),
        }
    }

    pub fn grant(&self) -> Option<&GrantHandle> {
        match self {
            HandshakeState::GrantRequested(h) | HandshakeState::Approved(h) => Some(h),
            _ => None,
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        match self {
            HandshakeState::CredentialIssued(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            HandshakeState::CredentialIssued(_) | HandshakeState::Failed(_)
        )
    }

    fn name(&self) -> &'static str {
        match self {
            HandshakeState::Unstarted => "unstarted",
            HandshakeState::GrantRequested(_) => "grant requested",
            HandshakeState::Approved(_) => "approved",
            HandshakeState::CredentialIssued(_) => "credential issued",
            HandshakeState::Failed(_) => "failed",
        }
    }

    fn invalid(&self, action: &str) -> FlickrError {
        FlickrError::invalid_argument(format!("cannot {action} when handshake is {}", self.name()))
    }
}

// Expected response from a getFrob request
#[derive(Deserialize, Debug)]
struct FrobResponse {
    #[serde(deserialize_with = "from_content")]
    frob: String,
}
