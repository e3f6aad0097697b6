/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::FlickrError;
use crate::rest::signing;
use crate::rest::Endpoints;
use async_trait::async_trait;
use num_enum::TryFromPrimitive;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Name of the signature parameter added by the signing step
pub const API_SIG: &str = "api_sig";

/// Parameters of one request.
///
/// A parameter pushed with no value is left out of the outbound request entirely; it is
/// never sent as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, Option<String>)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.push((name.into(), Some(value.into())));
        self
    }

    /// Adds a parameter that is only sent when `value` is `Some`
    pub fn push_opt<V: Into<String>>(&mut self, name: impl Into<String>, value: Option<V>) -> &mut Self {
        self.entries.push((name.into(), value.map(Into::into)));
        self
    }

    /// First value sent for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.present().find(|(k, _)| *k == name).map(|(_, v)| v)
    }

    /// True if `name` was pushed at all, with or without a value
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    /// The name/value pairs that go on the wire, in insertion order
    pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub(crate) fn extend(&mut self, other: Params) {
        self.entries.extend(other.entries);
    }
}

/// Signs, sends and unwraps calls to the service.
///
/// `sign_and_send` resolves exactly once, to either the reply document or an error. A
/// reply the service flagged as failed must come back as an error, not a document.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the call. Signs `params` when a secret is given.
    async fn sign_and_send(
        &self,
        secret: Option<&str>,
        params: &Params,
    ) -> Result<Value, FlickrError>;

    /// Builds the signed URL a user is sent to for approving a grant.
    ///
    /// Must be deterministic so that any change to a parameter breaks the signature.
    fn build_approval_url(&self, secret: &str, params: &Params) -> Result<Url, FlickrError>;
}

/// [`Transport`] that talks to the REST endpoint over HTTPS with JSON replies.
#[derive(Default, Clone)]
pub struct HttpTransport {
    endpoints: Endpoints,
    https_client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport for the public service endpoints
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoints(endpoints: Endpoints) -> Self {
        Self {
            endpoints,
            https_client: reqwest::Client::new(),
        }
    }

    /// Creates a transport whose requests fail once `timeout` has passed
    pub fn with_timeout(endpoints: Endpoints, timeout: Duration) -> Result<Self, FlickrError> {
        Ok(Self {
            endpoints,
            https_client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    fn signed_query(
        secret: Option<&str>,
        params: &Params,
        extra: &[(&str, &str)],
    ) -> Result<Vec<(String, String)>, FlickrError> {
        let mut query: Vec<(String, String)> = params
            .present()
            .chain(extra.iter().copied())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        if let Some(secret) = secret {
            let sig = signing::signature(secret, query.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
            query.push((API_SIG.to_string(), sig));
        }
        Ok(query)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn sign_and_send(
        &self,
        secret: Option<&str>,
        params: &Params,
    ) -> Result<Value, FlickrError> {
        let query = Self::signed_query(secret, params, &[("format", "json"), ("nojsoncallback", "1")])?;
        let req_url = Url::parse_with_params(&self.endpoints.rest, &query)?;
        log::debug!("calling {}", params.get("method").unwrap_or("<no method>"));

        let resp = self
            .https_client
            .get(req_url)
            .header("Accept", "application/json")
            .send()
            .await?;
        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0);
            return Err(FlickrError::ApiResponseTooManyRequests(retry_after));
        }
        let body = resp.error_for_status()?.bytes().await?;
        let doc: Value = serde_json::from_slice(&body)?;
        check_response(doc)
    }

    fn build_approval_url(&self, secret: &str, params: &Params) -> Result<Url, FlickrError> {
        let query = Self::signed_query(Some(secret), params, &[])?;
        Ok(Url::parse_with_params(&self.endpoints.auth, &query)?)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// Error codes per the Flickr API site
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum ApiErrorCodes {
    NotFound = 1,
    SslRequired = 95,
    InvalidSignature = 96,
    MissingSignature = 97,
    LoginFailed = 98,
    InsufficientPermissions = 99,
    InvalidApiKey = 100,
    ServiceUnavailable = 105,
    WriteOperationFailed = 106,
    InvalidFrob = 108,
    FormatNotFound = 111,
    MethodNotFound = 112,
    BadUrlFound = 116,
}

// Envelope every reply carries
#[derive(Deserialize, Debug)]
struct ResponseStatus {
    stat: String,

    #[serde(default)]
    code: Option<u32>,

    #[serde(default)]
    message: Option<String>,
}

/// Turns a reply flagged `"stat": "fail"` into an error, passing good replies through
pub fn check_response(doc: Value) -> Result<Value, FlickrError> {
    let status = ResponseStatus::deserialize(&doc)?;
    match status.stat.as_str() {
        "ok" => Ok(doc),
        "fail" => {
            let code = status.code.unwrap_or_default();
            let message = status.message.unwrap_or_default();
            log::warn!("API returned error {code}: {message}");
            Err(FlickrError::ApiResponse(code, message))
        }
        other => Err(FlickrError::ResponseMissing(format!("unknown reply status '{other}'"))),
    }
}
