/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::api::API_SIG;
use crate::rest::client::Shared;
use crate::rest::correlation::Notifier;
use crate::rest::errors::FlickrError;
use crate::rest::{Completions, CorrelationId, Credential, Params, PermissionLevel};
use serde_json::Value;
use std::sync::Arc;

// Parameter names the invoker or the transport fills in
const RESERVED_PARAMS: [&str; 6] = [
    "api_key",
    "method",
    "auth_token",
    API_SIG,
    "format",
    "nojsoncallback",
];

/// One call to an API method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    params: Params,
}

impl Request {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: Params::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(name, value);
        self
    }

    /// Adds a parameter that is only sent when `value` is `Some`
    pub fn opt_param<V: Into<String>>(mut self, name: impl Into<String>, value: Option<V>) -> Self {
        self.params.push_opt(name, value);
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

/// Makes calls on behalf of a [`Credential`].
///
/// Each call is checked against the permission the credential holds before anything
/// else happens. A call that needs more is refused on the spot with
/// [`FlickrError::PermissionDenied`]: no id is allocated and nothing is sent. Accepted
/// calls return their [`CorrelationId`] at once; the reply, or whatever went wrong
/// getting it, arrives on the invoker's [`Completions`] tagged with that id.
#[derive(Debug, Clone)]
pub struct Invoker {
    shared: Arc<Shared>,
    notifier: Notifier<Value>,
}

impl Invoker {
    pub(crate) fn new(shared: Arc<Shared>) -> (Self, Completions<Value>) {
        let (notifier, completions) = Notifier::channel();
        (Self { shared, notifier }, completions)
    }

    /// Calls `request` with `credential`, which must hold at least `required`
    pub fn call(
        &self,
        credential: &Credential,
        required: PermissionLevel,
        request: Request,
    ) -> Result<CorrelationId, FlickrError> {
        let held = credential.permission();
        if !held.satisfies(required) {
            log::debug!("refusing {}: {required} required, {held} held", request.method);
            return Err(FlickrError::PermissionDenied { required, held });
        }
        self.dispatch(Some(credential.token()), request)
    }

    /// The narrower facade for calls that need no authentication.
    ///
    /// Its completions arrive on the same channel as this invoker's.
    pub fn anonymous(&self) -> AnonymousInvoker {
        AnonymousInvoker {
            invoker: self.clone(),
        }
    }

    fn dispatch(&self, token: Option<&str>, request: Request) -> Result<CorrelationId, FlickrError> {
        let Request { method, params: caller_params } = request;
        if method.is_empty() {
            return Err(FlickrError::invalid_argument("method name is empty"));
        }
        if let Some(name) = caller_params.names().find(|n| RESERVED_PARAMS.contains(n)) {
            return Err(FlickrError::invalid_argument(format!(
                "parameter '{name}' is set by the client"
            )));
        }

        let mut params = Params::new();
        params
            .push("api_key", self.shared.creds.api_key())
            .push("method", method)
            .push_opt("auth_token", token);
        params.extend(caller_params);

        let secret = self.shared.creds.shared_secret().map(str::to_string);
        let shared = self.shared.clone();
        self.notifier.dispatch(&self.shared.correlator, async move {
            shared
                .transport
                .sign_and_send(secret.as_deref(), &params)
                .await
        })
    }
}

/// Makes calls that need no authentication. Obtained from [`Invoker::anonymous`].
#[derive(Debug, Clone)]
pub struct AnonymousInvoker {
    invoker: Invoker,
}

impl AnonymousInvoker {
    pub fn call(&self, request: Request) -> Result<CorrelationId, FlickrError> {
        self.invoker.dispatch(None, request)
    }
}
