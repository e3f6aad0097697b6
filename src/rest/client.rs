/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::{
    AppCreds, Completions, Correlator, HandshakeCompletions, HandshakeCoordinator, HttpTransport,
    Invoker, Transport,
};
use serde_json::Value;
use std::sync::Arc;

/// Entry point to the library.
///
/// Holds the application credentials, the transport and the correlator that every
/// coordinator and invoker created from it uses. Correlation ids are unique across every
/// client in the process. Cheap to clone.
///
/// ```rust,no_run
/// use flickr::rest::{AppCreds, Client, PermissionLevel};
///
/// # async fn run() -> anyhow::Result<()> {
/// let client = Client::new(AppCreds::from_tokens("api key", Some("shared secret")));
/// let (auth, mut auth_events) = client.handshake();
/// let id = auth.request_grant(PermissionLevel::Write)?;
/// let done = auth_events.grants.recv().await.expect("coordinator is alive");
/// assert_eq!(done.id, id);
/// let grant = done.outcome.into_result()?;
/// println!("Approve at {}", grant.approval_url());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    shared: Arc<Shared>,
}

impl Client {
    /// Creates a client that talks to the public service over HTTPS
    pub fn new(creds: AppCreds) -> Self {
        Self::with_transport(creds, HttpTransport::new())
    }

    pub fn with_transport(creds: AppCreds, transport: impl Transport + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                creds,
                transport: Arc::new(transport),
                correlator: Correlator::new(),
            }),
        }
    }

    /// A handshake coordinator and the channels its completions arrive on
    pub fn handshake(&self) -> (HandshakeCoordinator, HandshakeCompletions) {
        HandshakeCoordinator::new(self.shared.clone())
    }

    /// An invoker for general calls and the channel its completions arrive on
    pub fn invoker(&self) -> (Invoker, Completions<Value>) {
        Invoker::new(self.shared.clone())
    }

    pub fn creds(&self) -> &AppCreds {
        &self.shared.creds
    }
}

// State shared by everything created from one Client
pub(crate) struct Shared {
    pub(crate) creds: AppCreds,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) correlator: Correlator,
}

impl std::fmt::Debug for Shared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shared")
            .field("creds", &self.creds)
            .field("correlator", &self.correlator)
            .finish()
    }
}
