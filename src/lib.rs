/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! # Flickr
//!
//! This library is the authentication and call plumbing for the Flickr REST API.
//!
//! For further details on the Rest API refer to the [Flickr API Docs](https://www.flickr.com/services/api/)
//!
//! ## Features
//!
//! - Auth handshake
//!     - Request a grant and build the signed approval URL for the user
//!     - Exchange an approved grant for a credential
//!     - Re-check a stored credential, upgrade a short code to a credential
//! - Permission levels (`none < read < write < delete`) checked before any call is sent
//! - Asynchronous calls matched to their results by correlation id
//! - Lower level [`rest::Transport`] trait for swapping out the HTTP layer
//!
//! *Requests are signed with the application's shared secret. The default transport
//! handles the signing.*
//!
//! ## Installation
//!
//! ```toml
//! [dependencies]
//! flickr = "0.3.0"
//! ```
//!
//! ## Usage
//!
//! **You will need to acquire an API key/secret from Flickr prior to using the API**
//!
//! ```rust,no_run
//! use flickr::rest::{AppCreds, Client, Person, PermissionLevel};
//!
//! async fn whoami(api_key: &str, api_secret: &str) -> anyhow::Result<()> {
//!     let client = Client::new(AppCreds::from_tokens(api_key, Some(api_secret)));
//!     let (auth, mut auth_events) = client.handshake();
//!
//!     // Step 1: ask for a grant and send the user off to approve it
//!     auth.request_grant(PermissionLevel::Read)?;
//!     let grant = match auth_events.grants.recv().await {
//!         Some(done) => done.outcome.into_result()?,
//!         None => anyhow::bail!("handshake coordinator went away"),
//!     };
//!     println!("Approve access at: {}", grant.approval_url());
//!
//!     // Step 2 happens in the user's browser
//!
//!     // Step 3: swap the grant for a credential
//!     auth.exchange_grant_for_credential(grant.grant())?;
//!     let credential = match auth_events.credentials.recv().await {
//!         Some(done) => done.outcome.into_result()?,
//!         None => anyhow::bail!("handshake coordinator went away"),
//!     };
//!
//!     // Use the credential for calls
//!     let (invoker, mut completions) = client.invoker();
//!     let id = Person::test_login(&invoker, &credential)?;
//!     while let Some(done) = completions.recv().await {
//!         if done.id == id {
//!             let me = Person::from_outcome(done.outcome).into_result()?;
//!             println!("Logged in as {me}");
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
pub mod rest;
