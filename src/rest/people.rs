/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::FlickrError;
use crate::rest::parsers::from_content;
use crate::rest::{
    AnonymousInvoker, CallOutcome, CorrelationId, Credential, Invoker, PermissionLevel, Request,
};
use serde::Deserialize;
use serde_json::Value;

/// Holds information returned from the people lookups.
///
/// See [Flickr API Docs](https://www.flickr.com/services/api/flickr.people.findByUsername.html)
/// for more details on the individual fields.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Person {
    #[serde(rename = "id")]
    pub id: String,

    #[serde(rename = "username", deserialize_with = "from_content")]
    pub username: String,
}

impl Person {
    /// Looks up a user by name. Needs no authentication.
    pub fn find_by_username(
        invoker: &AnonymousInvoker,
        username: &str,
    ) -> Result<CorrelationId, FlickrError> {
        if username.is_empty() {
            return Err(FlickrError::invalid_argument("username is empty"));
        }
        invoker.call(Request::new("flickr.people.findByUsername").param("username", username))
    }

    /// Returns the user the credential belongs to, as the service sees it
    pub fn test_login(
        invoker: &Invoker,
        credential: &Credential,
    ) -> Result<CorrelationId, FlickrError> {
        invoker.call(credential, PermissionLevel::Read, Request::new("flickr.test.login"))
    }

    /// Translates the completion of either lookup into a [`Person`]
    pub fn from_outcome(outcome: CallOutcome<Value>) -> CallOutcome<Person> {
        outcome.and_then(|doc| Ok(PersonResponse::deserialize(&doc)?.user))
    }
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "name: {}, id: {}", self.username, self.id)
    }
}

// Expected response from a people lookup
#[derive(Deserialize, Debug)]
struct PersonResponse {
    #[serde(rename = "user")]
    user: Person,
}
