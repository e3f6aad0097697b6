/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::FlickrError;

// Root Flickr API endpoints
pub const REST_ENDPOINT: &str = "https://api.flickr.com/services/rest/";
pub const AUTH_ENDPOINT: &str = "https://www.flickr.com/services/auth/";

/// Environment variable read by [`AppCreds::from_env`] for the API key
pub const API_KEY_VAR: &str = "FLICKR_API_KEY";
/// Environment variable read by [`AppCreds::from_env`] for the shared secret
pub const API_SECRET_VAR: &str = "FLICKR_API_SECRET";

/// Where requests and approval redirects go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub rest: String,
    pub auth: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            rest: REST_ENDPOINT.to_string(),
            auth: AUTH_ENDPOINT.to_string(),
        }
    }
}

/// Identifies the application to the service.
///
/// The API key is enough for calls that need no authentication. The shared secret is
/// needed to sign requests, and so to run the auth handshake.
#[derive(Default, Clone)]
pub struct AppCreds {
    api_key: String,
    shared_secret: Option<String>,
}

impl AppCreds {
    pub fn from_tokens(api_key: &str, shared_secret: Option<&str>) -> Self {
        Self {
            api_key: api_key.into(),
            shared_secret: shared_secret.map(Into::into),
        }
    }

    /// Reads the key from `FLICKR_API_KEY` and the optional secret from `FLICKR_API_SECRET`
    pub fn from_env() -> Result<Self, FlickrError> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| FlickrError::invalid_argument(format!("{API_KEY_VAR} is not set")))?;
        let shared_secret = std::env::var(API_SECRET_VAR).ok().filter(|v| !v.is_empty());
        Ok(Self {
            api_key,
            shared_secret,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn shared_secret(&self) -> Option<&str> {
        self.shared_secret.as_deref()
    }
}

impl std::fmt::Debug for AppCreds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCreds")
            .field("api_key", &"xxx")
            .field("shared_secret", &self.shared_secret.as_ref().map(|_| "xxx"))
            .finish()
    }
}
