/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

use crate::rest::{ApiErrorCodes, PermissionLevel};
use thiserror::Error;

/// Error conditions that can be returned
#[derive(Error, Debug)]
pub enum FlickrError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Permission denied: {required} permission required, credential holds {held}")]
    PermissionDenied {
        required: PermissionLevel,
        held: PermissionLevel,
    },

    #[error("Request network error")]
    Request(#[from] reqwest::Error),

    #[error("URL Parse error")]
    UrlParsing(#[from] url::ParseError),

    #[error("Expected response missing: {0}")]
    ResponseMissing(String),

    #[error("API Response was error: {0}, msg: {1}")]
    ApiResponse(u32, String),

    #[error("API Response is a too many requests error. Retry after {0} seconds")]
    ApiResponseTooManyRequests(u64),

    #[error("API Response is malformed: {0:?}")]
    ApiResponseMalformed(#[from] serde_json::Error),

    #[error("Call aborted before completing: {0}")]
    Aborted(String),
}

/// Broad classes of [`FlickrError`].
///
/// `InvalidArgument` and `PermissionDenied` are only ever returned synchronously from the
/// method that was called. `RemoteFailure` is only ever delivered through a
/// [`CallOutcome::Failure`](crate::rest::CallOutcome::Failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    PermissionDenied,
    RemoteFailure,
}

impl FlickrError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlickrError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            FlickrError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            _ => ErrorKind::RemoteFailure,
        }
    }

    /// The service error code, if the service reported one it documents
    pub fn api_code(&self) -> Option<ApiErrorCodes> {
        match self {
            FlickrError::ApiResponse(code, _) => ApiErrorCodes::try_from(*code).ok(),
            _ => None,
        }
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        FlickrError::InvalidArgument(msg.into())
    }
}
