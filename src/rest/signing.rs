/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::api::API_SIG;
use crate::rest::errors::FlickrError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// HMAC-SHA1 signature over the parameters, keyed with the shared secret.
///
/// Names and values are percent-encoded, joined as `name=value`, sorted and joined with
/// `&`, so the result does not depend on parameter order. Any existing signature
/// parameter is ignored.
pub fn signature<'a>(
    secret: &str,
    params: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<String, FlickrError> {
    let mut pairs: Vec<String> = params
        .into_iter()
        .filter(|(k, _)| *k != API_SIG)
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();
    pairs.sort();
    let base = pairs.join("&");

    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|e| FlickrError::invalid_argument(format!("unusable signing secret: {e}")))?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
