/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use serde::Deserialize;

// The JSON format wraps text nodes as {"_content": "..."}
#[derive(Deserialize)]
struct Content {
    #[serde(rename = "_content")]
    content: String,
}

// Parses a {"_content": "..."} wrapper into its string
pub fn from_content<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let c: Content = Deserialize::deserialize(deserializer)?;
    Ok(c.content)
}

